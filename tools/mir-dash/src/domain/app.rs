//! Application state management.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use mir_matrix::{render_model, AlignedMatrix, DetailExpansion, RenderOptions};
use mir_status_types::{NodeId, NodeSnapshot};
use tracing::{debug, warn};

use crate::config::AutoProcess;

/// Application state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    /// Main dashboard view.
    #[default]
    Dashboard,
    /// Help overlay.
    Help,
    /// Quitting.
    Quit,
}

/// Work a key press asks the runtime to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Refresh,
    Process(NodeId),
    Propose(NodeId),
    Tick(NodeId),
}

/// Main application model.
pub struct App {
    pub state: AppState,
    /// Engine options for every render
    pub options: RenderOptions,
    /// Snapshots from the last accepted poll
    pub nodes: Vec<NodeSnapshot>,
    /// Last successfully rendered matrix. Survives failed polls.
    pub matrix: Option<AlignedMatrix>,
    pub expansion: DetailExpansion,
    /// Index into `nodes` of the node commands target
    pub selected: usize,
    pub last_refresh: Option<DateTime<Utc>>,
    /// Error from the latest poll or command, if any.
    pub error_message: Option<String>,
    pub auto_process: AutoProcess,
    /// Nodes with a process command in flight
    pub processing: BTreeSet<NodeId>,
    /// Where the data comes from, shown in the header
    pub source: String,
}

impl Default for App {
    fn default() -> Self {
        Self::new(RenderOptions::default(), AutoProcess::Off, "")
    }
}

impl App {
    pub fn new(options: RenderOptions, auto_process: AutoProcess, source: impl Into<String>) -> Self {
        Self {
            state: AppState::Dashboard,
            options,
            nodes: Vec::new(),
            matrix: None,
            expansion: DetailExpansion::new(),
            selected: 0,
            last_refresh: None,
            error_message: None,
            auto_process,
            processing: BTreeSet::new(),
            source: source.into(),
        }
    }

    /// Handle keyboard input. Returns the command the key asks for, if any.
    pub fn handle_key(&mut self, key: char) -> Option<Command> {
        match self.state {
            AppState::Dashboard => self.handle_dashboard_key(key),
            AppState::Help => {
                // Any key closes help
                self.state = AppState::Dashboard;
                None
            }
            AppState::Quit => None,
        }
    }

    fn handle_dashboard_key(&mut self, key: char) -> Option<Command> {
        match key {
            'q' | 'Q' => self.state = AppState::Quit,
            '?' => self.state = AppState::Help,
            'r' | 'R' => return Some(Command::Refresh),
            'e' | 'E' => self.toggle_all_details(),
            'a' | 'A' => {
                self.auto_process = self.auto_process.cycle();
                debug!(mode = %self.auto_process, "Auto-process mode changed");
            }
            'p' | 'P' => return self.selected_node_id().map(Command::Process),
            'n' | 'N' => return self.selected_node_id().map(Command::Propose),
            't' | 'T' => return self.selected_node_id().map(Command::Tick),
            c @ '1'..='9' => {
                let index = c as usize - '1' as usize;
                if let Some(id) = self.nodes.get(index).map(|n| n.id) {
                    self.toggle_details(id);
                }
            }
            _ => {}
        }
        None
    }

    pub fn selected_node_id(&self) -> Option<NodeId> {
        self.nodes.get(self.selected).map(|n| n.id)
    }

    pub fn select_prev(&mut self) {
        if self.nodes.is_empty() {
            return;
        }
        self.selected = if self.selected == 0 {
            self.nodes.len() - 1
        } else {
            self.selected - 1
        };
    }

    pub fn select_next(&mut self) {
        if self.nodes.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.nodes.len();
    }

    pub fn toggle_details(&mut self, node: NodeId) {
        let state = self.expansion.toggle(node);
        debug!(node, ?state, "Toggled peer details");
        self.rerender();
    }

    pub fn toggle_all_details(&mut self) {
        let ids: Vec<NodeId> = self.nodes.iter().map(|n| n.id).collect();
        self.expansion.toggle_all(ids);
        self.rerender();
    }

    /// Accept a successful poll. The snapshots replace the previous ones only
    /// if they render; otherwise the previous matrix stays on screen.
    pub fn apply_snapshots(&mut self, nodes: Vec<NodeSnapshot>) {
        match render_model(&nodes, &self.expansion, &self.options) {
            Ok(matrix) => {
                let ids: Vec<NodeId> = nodes.iter().map(|n| n.id).collect();
                self.expansion.retain_nodes(&ids);
                self.processing.retain(|id| ids.contains(id));
                self.nodes = nodes;
                self.matrix = matrix;
                self.error_message = None;
                self.last_refresh = Some(Utc::now());
                if self.selected >= self.nodes.len() {
                    self.selected = 0;
                }
            }
            Err(e) => {
                warn!(error = %e, "Rejected status poll, keeping previous matrix");
                self.error_message = Some(e.to_string());
            }
        }
    }

    /// Record a failed poll or command. Nodes and matrix are left as they were.
    pub fn record_error(&mut self, context: &str, error: impl std::fmt::Display) {
        self.error_message = Some(format!("{context}: {error}"));
    }

    /// Re-render the current snapshots, e.g. after an expansion change.
    pub fn rerender(&mut self) {
        match render_model(&self.nodes, &self.expansion, &self.options) {
            Ok(matrix) => self.matrix = matrix,
            Err(e) => self.error_message = Some(e.to_string()),
        }
    }

    /// Mark `node` as processing. False if a process command is already in flight.
    pub fn begin_processing(&mut self, node: NodeId) -> bool {
        self.processing.insert(node)
    }

    pub fn finish_processing(&mut self, node: NodeId) {
        self.processing.remove(&node);
    }

    /// Nodes with pending actions and no process command in flight.
    pub fn busy_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| !n.actions.is_idle() && !self.processing.contains(&n.id))
            .map(|n| n.id)
            .collect()
    }

    /// Check if the app should quit.
    pub fn should_quit(&self) -> bool {
        self.state == AppState::Quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mir_status_types::{ActionCounters, Bucket, StateMachineSnapshot};

    fn snapshot(id: NodeId, low: u64, high: u64, pending: u64) -> NodeSnapshot {
        NodeSnapshot {
            id,
            actions: ActionCounters {
                broadcast: pending,
                ..Default::default()
            },
            log: Default::default(),
            state_machine: StateMachineSnapshot {
                low_watermark: low,
                high_watermark: high,
                buckets: vec![Bucket {
                    id: 0,
                    sequences: vec![0; (high - low + 1) as usize],
                }],
                ..Default::default()
            },
        }
    }

    fn loaded_app() -> App {
        let mut app = App::default();
        app.apply_snapshots(vec![snapshot(0, 0, 5, 2), snapshot(1, 2, 8, 0), snapshot(2, 0, 8, 1)]);
        app
    }

    #[test]
    fn test_apply_snapshots_renders() {
        let app = loaded_app();
        assert!(app.error_message.is_none());
        assert!(app.last_refresh.is_some());
        let matrix = app.matrix.as_ref().unwrap();
        assert_eq!((matrix.global_low, matrix.global_high), (0, 8));
    }

    #[test]
    fn test_malformed_poll_keeps_previous_matrix() {
        let mut app = loaded_app();
        let before = app.matrix.clone();

        let mut broken = snapshot(0, 0, 5, 0);
        broken.state_machine.buckets[0].sequences.pop();
        app.apply_snapshots(vec![broken]);

        assert_eq!(app.matrix, before);
        assert_eq!(app.nodes.len(), 3);
        assert!(app.error_message.as_deref().unwrap().contains("Malformed"));
    }

    #[test]
    fn test_record_error_keeps_matrix() {
        let mut app = loaded_app();
        app.record_error("Poll", "connection refused");
        assert!(app.matrix.is_some());
        assert_eq!(app.error_message.as_deref(), Some("Poll: connection refused"));
    }

    #[test]
    fn test_digit_toggles_node_details() {
        let mut app = loaded_app();
        assert_eq!(app.handle_key('2'), None);

        let matrix = app.matrix.as_ref().unwrap();
        assert!(matrix.group(1).unwrap().peer_blocks.is_some());
        assert!(matrix.group(0).unwrap().peer_blocks.is_none());

        // no fourth node
        app.handle_key('4');
        assert!(!app.expansion.is_expanded(3));
    }

    #[test]
    fn test_toggle_all_details() {
        let mut app = loaded_app();
        app.handle_key('e');
        assert!(app
            .matrix
            .as_ref()
            .unwrap()
            .groups
            .iter()
            .all(|g| g.peer_blocks.is_some()));

        app.handle_key('e');
        assert!(app
            .matrix
            .as_ref()
            .unwrap()
            .groups
            .iter()
            .all(|g| g.peer_blocks.is_none()));
    }

    #[test]
    fn test_commands_target_selected_node() {
        let mut app = loaded_app();
        assert_eq!(app.handle_key('p'), Some(Command::Process(0)));

        app.select_next();
        assert_eq!(app.handle_key('n'), Some(Command::Propose(1)));

        app.select_prev();
        app.select_prev();
        assert_eq!(app.handle_key('t'), Some(Command::Tick(2)));
        assert_eq!(app.handle_key('r'), Some(Command::Refresh));
    }

    #[test]
    fn test_no_commands_without_nodes() {
        let mut app = App::default();
        assert_eq!(app.handle_key('p'), None);
        app.select_next();
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_help_and_quit() {
        let mut app = App::default();
        app.handle_key('?');
        assert_eq!(app.state, AppState::Help);
        assert_eq!(app.handle_key('r'), None);
        assert_eq!(app.state, AppState::Dashboard);
        app.handle_key('q');
        assert!(app.should_quit());
    }

    #[test]
    fn test_busy_nodes_skip_processing() {
        let mut app = loaded_app();
        assert_eq!(app.busy_nodes(), vec![0, 2]);

        assert!(app.begin_processing(0));
        assert!(!app.begin_processing(0));
        assert_eq!(app.busy_nodes(), vec![2]);

        app.finish_processing(0);
        assert_eq!(app.busy_nodes(), vec![0, 2]);
    }

    #[test]
    fn test_auto_process_key_cycles() {
        let mut app = App::default();
        app.handle_key('a');
        assert_eq!(app.auto_process.to_string(), "0ms");
    }
}
