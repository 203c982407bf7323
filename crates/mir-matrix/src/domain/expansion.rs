//! Collapsed/expanded state of the per-peer detail rows.
//!
//! The state lives with the caller (the dashboard) and is handed to the
//! renderer on every call, so rendering stays a pure function of its inputs.

use std::collections::BTreeSet;

use mir_status_types::NodeId;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionState {
    #[default]
    Collapsed,
    Expanded,
}

impl ExpansionState {
    pub fn toggled(self) -> Self {
        match self {
            ExpansionState::Collapsed => ExpansionState::Expanded,
            ExpansionState::Expanded => ExpansionState::Collapsed,
        }
    }

    pub fn is_expanded(self) -> bool {
        self == ExpansionState::Expanded
    }
}

/// Tracks which node groups show their peer detail rows. All groups start
/// collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailExpansion {
    expanded: BTreeSet<NodeId>,
}

impl DetailExpansion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every listed node expanded.
    pub fn all_expanded(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            expanded: nodes.into_iter().collect(),
        }
    }

    pub fn state(&self, node: NodeId) -> ExpansionState {
        if self.expanded.contains(&node) {
            ExpansionState::Expanded
        } else {
            ExpansionState::Collapsed
        }
    }

    pub fn is_expanded(&self, node: NodeId) -> bool {
        self.state(node).is_expanded()
    }

    /// Flip one node group. Returns the new state.
    pub fn toggle(&mut self, node: NodeId) -> ExpansionState {
        if !self.expanded.remove(&node) {
            self.expanded.insert(node);
        }
        self.state(node)
    }

    /// Expand every listed node unless all of them are already expanded, in
    /// which case collapse everything.
    pub fn toggle_all(&mut self, nodes: impl IntoIterator<Item = NodeId>) {
        let nodes: Vec<NodeId> = nodes.into_iter().collect();
        if !nodes.is_empty() && nodes.iter().all(|n| self.expanded.contains(n)) {
            self.expanded.clear();
        } else {
            self.expanded.extend(nodes);
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Drop state for nodes that disappeared from the latest poll.
    pub fn retain_nodes(&mut self, nodes: &[NodeId]) {
        self.expanded.retain(|n| nodes.contains(n));
    }
}
