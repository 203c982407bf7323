//! Runs polls and commands against the dashboard ports.

use std::sync::Arc;

use futures::future::join_all;
use mir_status_types::NodeId;
use rand::{distributions::Alphanumeric, Rng};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::{CommandDispatcher, StatusProvider};
use crate::domain::{App, Command, PollGuard};

/// Payload length of proposals issued from the keyboard.
const PROPOSAL_LEN: usize = 16;

/// Shared handle used by the refresh loop and the key handler.
#[derive(Clone)]
pub struct Controller {
    provider: Arc<dyn StatusProvider>,
    dispatcher: Arc<dyn CommandDispatcher>,
    app: Arc<Mutex<App>>,
    guard: PollGuard,
}

impl Controller {
    pub fn new(
        provider: Arc<dyn StatusProvider>,
        dispatcher: Arc<dyn CommandDispatcher>,
        app: Arc<Mutex<App>>,
    ) -> Self {
        Self {
            provider,
            dispatcher,
            app,
            guard: PollGuard::new(),
        }
    }

    pub fn app(&self) -> &Arc<Mutex<App>> {
        &self.app
    }

    pub fn guard(&self) -> &PollGuard {
        &self.guard
    }

    /// Poll once. Returns `false` when another poll was already in flight.
    pub async fn refresh(&self) -> bool {
        let Some(ticket) = self.guard.try_begin() else {
            debug!("Poll already in flight, skipping");
            return false;
        };

        let result = self.provider.fetch_status().await;
        {
            let mut app = self.app.lock().await;
            match result {
                Ok(nodes) => app.apply_snapshots(nodes),
                Err(e) => {
                    warn!(error = %e, "Status poll failed");
                    app.record_error("Poll", e);
                }
            }
        }
        ticket.finish();

        self.schedule_auto_process().await;
        true
    }

    /// Queue a process command for every busy node if auto-process is on.
    async fn schedule_auto_process(&self) {
        let (delay, busy) = {
            let mut app = self.app.lock().await;
            let Some(delay) = app.auto_process.delay() else {
                return;
            };
            let busy = app.busy_nodes();
            for id in &busy {
                app.begin_processing(*id);
            }
            (delay, busy)
        };

        if busy.is_empty() {
            return;
        }

        debug!(nodes = ?busy, delay_ms = delay.as_millis() as u64, "Auto-processing");
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            join_all(busy.into_iter().map(|id| this.run_process(id))).await;
        });
    }

    /// Process a node whose processing flag is already set.
    async fn run_process(&self, node: NodeId) {
        let result = self.dispatcher.process(node).await;
        let mut app = self.app.lock().await;
        app.finish_processing(node);
        if let Err(e) = result {
            warn!(node, error = %e, "Process command failed");
            app.record_error(&format!("Process node {node}"), e);
        }
    }

    /// Carry out a command issued from the keyboard.
    pub async fn execute(&self, command: Command) {
        match command {
            Command::Refresh => {
                self.refresh().await;
                return;
            }
            Command::Process(node) => {
                if !self.app.lock().await.begin_processing(node) {
                    debug!(node, "Process already in flight");
                    return;
                }
                self.run_process(node).await;
            }
            Command::Propose(node) => {
                let payload = random_payload();
                if let Err(e) = self.dispatcher.propose(node, payload).await {
                    warn!(node, error = %e, "Proposal failed");
                    self.app.lock().await.record_error(&format!("Propose node {node}"), e);
                    return;
                }
                info!(node, "Proposal submitted");
            }
            Command::Tick(node) => {
                if let Err(e) = self.dispatcher.tick(node).await {
                    self.app.lock().await.record_error(&format!("Tick node {node}"), e);
                    return;
                }
            }
        }
        self.refresh().await;
    }
}

/// Random printable request body.
pub fn random_payload() -> Vec<u8> {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PROPOSAL_LEN)
        .collect()
}
