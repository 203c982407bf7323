//! In-process replica cluster for `--demo` runs.
//!
//! A deliberately small model of an ordering protocol: every proposal is
//! allocated the next sequence number on all replicas, and each `process`
//! call moves a replica's in-flight sequences one phase forward
//! (queued -> digested -> validated -> prepared -> committed). Checkpoints
//! are taken every `checkpoint_interval` sequences once a replica has
//! committed all of them, and a replica's window slides to a checkpoint as
//! soon as a quorum of replicas has decided it.

use std::collections::BTreeMap;

use async_trait::async_trait;
use mir_status_types::{
    ActionCounters, Bucket, BucketStatus, Checkpoint, LogSummary, NodeId, NodeSnapshot,
    PeerSnapshot, SeqNo, SequenceCode, StateMachineSnapshot,
};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::api::{ApiError, ApiResult, CommandDispatcher, StatusProvider};

const QUEUED: SequenceCode = 1;
const DIGESTED: SequenceCode = 2;
const VALIDATED: SequenceCode = 4;
const PREPARED: SequenceCode = 5;
const COMMITTED: SequenceCode = 6;

/// Shape of the demo cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoConfig {
    pub nodes: usize,
    pub buckets: u64,
    pub checkpoint_interval: u64,
    /// Sequence numbers per watermark window
    pub window: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            nodes: 4,
            buckets: 4,
            checkpoint_interval: 5,
            window: 20,
        }
    }
}

impl DemoConfig {
    /// Replicas needed for a checkpoint quorum: `2f + 1` of `3f + 1`.
    pub fn quorum(&self) -> usize {
        let f = self.nodes.saturating_sub(1) / 3;
        2 * f + 1
    }
}

#[derive(Debug)]
struct DemoNode {
    id: NodeId,
    low: SeqNo,
    high: SeqNo,
    codes: BTreeMap<SeqNo, SequenceCode>,
    actions: ActionCounters,
    log: LogSummary,
    checkpoints: BTreeMap<SeqNo, Checkpoint>,
}

impl DemoNode {
    fn new(id: NodeId, window: u64) -> Self {
        Self {
            id,
            low: 0,
            high: window.saturating_sub(1),
            codes: BTreeMap::new(),
            actions: ActionCounters::default(),
            log: LogSummary::default(),
            checkpoints: BTreeMap::new(),
        }
    }

    fn code(&self, seq: SeqNo) -> SequenceCode {
        self.codes.get(&seq).copied().unwrap_or(0)
    }

    /// Pending work implied by the in-flight sequences.
    fn recompute_actions(&mut self) {
        let mut actions = ActionCounters::default();
        for code in self.codes.values() {
            match *code {
                QUEUED => actions.digest += 1,
                DIGESTED => actions.validate += 1,
                VALIDATED => actions.broadcast += 1,
                PREPARED => actions.commit += 1,
                _ => {}
            }
        }
        self.actions = actions;
    }

    /// Highest sequence in `bucket` at or past `phase`.
    fn highest_at(&self, bucket: u64, buckets: u64, phase: SequenceCode) -> SeqNo {
        self.codes
            .iter()
            .filter(|(seq, code)| **seq % buckets == bucket && **code >= phase)
            .map(|(seq, _)| *seq)
            .max()
            .unwrap_or(0)
    }

    /// Latest checkpoint this node has decided and a quorum agrees on.
    fn stable_checkpoint(&self) -> Option<SeqNo> {
        self.checkpoints
            .values()
            .filter(|c| c.local_decision && c.net_quorum)
            .map(|c| c.seq_no)
            .max()
    }
}

#[derive(Debug)]
struct ClusterState {
    config: DemoConfig,
    next_seq: SeqNo,
    payloads: BTreeMap<SeqNo, Vec<u8>>,
    nodes: Vec<DemoNode>,
}

impl ClusterState {
    fn node_index(&self, id: NodeId) -> ApiResult<usize> {
        self.nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or(ApiError::UnknownNode(id))
    }

    fn propose(&mut self, proposer: usize, payload: Vec<u8>) -> ApiResult<SeqNo> {
        let Some(node) = self.nodes.get(proposer) else {
            return Err(ApiError::UnknownNode(proposer as NodeId));
        };
        let seq = self.next_seq;
        if seq > node.high {
            return Err(ApiError::Status {
                route: format!("/node/{}/propose", node.id),
                status: 503,
            });
        }
        self.next_seq += 1;
        self.payloads.insert(seq, payload);

        for node in &mut self.nodes {
            node.codes.insert(seq, QUEUED);
            node.recompute_actions();
        }
        self.nodes[proposer].actions.preprocess += 1;
        Ok(seq)
    }

    fn process(&mut self, index: usize) -> usize {
        let interval = self.config.checkpoint_interval;
        let node = &mut self.nodes[index];

        let mut committed = 0;
        for (seq, code) in node.codes.iter_mut() {
            let next = match *code {
                QUEUED => DIGESTED,
                DIGESTED => VALIDATED,
                VALIDATED => PREPARED,
                PREPARED => COMMITTED,
                other => other,
            };
            if next == COMMITTED && *code != COMMITTED {
                let payload = self.payloads.get(seq).cloned().unwrap_or_default();
                node.log.total_bytes += payload.len() as u64;
                node.log.position += 1;
                node.log.last_bytes = payload;
                committed += 1;
            }
            *code = next;
        }
        node.recompute_actions();

        // decide every checkpoint whose interval is fully committed
        let mut boundary = interval;
        while interval > 0 && boundary < self.next_seq {
            let decided = node
                .checkpoints
                .get(&boundary)
                .is_some_and(|c| c.local_decision);
            let complete = (boundary + 1 - interval..=boundary)
                .filter(|s| *s > 0)
                .all(|s| node.code(s) == COMMITTED);
            if !decided && complete {
                node.checkpoints
                    .entry(boundary)
                    .or_insert(Checkpoint {
                        seq_no: boundary,
                        local_decision: false,
                        net_quorum: false,
                        pending_or_max_agreements: 0,
                    })
                    .local_decision = true;
                node.actions.checkpoint += 1;
                debug!(node = node.id, seq_no = boundary, "Checkpoint decided");
            }
            boundary += interval;
        }

        self.settle_checkpoints();
        committed
    }

    /// Share agreement counts across the cluster and slide stable windows.
    fn settle_checkpoints(&mut self) {
        let quorum = self.config.quorum();
        let window = self.config.window;

        let mut agreements: BTreeMap<SeqNo, u64> = BTreeMap::new();
        for node in &self.nodes {
            for checkpoint in node.checkpoints.values().filter(|c| c.local_decision) {
                *agreements.entry(checkpoint.seq_no).or_default() += 1;
            }
        }

        for node in &mut self.nodes {
            for (seq, count) in &agreements {
                if *seq < node.low {
                    continue;
                }
                let record = node.checkpoints.entry(*seq).or_insert(Checkpoint {
                    seq_no: *seq,
                    local_decision: false,
                    net_quorum: false,
                    pending_or_max_agreements: 0,
                });
                record.pending_or_max_agreements = *count;
                record.net_quorum = *count as usize >= quorum;
            }

            if let Some(stable) = node.stable_checkpoint() {
                if stable > node.low {
                    node.low = stable;
                    node.high = stable + window.saturating_sub(1);
                    let low = node.low;
                    node.codes.retain(|seq, _| *seq >= low);
                    node.checkpoints.retain(|seq, _| *seq >= low);
                    info!(node = node.id, low, high = node.high, "Watermark window moved");
                }
            }
        }
    }

    fn snapshot(&self) -> Vec<NodeSnapshot> {
        let buckets = self.config.buckets.max(1);
        self.nodes
            .iter()
            .map(|node| {
                let bucket_rows = (0..buckets)
                    .map(|b| Bucket {
                        id: b,
                        sequences: (node.low..=node.high)
                            .map(|seq| if seq % buckets == b { node.code(seq) } else { 0 })
                            .collect(),
                    })
                    .collect();

                let peers = self
                    .nodes
                    .iter()
                    .filter(|peer| peer.id != node.id)
                    .map(|peer| PeerSnapshot {
                        id: peer.id,
                        bucket_statuses: (0..buckets)
                            .map(|b| BucketStatus {
                                bucket_id: b,
                                last_checkpoint: peer.stable_checkpoint().unwrap_or(0),
                                last_commit: peer.highest_at(b, buckets, COMMITTED),
                                last_prepare: peer.highest_at(b, buckets, PREPARED),
                            })
                            .collect(),
                    })
                    .collect();

                NodeSnapshot {
                    id: node.id,
                    actions: node.actions,
                    log: node.log.clone(),
                    state_machine: StateMachineSnapshot {
                        low_watermark: node.low,
                        high_watermark: node.high,
                        buckets: bucket_rows,
                        checkpoints: node
                            .checkpoints
                            .values()
                            .filter(|c| c.seq_no <= node.high)
                            .copied()
                            .collect(),
                        peers,
                    },
                }
            })
            .collect()
    }
}

/// Demo cluster implementing both dashboard ports.
#[derive(Debug)]
pub struct DemoCluster {
    state: Mutex<ClusterState>,
}

impl Default for DemoCluster {
    fn default() -> Self {
        Self::new(DemoConfig::default())
    }
}

impl DemoCluster {
    pub fn new(config: DemoConfig) -> Self {
        let nodes = (0..config.nodes as NodeId)
            .map(|id| DemoNode::new(id, config.window))
            .collect();
        Self {
            state: Mutex::new(ClusterState {
                config,
                next_seq: 1,
                payloads: BTreeMap::new(),
                nodes,
            }),
        }
    }

    pub fn config(&self) -> DemoConfig {
        self.state.lock().config
    }

    /// Propose `requests` payloads round-robin across the replicas.
    pub fn prefill(&self, requests: usize) -> ApiResult<()> {
        let mut state = self.state.lock();
        let count = state.nodes.len().max(1);
        for i in 0..requests {
            let payload = format!("demo-request-{i}").into_bytes();
            state.propose(i % count, payload)?;
        }
        Ok(())
    }
}

#[async_trait]
impl StatusProvider for DemoCluster {
    async fn fetch_status(&self) -> ApiResult<Vec<NodeSnapshot>> {
        Ok(self.state.lock().snapshot())
    }
}

#[async_trait]
impl CommandDispatcher for DemoCluster {
    async fn process(&self, node: NodeId) -> ApiResult<()> {
        let mut state = self.state.lock();
        let index = state.node_index(node)?;
        let committed = state.process(index);
        debug!(node, committed, "Demo node processed");
        Ok(())
    }

    async fn propose(&self, node: NodeId, payload: Vec<u8>) -> ApiResult<()> {
        let mut state = self.state.lock();
        let index = state.node_index(node)?;
        let seq = state.propose(index, payload)?;
        info!(node, seq_no = seq, "Demo proposal allocated");
        Ok(())
    }

    async fn tick(&self, node: NodeId) -> ApiResult<()> {
        let mut state = self.state.lock();
        let index = state.node_index(node)?;
        // heartbeat
        state.nodes[index].actions.broadcast += 1;
        Ok(())
    }
}
