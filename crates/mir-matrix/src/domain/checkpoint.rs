//! Checkpoint summary row with span collapsing.
//!
//! Checkpoint records are sparse. Instead of one cell per column the summary
//! row emits one cell per checkpoint, widened to absorb the empty columns to
//! its left:
//!
//! ```text
//! columns:  0  1  2  3  4  5  6  7  8  9
//! records:        *  *           *
//! cells:   [ span 3 ][1][  span 4  ]        <- row ends short after 7
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use mir_status_types::{Checkpoint, SeqNo, StateMachineSnapshot};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::alignment::Alignment;

/// How a checkpoint record's `seq_no` maps to a column of the global window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointKeyRule {
    /// `seq_no` is an absolute sequence number
    #[default]
    Absolute,
    /// `seq_no` counts from the node's own low watermark
    NodeRelative,
    /// `seq_no / bucket_count`, as emitted by one later status encoder
    BucketDivisor,
}

impl CheckpointKeyRule {
    /// Global column position for `checkpoint`, if one can be derived.
    pub fn resolve(&self, checkpoint: &Checkpoint, sm: &StateMachineSnapshot) -> Option<SeqNo> {
        match self {
            CheckpointKeyRule::Absolute => Some(checkpoint.seq_no),
            CheckpointKeyRule::NodeRelative => sm.low_watermark.checked_add(checkpoint.seq_no),
            CheckpointKeyRule::BucketDivisor => {
                let buckets = sm.bucket_count() as u64;
                checkpoint.seq_no.checked_div(buckets)
            }
        }
    }
}

impl fmt::Display for CheckpointKeyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckpointKeyRule::Absolute => "absolute",
            CheckpointKeyRule::NodeRelative => "node-relative",
            CheckpointKeyRule::BucketDivisor => "bucket-divisor",
        };
        f.write_str(name)
    }
}

impl FromStr for CheckpointKeyRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "absolute" => Ok(CheckpointKeyRule::Absolute),
            "node-relative" | "relative" => Ok(CheckpointKeyRule::NodeRelative),
            "bucket-divisor" | "divisor" => Ok(CheckpointKeyRule::BucketDivisor),
            other => Err(format!(
                "unknown checkpoint key rule '{other}' (expected absolute, node-relative or bucket-divisor)"
            )),
        }
    }
}

/// Quorum classification of one checkpoint record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckpointStatus {
    /// Local decision and network quorum agree
    Agreed,
    NetworkQuorumOnly,
    LocalOnly,
    /// Neither yet; carries the pending/max agreement counter
    Pending { agreements: u64 },
}

impl CheckpointStatus {
    pub fn classify(checkpoint: &Checkpoint) -> Self {
        match (checkpoint.local_decision, checkpoint.net_quorum) {
            (true, true) => CheckpointStatus::Agreed,
            (false, true) => CheckpointStatus::NetworkQuorumOnly,
            (true, false) => CheckpointStatus::LocalOnly,
            (false, false) => CheckpointStatus::Pending {
                agreements: checkpoint.pending_or_max_agreements,
            },
        }
    }

    /// Short cell label.
    pub fn label(&self) -> String {
        match self {
            CheckpointStatus::Agreed => "✔".to_string(),
            CheckpointStatus::NetworkQuorumOnly => "N".to_string(),
            CheckpointStatus::LocalOnly => "L".to_string(),
            CheckpointStatus::Pending { agreements } => agreements.to_string(),
        }
    }
}

/// One emitted checkpoint cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckpointCell {
    /// Global column the checkpoint resolved to
    pub seq_no: SeqNo,
    /// Columns covered, including the skipped ones to the left
    pub col_span: usize,
    #[serde(flatten)]
    pub status: CheckpointStatus,
}

/// Summary row for one node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckpointRow {
    pub cells: Vec<CheckpointCell>,
}

impl CheckpointRow {
    /// Columns covered by emitted cells. Less than the table width when the
    /// last columns have no checkpoint yet.
    pub fn covered(&self) -> usize {
        self.cells.iter().map(|c| c.col_span).sum()
    }
}

/// Builds checkpoint summary rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckpointSpanCollapser {
    rule: CheckpointKeyRule,
}

impl CheckpointSpanCollapser {
    pub fn new(rule: CheckpointKeyRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> CheckpointKeyRule {
        self.rule
    }

    /// Summary row for `sm` across the whole aligned window.
    pub fn collapse(&self, sm: &StateMachineSnapshot, alignment: &Alignment) -> CheckpointRow {
        let mut by_position: BTreeMap<SeqNo, &Checkpoint> = BTreeMap::new();
        for checkpoint in &sm.checkpoints {
            match self.rule.resolve(checkpoint, sm) {
                Some(position) => {
                    // first record for a position wins
                    by_position.entry(position).or_insert(checkpoint);
                }
                None => trace!(seq_no = checkpoint.seq_no, rule = %self.rule, "Unresolvable checkpoint key"),
            }
        }

        let mut cells = Vec::new();
        let mut skipped = 0usize;
        for seq in alignment.columns() {
            match by_position.get(&seq) {
                None => skipped += 1,
                Some(checkpoint) => {
                    cells.push(CheckpointCell {
                        seq_no: seq,
                        col_span: skipped + 1,
                        status: CheckpointStatus::classify(checkpoint),
                    });
                    skipped = 0;
                }
            }
        }

        CheckpointRow { cells }
    }
}
