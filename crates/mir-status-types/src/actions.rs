//! Outstanding action counters reported per node.

use serde::{Deserialize, Serialize};

use crate::errors::SnapshotError;

/// Number of outstanding actions a node has handed to its application,
/// grouped by kind.
///
/// `total` is not stored: it is always the sum of the named counters. A
/// document that declares a different `total` fails to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireActionCounters", into = "WireActionCounters")]
pub struct ActionCounters {
    pub broadcast: u64,
    pub unicast: u64,
    pub preprocess: u64,
    pub digest: u64,
    pub validate: u64,
    pub commit: u64,
    pub checkpoint: u64,
}

impl ActionCounters {
    /// Sum of all named counters.
    pub fn total(&self) -> u64 {
        self.named().iter().map(|(_, count)| *count).sum()
    }

    /// True when the node has nothing left to process.
    pub fn is_idle(&self) -> bool {
        self.total() == 0
    }

    /// Counters paired with their display labels, in display order.
    pub fn named(&self) -> [(&'static str, u64); 7] {
        [
            ("Broadcasts", self.broadcast),
            ("Unicasts", self.unicast),
            ("Preprocess", self.preprocess),
            ("Digest", self.digest),
            ("Validate", self.validate),
            ("Commit", self.commit),
            ("Checkpoint", self.checkpoint),
        ]
    }
}

/// On-the-wire counters. Older encoders call the digest counter `process`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
struct WireActionCounters {
    broadcast: u64,
    unicast: u64,
    preprocess: u64,
    #[serde(alias = "process")]
    digest: u64,
    validate: u64,
    commit: u64,
    checkpoint: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<u64>,
}

impl TryFrom<WireActionCounters> for ActionCounters {
    type Error = SnapshotError;

    fn try_from(wire: WireActionCounters) -> Result<Self, Self::Error> {
        let counters = ActionCounters {
            broadcast: wire.broadcast,
            unicast: wire.unicast,
            preprocess: wire.preprocess,
            digest: wire.digest,
            validate: wire.validate,
            commit: wire.commit,
            checkpoint: wire.checkpoint,
        };

        match wire.total {
            Some(declared) if declared != counters.total() => {
                Err(SnapshotError::ActionTotalMismatch {
                    declared,
                    computed: counters.total(),
                })
            }
            _ => Ok(counters),
        }
    }
}

impl From<ActionCounters> for WireActionCounters {
    fn from(counters: ActionCounters) -> Self {
        WireActionCounters {
            broadcast: counters.broadcast,
            unicast: counters.unicast,
            preprocess: counters.preprocess,
            digest: counters.digest,
            validate: counters.validate,
            commit: counters.commit,
            checkpoint: counters.checkpoint,
            total: Some(counters.total()),
        }
    }
}
