//! Structural validation of decoded snapshots.
//!
//! Decoding only guarantees that the document has the right shape. The checks
//! here catch documents that decode fine but would render misaligned rows.

use std::collections::HashSet;

use tracing::warn;

use crate::errors::{SnapshotError, SnapshotResult};
use crate::snapshot::NodeSnapshot;

impl NodeSnapshot {
    /// Check watermark ordering and bucket lengths for this node.
    pub fn validate(&self) -> SnapshotResult<()> {
        let sm = &self.state_machine;

        if sm.high_watermark < sm.low_watermark {
            return Err(SnapshotError::InvertedWatermarks {
                node: self.id,
                low: sm.low_watermark,
                high: sm.high_watermark,
            });
        }

        let expected = sm.window_len();
        for bucket in &sm.buckets {
            if bucket.sequences.len() as u64 != expected {
                return Err(SnapshotError::BucketLengthMismatch {
                    node: self.id,
                    bucket: bucket.id,
                    expected,
                    actual: bucket.sequences.len(),
                });
            }
        }

        Ok(())
    }
}

/// Validate every node of one poll result, including id uniqueness.
pub fn validate_all(nodes: &[NodeSnapshot]) -> SnapshotResult<()> {
    let mut seen = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !seen.insert(node.id) {
            return Err(SnapshotError::DuplicateNode { node: node.id });
        }
        node.validate().inspect_err(|e| {
            warn!(node = node.id, error = %e, "Rejecting malformed snapshot");
        })?;
    }
    Ok(())
}

/// Decode a status document (a JSON array of node snapshots) and validate it.
pub fn decode_status(bytes: &[u8]) -> SnapshotResult<Vec<NodeSnapshot>> {
    let nodes: Vec<NodeSnapshot> = serde_json::from_slice(bytes)?;
    validate_all(&nodes)?;
    Ok(nodes)
}
