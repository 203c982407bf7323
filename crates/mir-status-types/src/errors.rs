//! Error types for snapshot decoding and validation.

use thiserror::Error;

use crate::snapshot::{BucketId, NodeId, SeqNo};

/// Reasons a status document is rejected.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Document is not valid JSON or is missing required fields
    #[error("Failed to decode status document: {0}")]
    Decode(#[from] serde_json::Error),

    /// High watermark lies below the low watermark
    #[error("Node {node}: high watermark {high} is below low watermark {low}")]
    InvertedWatermarks { node: NodeId, low: SeqNo, high: SeqNo },

    /// Bucket does not carry exactly one entry per sequence in the window
    #[error("Node {node} bucket {bucket}: expected {expected} sequence entries, got {actual}")]
    BucketLengthMismatch {
        node: NodeId,
        bucket: BucketId,
        expected: u64,
        actual: usize,
    },

    /// The same node id appears twice in one poll result
    #[error("Duplicate node id {node} in status document")]
    DuplicateNode { node: NodeId },

    /// Declared action total disagrees with the named counters
    #[error("Action counter total {declared} does not match counter sum {computed}")]
    ActionTotalMismatch { declared: u64, computed: u64 },
}

/// Result type for snapshot operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;
