//! # Status Types Crate
//!
//! Value types for the per-replica status documents polled by the dashboard,
//! plus the decoding and validation rules every consumer relies on.
//!
//! ## Design Principles
//!
//! - **Immutable snapshots**: a poll produces a fresh `Vec<NodeSnapshot>` that
//!   replaces the previous one wholesale. Nothing in this crate mutates a
//!   snapshot after decoding.
//! - **Drift tolerant decoding**: field names are accepted in camelCase,
//!   snake_case and PascalCase, and `null` lists decode as empty.
//! - **Explicit validation**: structural problems that would silently
//!   mis-render (bucket length mismatch, inverted watermarks) are reported as
//!   [`SnapshotError`] instead.
//!
//! ## Wire Shape
//!
//! ```text
//! [
//!   {
//!     "id": 0,
//!     "actions": { "broadcast": 1, "unicast": 0, ..., "total": 1 },
//!     "log": { "totalBytes": 42, "position": 3 },
//!     "stateMachine": {
//!       "lowWatermark": 0, "highWatermark": 9,
//!       "buckets":     [ { "id": 0, "sequences": [0, 1, 6, ...] } ],
//!       "checkpoints": [ { "seqNo": 4, "localDecision": true, ... } ],
//!       "peers":       [ { "id": 1, "bucketStatuses": [ ... ] } ]
//!     }
//!   }
//! ]
//! ```

pub mod actions;
pub mod errors;
pub mod snapshot;
pub mod validation;

pub use actions::ActionCounters;
pub use errors::{SnapshotError, SnapshotResult};
pub use snapshot::{
    Bucket, BucketId, BucketStatus, Checkpoint, LogSummary, NodeId, NodeSnapshot, PeerSnapshot,
    SeqNo, SequenceCode, StateMachineSnapshot,
};
pub use validation::{decode_status, validate_all};
