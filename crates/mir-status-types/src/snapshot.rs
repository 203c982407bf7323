//! Snapshot entities.
//!
//! Every field accepts its camelCase name (canonical), its snake_case name
//! (later status encoders) and the PascalCase name emitted by Go status
//! servers that marshal their structs untagged.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Deserializer, Serialize};
use serde_with::{serde_as, DefaultOnNull};
use tracing::debug;

use crate::actions::ActionCounters;

/// Replica identifier
pub type NodeId = u64;

/// Sequence number in the replicated log
pub type SeqNo = u64;

/// Bucket (processing lane) identifier
pub type BucketId = u64;

/// Raw sequence state code. Its meaning depends on the status schema version,
/// so it is kept as a plain integer here and interpreted by the renderer.
pub type SequenceCode = i64;

/// One replica's status as returned by a single poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSnapshot {
    #[serde(alias = "ID", alias = "Id")]
    pub id: NodeId,
    /// Outstanding actions waiting for the application
    #[serde(default, alias = "Actions")]
    pub actions: ActionCounters,
    /// Sample application log committed so far
    #[serde(default, alias = "Log", deserialize_with = "lenient_log")]
    pub log: LogSummary,
    #[serde(alias = "state_machine", alias = "StateMachine")]
    pub state_machine: StateMachineSnapshot,
}

/// The protocol state machine's view of its own log.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateMachineSnapshot {
    #[serde(alias = "low_watermark", alias = "LowWatermark")]
    pub low_watermark: SeqNo,
    #[serde(alias = "high_watermark", alias = "HighWatermark")]
    pub high_watermark: SeqNo,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default, alias = "Buckets")]
    pub buckets: Vec<Bucket>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default, alias = "Checkpoints")]
    pub checkpoints: Vec<Checkpoint>,
    /// Progress this replica has observed from the other replicas
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default, alias = "nodes", alias = "Nodes")]
    pub peers: Vec<PeerSnapshot>,
}

impl StateMachineSnapshot {
    /// Number of sequence numbers in `[low_watermark, high_watermark]`.
    /// Zero when the watermarks are inverted.
    pub fn window_len(&self) -> u64 {
        if self.high_watermark < self.low_watermark {
            return 0;
        }
        (self.high_watermark - self.low_watermark).saturating_add(1)
    }

    /// Whether `seq_no` lies inside this node's watermark window.
    pub fn contains(&self, seq_no: SeqNo) -> bool {
        seq_no >= self.low_watermark && seq_no <= self.high_watermark
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// State code of `seq_no` in `bucket`, if the sequence is inside the window.
    pub fn sequence_code(&self, bucket: &Bucket, seq_no: SeqNo) -> Option<SequenceCode> {
        if !self.contains(seq_no) {
            return None;
        }
        let index = usize::try_from(seq_no - self.low_watermark).ok()?;
        bucket.sequences.get(index).copied()
    }
}

/// One processing lane: a state code per sequence number in the window.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    #[serde(alias = "ID", alias = "Id")]
    pub id: BucketId,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default, alias = "Sequences")]
    pub sequences: Vec<SequenceCode>,
}

/// Checkpoint record at a sequence number where a checkpoint boundary occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    #[serde(alias = "seq_no", alias = "SeqNo")]
    pub seq_no: SeqNo,
    /// This replica has decided on the checkpoint value
    #[serde(default, alias = "local_decision", alias = "LocalDecision")]
    pub local_decision: bool,
    /// A network quorum agrees on the checkpoint value
    #[serde(default, alias = "net_quorum", alias = "NetQuorum")]
    pub net_quorum: bool,
    /// Pending agreements, or the largest agreeing set seen so far
    #[serde(
        default,
        alias = "pending_or_max_agreements",
        alias = "maxAgreements",
        alias = "max_agreements",
        alias = "MaxAgreements"
    )]
    pub pending_or_max_agreements: u64,
}

/// Another replica's progress as observed by the reporting replica.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerSnapshot {
    #[serde(alias = "ID", alias = "Id")]
    pub id: NodeId,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default, alias = "bucket_statuses", alias = "BucketStatuses")]
    pub bucket_statuses: Vec<BucketStatus>,
}

/// Latest checkpoint, commit and prepare a peer reached in one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketStatus {
    #[serde(alias = "bucket_id", alias = "BucketID", alias = "BucketId")]
    pub bucket_id: BucketId,
    #[serde(default, alias = "last_checkpoint", alias = "LastCheckpoint")]
    pub last_checkpoint: SeqNo,
    #[serde(default, alias = "last_commit", alias = "LastCommit")]
    pub last_commit: SeqNo,
    #[serde(default, alias = "last_prepare", alias = "LastPrepare")]
    pub last_prepare: SeqNo,
}

/// Summary of the sample application log a node commits into.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogSummary {
    #[serde(alias = "total_bytes", alias = "TotalBytes")]
    pub total_bytes: u64,
    #[serde(alias = "Position")]
    pub position: usize,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(alias = "last_bytes", alias = "LastBytes")]
    pub last_bytes: Vec<u8>,
}

/// Accepts a log summary object, `null`, or a pre-encoded blob.
///
/// Go status servers marshal the log to JSON first and embed the bytes, which
/// arrive as a base64 string. Blobs that do not decode to a summary yield an
/// empty one rather than failing the whole poll.
fn lenient_log<'de, D>(deserializer: D) -> Result<LogSummary, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Summary(LogSummary),
        Opaque(serde_json::Value),
    }

    match Option::<Repr>::deserialize(deserializer)? {
        Some(Repr::Summary(summary)) => Ok(summary),
        Some(Repr::Opaque(serde_json::Value::String(blob))) => Ok(decode_log_blob(&blob)),
        Some(Repr::Opaque(_)) | None => Ok(LogSummary::default()),
    }
}

fn decode_log_blob(blob: &str) -> LogSummary {
    let bytes = match STANDARD.decode(blob) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(error = %e, "Log blob is not base64, ignoring");
            return LogSummary::default();
        }
    };
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        debug!(error = %e, "Log blob is not a log summary, ignoring");
        LogSummary::default()
    })
}
