//! The aligned matrix handed to rendering layers.

use mir_status_types::{ActionCounters, BucketId, NodeId, SeqNo};
use serde::Serialize;

use super::checkpoint::CheckpointRow;
use super::codec::SequenceSymbol;
use super::expansion::ExpansionState;

/// Number of label columns ahead of the sequence columns (node, bucket).
pub const LABEL_COLUMNS: usize = 2;

/// Marker drawn in a peer detail row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerMarker {
    /// Peer's last checkpoint in this bucket
    Checkpoint,
    /// Peer's last commit in this bucket
    Commit,
    /// Peer's last prepare in this bucket
    Prepare,
}

impl PeerMarker {
    pub fn text(&self) -> &'static str {
        match self {
            PeerMarker::Checkpoint => "X",
            PeerMarker::Commit => "C",
            PeerMarker::Prepare => "P",
        }
    }
}

/// One column of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cell {
    /// Filler before the node's window
    Offset,
    /// Filler after the node's window
    Padding,
    Sequence(SequenceSymbol),
    Peer { marker: Option<PeerMarker> },
}

impl Cell {
    pub fn is_filler(&self) -> bool {
        matches!(self, Cell::Offset | Cell::Padding)
    }

    pub fn text(&self) -> &'static str {
        match self {
            Cell::Offset | Cell::Padding => "",
            Cell::Sequence(symbol) => symbol.text,
            Cell::Peer { marker } => marker.map(|m| m.text()).unwrap_or(""),
        }
    }
}

/// Column labels: two label columns, then one column per sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderRow {
    pub label_columns: usize,
    pub sequence_numbers: Vec<SeqNo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketRow {
    pub bucket_id: BucketId,
    pub label: String,
    pub cells: Vec<Cell>,
}

/// One row per bucket status a peer reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeerRow {
    pub bucket_id: BucketId,
    pub label: String,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeerBlock {
    pub peer_id: NodeId,
    pub label: String,
    pub rows: Vec<PeerRow>,
}

/// Everything drawn for one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeGroup {
    pub node_id: NodeId,
    /// Vertical label spanning all bucket rows
    pub label: String,
    pub row_span: usize,
    pub actions: ActionCounters,
    pub committed_bytes: u64,
    pub bucket_rows: Vec<BucketRow>,
    pub checkpoint_row: CheckpointRow,
    pub expansion: ExpansionState,
    /// `None` while collapsed: the rows are never built
    pub peer_blocks: Option<Vec<PeerBlock>>,
}

/// Output of [`crate::render_model`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignedMatrix {
    pub global_low: SeqNo,
    pub global_high: SeqNo,
    pub header: HeaderRow,
    pub groups: Vec<NodeGroup>,
}

impl AlignedMatrix {
    /// Number of sequence columns.
    pub fn width(&self) -> usize {
        self.header.sequence_numbers.len()
    }

    pub fn group(&self, node_id: NodeId) -> Option<&NodeGroup> {
        self.groups.iter().find(|g| g.node_id == node_id)
    }
}
