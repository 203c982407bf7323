//! Domain types and the pure algorithms of the rendering engine.

pub mod alignment;
pub mod checkpoint;
pub mod codec;
pub mod expansion;
pub mod matrix;

pub use alignment::{Alignment, NodeAlignment, NodeWindow, WatermarkAligner};
pub use checkpoint::{
    CheckpointCell, CheckpointKeyRule, CheckpointRow, CheckpointSpanCollapser, CheckpointStatus,
};
pub use codec::{SchemaVersion, SequenceCodec, SequencePhase, SequenceSymbol, SymbolColor};
pub use expansion::{DetailExpansion, ExpansionState};
pub use matrix::{
    AlignedMatrix, BucketRow, Cell, HeaderRow, NodeGroup, PeerBlock, PeerMarker, PeerRow,
    LABEL_COLUMNS,
};
