//! # Sequence Matrix Engine
//!
//! Turns one poll's worth of [`NodeSnapshot`](mir_status_types::NodeSnapshot)s
//! into an [`AlignedMatrix`]: a table with one column per sequence number of
//! the union watermark window and, per node, one row per bucket, a collapsed
//! checkpoint row and optional peer detail rows.
//!
//! ## Pipeline
//!
//! ```text
//! snapshots ──validate──► WatermarkAligner ──► SequenceMatrixBuilder ──► AlignedMatrix
//!                                │                    │
//!                                │             SequenceCodec (per schema)
//!                                └──────► CheckpointSpanCollapser
//! ```
//!
//! Rendering is a pure function of `(snapshots, expansion, options)`. The
//! caller owns the [`DetailExpansion`] state and the poll loop; this crate
//! never performs I/O.

pub mod builder;
pub mod domain;
pub mod error;
pub mod render;

pub use builder::SequenceMatrixBuilder;
pub use domain::*;
pub use error::{MatrixError, MatrixResult};
pub use render::{render_model, RenderOptions, RenderStats, DEFAULT_MAX_COLUMNS};
