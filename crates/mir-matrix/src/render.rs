//! The engine's entry point: snapshots in, aligned matrix out.

use mir_status_types::{validate_all, NodeSnapshot};
use serde::Serialize;
use tracing::debug;

use crate::builder::SequenceMatrixBuilder;
use crate::domain::{
    AlignedMatrix, CheckpointKeyRule, CheckpointSpanCollapser, DetailExpansion, ExpansionState,
    NodeGroup, SchemaVersion, SequenceCodec, WatermarkAligner,
};
use crate::error::{MatrixError, MatrixResult};

/// Default upper bound on aligned columns.
pub const DEFAULT_MAX_COLUMNS: usize = 4096;

/// Versioned interpretation rules for one status schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub codec: SequenceCodec,
    pub checkpoint_keys: CheckpointKeyRule,
    /// Refuse to build rows wider than this
    pub max_columns: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::for_schema(SchemaVersion::default())
    }
}

impl RenderOptions {
    pub fn for_schema(version: SchemaVersion) -> Self {
        Self {
            codec: SequenceCodec::for_version(version),
            checkpoint_keys: CheckpointKeyRule::default(),
            max_columns: DEFAULT_MAX_COLUMNS,
        }
    }

    pub fn with_checkpoint_keys(mut self, rule: CheckpointKeyRule) -> Self {
        self.checkpoint_keys = rule;
        self
    }

    pub fn with_max_columns(mut self, max_columns: usize) -> Self {
        self.max_columns = max_columns;
        self
    }
}

/// Summary of a render, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderStats {
    pub nodes: usize,
    pub columns: usize,
    pub bucket_rows: usize,
    pub peer_rows: usize,
}

impl AlignedMatrix {
    pub fn stats(&self) -> RenderStats {
        RenderStats {
            nodes: self.groups.len(),
            columns: self.width(),
            bucket_rows: self.groups.iter().map(|g| g.bucket_rows.len()).sum(),
            peer_rows: self
                .groups
                .iter()
                .flat_map(|g| g.peer_blocks.iter().flatten())
                .map(|b| b.rows.len())
                .sum(),
        }
    }
}

/// Turn one poll's snapshots into an aligned matrix.
///
/// Returns `Ok(None)` when there is nothing to render (no nodes, or a global
/// watermark window with `high <= low`). Malformed snapshots are rejected
/// before any row is built. Peer detail rows are only built for expanded
/// node groups.
pub fn render_model(
    nodes: &[NodeSnapshot],
    expansion: &DetailExpansion,
    options: &RenderOptions,
) -> MatrixResult<Option<AlignedMatrix>> {
    validate_all(nodes)?;

    let Some(alignment) = WatermarkAligner::align(nodes) else {
        return Ok(None);
    };

    if alignment.width() > options.max_columns {
        return Err(MatrixError::WindowTooWide {
            width: alignment.width(),
            max: options.max_columns,
        });
    }

    let builder = SequenceMatrixBuilder::new(&options.codec, &alignment);
    let collapser = CheckpointSpanCollapser::new(options.checkpoint_keys);

    let groups = nodes
        .iter()
        .zip(&alignment.per_node)
        .map(|(node, placement)| {
            let sm = &node.state_machine;
            let state = expansion.state(node.id);
            let peer_blocks = match state {
                ExpansionState::Expanded => Some(builder.peer_blocks(sm, placement)),
                ExpansionState::Collapsed => None,
            };

            NodeGroup {
                node_id: node.id,
                label: format!("Node-{} State Machine", node.id),
                row_span: sm.buckets.len(),
                actions: node.actions,
                committed_bytes: node.log.total_bytes,
                bucket_rows: builder.bucket_rows(sm, placement),
                checkpoint_row: collapser.collapse(sm, &alignment),
                expansion: state,
                peer_blocks,
            }
        })
        .collect();

    let matrix = AlignedMatrix {
        global_low: alignment.global_low,
        global_high: alignment.global_high,
        header: builder.header(),
        groups,
    };

    debug!(stats = ?matrix.stats(), "Rendered sequence matrix");
    Ok(Some(matrix))
}
