//! Watermark alignment across nodes.
//!
//! Each replica tracks its own `[low, high]` window. To draw all replicas in
//! one table, every node's window is placed inside the union window with
//! blank `offset` columns before it and `padding` columns after it:
//!
//! ```text
//! global:  0  1  2  3  4  5  6  7  8  9 10 11 12
//! node 1: [off off][ 2 ..................... 10 ][pad pad]
//! node 2: [ 0 ........................................ 12 ]
//! ```

use std::ops::RangeInclusive;

use mir_status_types::{NodeId, NodeSnapshot, SeqNo};
use serde::Serialize;
use tracing::debug;

/// A node's watermark window, the aligner's only input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeWindow {
    pub node_id: NodeId,
    pub low: SeqNo,
    pub high: SeqNo,
}

impl NodeWindow {
    pub fn of(node: &NodeSnapshot) -> Self {
        Self {
            node_id: node.id,
            low: node.state_machine.low_watermark,
            high: node.state_machine.high_watermark,
        }
    }
}

/// Placement of one node's window inside the global window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeAlignment {
    pub node_id: NodeId,
    pub low: SeqNo,
    pub high: SeqNo,
    /// Filler columns before the node's window
    pub offset: usize,
    /// Filler columns after the node's window
    pub padding: usize,
}

impl NodeAlignment {
    /// Columns covered by the node's own window.
    pub fn window_len(&self) -> usize {
        self.high.saturating_sub(self.low).saturating_add(1) as usize
    }
}

/// Global window plus per-node placement, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alignment {
    pub global_low: SeqNo,
    pub global_high: SeqNo,
    pub per_node: Vec<NodeAlignment>,
}

impl Alignment {
    /// Number of sequence columns in the aligned table.
    pub fn width(&self) -> usize {
        (self.global_high - self.global_low).saturating_add(1) as usize
    }

    pub fn columns(&self) -> RangeInclusive<SeqNo> {
        self.global_low..=self.global_high
    }

    pub fn for_node(&self, node_id: NodeId) -> Option<&NodeAlignment> {
        self.per_node.iter().find(|n| n.node_id == node_id)
    }
}

/// Computes the union window of a set of nodes.
pub struct WatermarkAligner;

impl WatermarkAligner {
    /// Align the windows of validated snapshots.
    ///
    /// Returns `None` when there is nothing to render: no nodes, or a global
    /// window with `high <= low`.
    pub fn align(nodes: &[NodeSnapshot]) -> Option<Alignment> {
        let windows: Vec<NodeWindow> = nodes.iter().map(NodeWindow::of).collect();
        Self::align_windows(&windows)
    }

    pub fn align_windows(windows: &[NodeWindow]) -> Option<Alignment> {
        let global_low = windows.iter().map(|w| w.low).min()?;
        let global_high = windows.iter().map(|w| w.high).max()?;

        if global_high <= global_low {
            debug!(global_low, global_high, "Degenerate watermark window, nothing to render");
            return None;
        }

        let per_node = windows
            .iter()
            .map(|w| NodeAlignment {
                node_id: w.node_id,
                low: w.low,
                high: w.high,
                offset: (w.low - global_low) as usize,
                padding: (global_high - w.high) as usize,
            })
            .collect();

        debug!(
            global_low,
            global_high,
            nodes = windows.len(),
            "Aligned watermark windows"
        );

        Some(Alignment {
            global_low,
            global_high,
            per_node,
        })
    }
}
