//! Row construction for the aligned matrix.

use mir_status_types::{BucketStatus, PeerSnapshot, SeqNo, StateMachineSnapshot};

use crate::domain::{
    Alignment, BucketRow, Cell, HeaderRow, NodeAlignment, PeerBlock, PeerMarker, PeerRow,
    SequenceCodec, LABEL_COLUMNS,
};

/// Builds bucket rows and peer detail rows against one alignment.
pub struct SequenceMatrixBuilder<'a> {
    codec: &'a SequenceCodec,
    alignment: &'a Alignment,
}

impl<'a> SequenceMatrixBuilder<'a> {
    pub fn new(codec: &'a SequenceCodec, alignment: &'a Alignment) -> Self {
        Self { codec, alignment }
    }

    pub fn header(&self) -> HeaderRow {
        HeaderRow {
            label_columns: LABEL_COLUMNS,
            sequence_numbers: self.alignment.columns().collect(),
        }
    }

    /// One row per bucket, in snapshot order.
    pub fn bucket_rows(&self, sm: &StateMachineSnapshot, placement: &NodeAlignment) -> Vec<BucketRow> {
        sm.buckets
            .iter()
            .map(|bucket| {
                let cells = self.framed(placement, |cells| {
                    cells.extend(
                        bucket
                            .sequences
                            .iter()
                            .map(|code| Cell::Sequence(self.codec.symbol_for(*code))),
                    );
                });
                BucketRow {
                    bucket_id: bucket.id,
                    label: format!("Bucket-{}", bucket.id),
                    cells,
                }
            })
            .collect()
    }

    /// Detail rows for every peer the node reports, one row per bucket status.
    pub fn peer_blocks(&self, sm: &StateMachineSnapshot, placement: &NodeAlignment) -> Vec<PeerBlock> {
        sm.peers
            .iter()
            .map(|peer| self.peer_block(peer, sm, placement))
            .collect()
    }

    fn peer_block(
        &self,
        peer: &PeerSnapshot,
        sm: &StateMachineSnapshot,
        placement: &NodeAlignment,
    ) -> PeerBlock {
        let rows = peer
            .bucket_statuses
            .iter()
            .map(|status| PeerRow {
                bucket_id: status.bucket_id,
                label: format!("Bucket-{}", status.bucket_id),
                cells: self.framed(placement, |cells| {
                    cells.extend(
                        (sm.low_watermark..=sm.high_watermark)
                            .map(|seq| Cell::Peer { marker: peer_marker(status, seq) }),
                    );
                }),
            })
            .collect();

        PeerBlock {
            peer_id: peer.id,
            label: format!("Node-{}", peer.id),
            rows,
        }
    }

    /// Offset cells, the node's own cells, then padding cells.
    fn framed(&self, placement: &NodeAlignment, fill: impl FnOnce(&mut Vec<Cell>)) -> Vec<Cell> {
        let mut cells = Vec::with_capacity(self.alignment.width());
        cells.extend(std::iter::repeat(Cell::Offset).take(placement.offset));
        fill(&mut cells);
        cells.extend(std::iter::repeat(Cell::Padding).take(placement.padding));
        cells
    }
}

/// Marker for `seq` in a peer's bucket status. Checkpoint beats commit beats prepare.
fn peer_marker(status: &BucketStatus, seq: SeqNo) -> Option<PeerMarker> {
    if status.last_checkpoint == seq {
        Some(PeerMarker::Checkpoint)
    } else if status.last_commit == seq {
        Some(PeerMarker::Commit)
    } else if status.last_prepare == seq {
        Some(PeerMarker::Prepare)
    } else {
        None
    }
}
