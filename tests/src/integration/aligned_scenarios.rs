//! # Aligned Scenarios
//!
//! Multi-node polls with staggered watermark windows: column alignment,
//! filler placement, detail expansion and checkpoint span collapsing.

#[cfg(test)]
mod tests {
    use mir_matrix::{
        render_model, Cell, CheckpointKeyRule, CheckpointStatus, DetailExpansion, PeerMarker,
        RenderOptions,
    };
    use mir_status_types::{decode_status, Bucket, NodeSnapshot, StateMachineSnapshot};
    use proptest::prelude::*;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Three replicas in canonical camelCase:
    ///
    /// ```text
    /// seq     10 11 12 13 14 15 16
    /// node 0  [     window    ]  .  .
    /// node 2  [win]  .  .  .  .  .
    /// node 1   -  - [   window     ]
    /// ```
    const STAGGERED: &str = r#"[
      {
        "id": 0,
        "actions": {"broadcast": 0, "unicast": 0, "preprocess": 0, "digest": 0,
                    "validate": 0, "commit": 2, "checkpoint": 0},
        "log": {"totalBytes": 96, "position": 4},
        "stateMachine": {
          "lowWatermark": 10, "highWatermark": 14,
          "buckets": [
            {"id": 0, "sequences": [6, 6, 6, 1, 0]},
            {"id": 1, "sequences": [6, 6, 1, 0, 0]}
          ],
          "checkpoints": [
            {"seqNo": 11, "localDecision": true, "netQuorum": true, "maxAgreements": 3},
            {"seqNo": 11, "localDecision": false, "netQuorum": false, "maxAgreements": 1},
            {"seqNo": 14, "localDecision": true, "netQuorum": false, "maxAgreements": 1},
            {"seqNo": 40, "localDecision": true, "netQuorum": true, "maxAgreements": 3}
          ],
          "peers": [
            {"id": 1, "bucketStatuses": [
              {"bucketId": 0, "lastCheckpoint": 11, "lastCommit": 13, "lastPrepare": 14},
              {"bucketId": 1, "lastCheckpoint": 11, "lastCommit": 12, "lastPrepare": 12}
            ]}
          ]
        }
      },
      {
        "id": 1,
        "stateMachine": {
          "lowWatermark": 12, "highWatermark": 16,
          "buckets": [
            {"id": 0, "sequences": [6, 6, 5, 0, 0]},
            {"id": 1, "sequences": [6, 5, 0, 0, 0]}
          ]
        }
      },
      {
        "id": 2,
        "stateMachine": {
          "lowWatermark": 10, "highWatermark": 11,
          "buckets": [
            {"id": 0, "sequences": [1, 0]},
            {"id": 1, "sequences": [0, 0]}
          ]
        }
      }
    ]"#;

    fn staggered() -> Vec<NodeSnapshot> {
        decode_status(STAGGERED.as_bytes()).unwrap()
    }

    fn filler_counts(cells: &[Cell]) -> (usize, usize) {
        let offset = cells.iter().take_while(|c| **c == Cell::Offset).count();
        let padding = cells.iter().rev().take_while(|c| **c == Cell::Padding).count();
        (offset, padding)
    }

    // =============================================================================
    // ALIGNMENT
    // =============================================================================

    #[test]
    fn test_union_window_and_fillers() {
        let matrix = render_model(&staggered(), &DetailExpansion::new(), &RenderOptions::default())
            .unwrap()
            .unwrap();

        assert_eq!((matrix.global_low, matrix.global_high), (10, 16));
        assert_eq!(matrix.header.sequence_numbers, (10..=16).collect::<Vec<_>>());

        let expected = [(0, (0, 2)), (1, (2, 0)), (2, (0, 5))];
        for (node, fillers) in expected {
            let group = matrix.group(node).unwrap();
            for row in &group.bucket_rows {
                assert_eq!(row.cells.len(), 7, "node {node} {}", row.label);
                assert_eq!(filler_counts(&row.cells), fillers, "node {node} {}", row.label);
            }
        }
    }

    #[test]
    fn test_groups_follow_snapshot_order() {
        let matrix = render_model(&staggered(), &DetailExpansion::new(), &RenderOptions::default())
            .unwrap()
            .unwrap();

        let labels: Vec<&str> = matrix.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Node-0 State Machine", "Node-1 State Machine", "Node-2 State Machine"]
        );

        let first = matrix.group(0).unwrap();
        assert_eq!(first.committed_bytes, 96);
        assert_eq!(first.actions.total(), 2);
        assert_eq!(first.bucket_rows[1].label, "Bucket-1");
    }

    // =============================================================================
    // CHECKPOINTS
    // =============================================================================

    #[test]
    fn test_checkpoint_spans_absorb_empty_columns() {
        let matrix = render_model(&staggered(), &DetailExpansion::new(), &RenderOptions::default())
            .unwrap()
            .unwrap();
        let row = &matrix.group(0).unwrap().checkpoint_row;

        // duplicate at 11 resolves to the first record; 40 is off the grid
        assert_eq!(row.cells.len(), 2);
        assert_eq!((row.cells[0].seq_no, row.cells[0].col_span), (11, 2));
        assert_eq!(row.cells[0].status, CheckpointStatus::Agreed);
        assert_eq!((row.cells[1].seq_no, row.cells[1].col_span), (14, 3));
        assert_eq!(row.cells[1].status, CheckpointStatus::LocalOnly);

        // row ends short after the last checkpoint
        assert_eq!(row.covered(), 5);
        assert!(row.covered() <= matrix.width());
    }

    #[test]
    fn test_node_relative_checkpoint_keys() {
        let mut nodes = staggered();
        nodes[0].state_machine.checkpoints.truncate(1);
        nodes[0].state_machine.checkpoints[0].seq_no = 3;

        let options = RenderOptions::default().with_checkpoint_keys(CheckpointKeyRule::NodeRelative);
        let matrix = render_model(&nodes, &DetailExpansion::new(), &options)
            .unwrap()
            .unwrap();

        let cell = &matrix.group(0).unwrap().checkpoint_row.cells[0];
        assert_eq!((cell.seq_no, cell.col_span), (13, 4));
    }

    // =============================================================================
    // DETAIL EXPANSION
    // =============================================================================

    #[test]
    fn test_expansion_adds_peer_rows_for_that_node_only() {
        let nodes = staggered();
        let mut expansion = DetailExpansion::new();
        expansion.toggle(0);

        let matrix = render_model(&nodes, &expansion, &RenderOptions::default())
            .unwrap()
            .unwrap();
        let group = matrix.group(0).unwrap();
        let blocks = group.peer_blocks.as_ref().unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].rows.len(), 2);

        let markers: Vec<Option<PeerMarker>> = blocks[0].rows[0]
            .cells
            .iter()
            .map(|cell| match cell {
                Cell::Peer { marker } => *marker,
                _ => None,
            })
            .collect();
        assert_eq!(
            markers,
            vec![
                None,
                Some(PeerMarker::Checkpoint),
                None,
                Some(PeerMarker::Commit),
                Some(PeerMarker::Prepare),
                None,
                None
            ]
        );
        // same framing as the node's own rows
        assert_eq!(filler_counts(&blocks[0].rows[0].cells), (0, 2));

        // checkpoint beats commit beats prepare when they coincide
        assert_eq!(blocks[0].rows[1].cells[2].text(), "C");

        assert!(matrix.group(1).unwrap().peer_blocks.is_none());
        assert!(matrix.group(2).unwrap().peer_blocks.is_none());

        let stats = matrix.stats();
        assert_eq!(stats.bucket_rows, 6);
        assert_eq!(stats.peer_rows, 2);

        // collapsing again restores the compact group
        expansion.toggle(0);
        let collapsed = render_model(&nodes, &expansion, &RenderOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(collapsed.stats().peer_rows, 0);
    }

    // =============================================================================
    // PROPERTIES
    // =============================================================================

    fn arb_nodes() -> impl Strategy<Value = Vec<NodeSnapshot>> {
        prop::collection::vec((0u64..60, 1u64..12, 1usize..4), 1..6).prop_map(|windows| {
            windows
                .into_iter()
                .enumerate()
                .map(|(id, (low, len, buckets))| NodeSnapshot {
                    id: id as u64,
                    actions: Default::default(),
                    log: Default::default(),
                    state_machine: StateMachineSnapshot {
                        low_watermark: low,
                        high_watermark: low + len,
                        buckets: (0..buckets as u64)
                            .map(|b| Bucket {
                                id: b,
                                sequences: vec![6; len as usize + 1],
                            })
                            .collect(),
                        ..Default::default()
                    },
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_every_row_spans_the_global_window(nodes in arb_nodes()) {
            let matrix = render_model(&nodes, &DetailExpansion::new(), &RenderOptions::default())
                .unwrap()
                .unwrap();

            let global_low = nodes.iter().map(|n| n.state_machine.low_watermark).min().unwrap();
            let global_high = nodes.iter().map(|n| n.state_machine.high_watermark).max().unwrap();
            prop_assert_eq!(matrix.global_low, global_low);
            prop_assert_eq!(matrix.global_high, global_high);

            let width = (global_high - global_low + 1) as usize;
            prop_assert_eq!(matrix.width(), width);

            for (node, group) in nodes.iter().zip(&matrix.groups) {
                let sm = &node.state_machine;
                prop_assert_eq!(group.row_span, sm.buckets.len());
                for row in &group.bucket_rows {
                    prop_assert_eq!(row.cells.len(), width);
                    let (offset, padding) = filler_counts(&row.cells);
                    prop_assert_eq!(offset as u64, sm.low_watermark - global_low);
                    prop_assert_eq!(padding as u64, global_high - sm.high_watermark);
                }
            }
        }
    }
}
