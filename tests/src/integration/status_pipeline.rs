//! # Status Pipeline
//!
//! Raw `/status` documents through decoding, validation and rendering, using
//! the field spellings real status servers emit.

#[cfg(test)]
mod tests {
    use mir_matrix::{
        render_model, Cell, CheckpointStatus, DetailExpansion, MatrixError, RenderOptions,
        SchemaVersion, SequencePhase, SymbolColor,
    };
    use mir_status_types::{decode_status, NodeSnapshot, SnapshotError};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Two replicas as marshalled by a Go status server: PascalCase state
    /// machine, `ID` for the node id, the log as an opaque base64 blob.
    const GO_STATUS: &str = r#"[
      {
        "ID": 0,
        "actions": {"broadcast": 1, "unicast": 0, "preprocess": 0, "digest": 2,
                    "validate": 0, "commit": 0, "checkpoint": 0, "total": 3},
        "log": "eyJUb3RhbEJ5dGVzIjo0Mn0=",
        "stateMachine": {
          "LowWatermark": 0,
          "HighWatermark": 4,
          "Buckets": [
            {"ID": 0, "Sequences": [6, 6, 5, 1, 0]},
            {"ID": 1, "Sequences": [6, 3, 0, 0, 0]}
          ],
          "Checkpoints": [
            {"SeqNo": 2, "LocalDecision": true, "NetQuorum": true, "MaxAgreements": 3}
          ],
          "Nodes": [
            {"ID": 1, "BucketStatuses": [
              {"BucketID": 0, "LastCheckpoint": 2, "LastCommit": 1, "LastPrepare": 3}
            ]}
          ]
        }
      },
      {
        "ID": 1,
        "actions": {"broadcast": 0, "unicast": 0, "preprocess": 0, "digest": 0,
                    "validate": 0, "commit": 0, "checkpoint": 0, "total": 0},
        "log": null,
        "stateMachine": {
          "LowWatermark": 1,
          "HighWatermark": 6,
          "Buckets": [
            {"ID": 0, "Sequences": [6, 6, 6, 2, 0, 0]},
            {"ID": 1, "Sequences": [6, 6, 4, 0, 0, 0]}
          ],
          "Checkpoints": null,
          "Nodes": null
        }
      }
    ]"#;

    fn texts(cells: &[Cell]) -> Vec<&'static str> {
        cells.iter().map(Cell::text).collect()
    }

    // =============================================================================
    // DECODE -> RENDER
    // =============================================================================

    #[test]
    fn test_go_document_renders_aligned() {
        let nodes = decode_status(GO_STATUS.as_bytes()).unwrap();
        assert_eq!(nodes.len(), 2);

        let matrix = render_model(&nodes, &DetailExpansion::new(), &RenderOptions::default())
            .unwrap()
            .unwrap();

        assert_eq!(matrix.header.sequence_numbers, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(matrix.header.label_columns, 2);

        let first = matrix.group(0).unwrap();
        assert_eq!(first.row_span, 2);
        assert_eq!(first.actions.total(), 3);
        assert_eq!(first.committed_bytes, 42);
        assert_eq!(texts(&first.bucket_rows[0].cells), vec!["C", "C", "P", "Q", "", "", ""]);
        assert_eq!(first.bucket_rows[0].cells[5], Cell::Padding);

        let second = matrix.group(1).unwrap();
        assert_eq!(second.bucket_rows[0].cells[0], Cell::Offset);
        assert_eq!(texts(&second.bucket_rows[1].cells), vec!["", "C", "C", "V", "", "", ""]);
        assert!(second.checkpoint_row.cells.is_empty());
    }

    #[test]
    fn test_invalid_code_is_flagged_under_v1_only() {
        let nodes = decode_status(GO_STATUS.as_bytes()).unwrap();

        let v1 = render_model(&nodes, &DetailExpansion::new(), &RenderOptions::default())
            .unwrap()
            .unwrap();
        match v1.group(0).unwrap().bucket_rows[1].cells[1] {
            Cell::Sequence(symbol) => {
                assert_eq!(symbol.phase, SequencePhase::Invalid);
                assert_eq!(symbol.color, SymbolColor::Invalid);
            }
            other => panic!("expected sequence cell, got {other:?}"),
        }

        let v2 = render_model(
            &nodes,
            &DetailExpansion::new(),
            &RenderOptions::for_schema(SchemaVersion::V2),
        )
        .unwrap()
        .unwrap();
        assert_eq!(v2.group(0).unwrap().bucket_rows[0].cells[3].text(), "A");
        assert_eq!(v2.group(0).unwrap().bucket_rows[1].cells[1].text(), "R");
    }

    #[test]
    fn test_out_of_table_codes_render_as_unknown() {
        let doc = GO_STATUS.replacen("[6, 6, 5, 1, 0]", "[6, 9, 5, -1, 0]", 1);
        let nodes = decode_status(doc.as_bytes()).unwrap();

        for options in [RenderOptions::default(), RenderOptions::for_schema(SchemaVersion::V2)] {
            let matrix = render_model(&nodes, &DetailExpansion::new(), &options)
                .unwrap()
                .unwrap();
            let row = &matrix.group(0).unwrap().bucket_rows[0];
            assert_eq!(texts(&row.cells), vec!["C", "?", "P", "?", "", "", ""]);

            for (column, code) in [(1, 9), (3, -1)] {
                match row.cells[column] {
                    Cell::Sequence(symbol) => {
                        assert_eq!(symbol.code, code);
                        assert_eq!(symbol.phase, SequencePhase::Unknown);
                        assert_eq!(symbol.color, SymbolColor::Unknown);
                    }
                    other => panic!("expected sequence cell, got {other:?}"),
                }
            }
        }
    }

    #[test]
    fn test_checkpoint_and_peer_rows() {
        let nodes = decode_status(GO_STATUS.as_bytes()).unwrap();
        let mut expansion = DetailExpansion::new();
        expansion.toggle(0);

        let matrix = render_model(&nodes, &expansion, &RenderOptions::default())
            .unwrap()
            .unwrap();
        let group = matrix.group(0).unwrap();

        let checkpoint = &group.checkpoint_row.cells[0];
        assert_eq!(checkpoint.seq_no, 2);
        assert_eq!(checkpoint.col_span, 3);
        assert_eq!(checkpoint.status, CheckpointStatus::Agreed);

        let blocks = group.peer_blocks.as_ref().unwrap();
        assert_eq!(blocks[0].label, "Node-1");
        assert_eq!(texts(&blocks[0].rows[0].cells), vec!["", "C", "X", "P", "", "", ""]);

        assert!(matrix.group(1).unwrap().peer_blocks.is_none());
    }

    // =============================================================================
    // REJECTION
    // =============================================================================

    #[test]
    fn test_action_total_mismatch_fails_decode() {
        let doc = GO_STATUS.replacen(r#""total": 3"#, r#""total": 4"#, 1);
        let err = decode_status(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, SnapshotError::Decode(_)));
    }

    #[test]
    fn test_short_bucket_is_malformed() {
        let doc = GO_STATUS.replacen("[6, 3, 0, 0, 0]", "[6, 3, 0, 0]", 1);
        assert!(matches!(
            decode_status(doc.as_bytes()),
            Err(SnapshotError::BucketLengthMismatch { .. })
        ));

        // shape-only decoding lets it through; the renderer still refuses it
        let nodes: Vec<NodeSnapshot> = serde_json::from_str(&doc).unwrap();

        let err = render_model(&nodes, &DetailExpansion::new(), &RenderOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            MatrixError::Malformed(SnapshotError::BucketLengthMismatch {
                node: 0,
                bucket: 1,
                expected: 5,
                actual: 4
            })
        ));
    }

    #[test]
    fn test_empty_document_renders_nothing() {
        let nodes = decode_status(b"[]").unwrap();
        assert!(render_model(&nodes, &DetailExpansion::new(), &RenderOptions::default())
            .unwrap()
            .is_none());
    }
}
