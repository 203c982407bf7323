//! # Dashboard Flow
//!
//! Key presses through the controller against the in-process demo cluster,
//! checking what the dashboard model ends up showing.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mir_dash::api::{CommandDispatcher, StatusProvider};
    use mir_dash::demo::DemoCluster;
    use mir_dash::{App, AppState, AutoProcess, Command, Controller};
    use mir_matrix::{Cell, CheckpointStatus, RenderOptions};
    use tokio::sync::Mutex;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    async fn dashboard(cluster: Arc<DemoCluster>) -> Controller {
        let provider: Arc<dyn StatusProvider> = cluster.clone();
        let dispatcher: Arc<dyn CommandDispatcher> = cluster;
        let app = App::new(RenderOptions::default(), AutoProcess::Off, "demo cluster");
        let controller = Controller::new(provider, dispatcher, Arc::new(Mutex::new(app)));
        assert!(controller.refresh().await);
        controller
    }

    /// Select `node` with the arrow keys, then press `key`.
    async fn press_on(controller: &Controller, node: u64, key: char) {
        let command = {
            let mut app = controller.app().lock().await;
            while app.selected_node_id() != Some(node) {
                app.select_next();
            }
            app.handle_key(key)
        };
        if let Some(command) = command {
            controller.execute(command).await;
        }
    }

    // =============================================================================
    // SCENARIOS
    // =============================================================================

    #[tokio::test]
    async fn test_quorum_checkpoint_moves_windows_apart() {
        let cluster = Arc::new(DemoCluster::default());
        cluster.prefill(5).unwrap();
        let controller = dashboard(cluster).await;

        for _ in 0..4 {
            for node in 0..3 {
                press_on(&controller, node, 'p').await;
            }
        }

        let app = controller.app().lock().await;
        assert!(app.error_message.is_none());
        assert!(app.processing.is_empty());

        let matrix = app.matrix.as_ref().unwrap();
        assert_eq!((matrix.global_low, matrix.global_high), (0, 24));
        assert_eq!(matrix.width(), 25);

        for node in 0..3 {
            let group = matrix.group(node).unwrap();
            let row = &group.bucket_rows[0];
            assert!(row.cells[..5].iter().all(|c| *c == Cell::Offset));
            assert!(!row.cells[24].is_filler());

            let checkpoint = &group.checkpoint_row.cells[0];
            assert_eq!((checkpoint.seq_no, checkpoint.col_span), (5, 6));
            assert_eq!(checkpoint.status, CheckpointStatus::Agreed);
            assert!(group.committed_bytes > 0);
        }

        let laggard = matrix.group(3).unwrap();
        assert!(laggard.bucket_rows[0].cells[20..].iter().all(|c| *c == Cell::Padding));
        assert_eq!(laggard.bucket_rows[1].cells[1].text(), "Q");
        assert_eq!(
            laggard.checkpoint_row.cells[0].status,
            CheckpointStatus::NetworkQuorumOnly
        );
        // deciding a checkpoint leaves a checkpoint action behind
        assert_eq!(app.busy_nodes(), vec![0, 1, 2, 3]);
        assert!(app.nodes[..3].iter().all(|n| n.actions.checkpoint == 1));
    }

    #[tokio::test]
    async fn test_number_keys_expand_peer_progress() {
        let cluster = Arc::new(DemoCluster::default());
        cluster.prefill(5).unwrap();
        let controller = dashboard(cluster).await;

        for _ in 0..4 {
            for node in 0..3 {
                controller.execute(Command::Process(node)).await;
            }
        }

        let mut app = controller.app().lock().await;
        assert!(app.handle_key('4').is_none());

        let matrix = app.matrix.as_ref().unwrap();
        let laggard = matrix.group(3).unwrap();
        let blocks = laggard.peer_blocks.as_ref().unwrap();
        assert_eq!(blocks.len(), 3);
        for block in blocks {
            assert_eq!(block.rows.len(), 4);
            // every peer that moved reports its stable checkpoint at 5
            assert!(block.rows.iter().all(|row| row.cells[5].text() == "X"));
        }
        assert!(matrix.group(0).unwrap().peer_blocks.is_none());

        // 'e' expands the rest, a second press collapses everything
        app.handle_key('e');
        let matrix = app.matrix.as_ref().unwrap();
        assert!(matrix.groups.iter().all(|g| g.peer_blocks.is_some()));
        assert_eq!(matrix.stats().peer_rows, 4 * 3 * 4);

        app.handle_key('e');
        let matrix = app.matrix.as_ref().unwrap();
        assert!(matrix.groups.iter().all(|g| g.peer_blocks.is_none()));
    }

    #[tokio::test]
    async fn test_propose_and_tick_keys() {
        let cluster = Arc::new(DemoCluster::default());
        let controller = dashboard(cluster).await;

        press_on(&controller, 2, 'n').await;
        press_on(&controller, 1, 't').await;

        let app = controller.app().lock().await;
        assert!(app.error_message.is_none());
        assert_eq!(app.nodes[2].actions.preprocess, 1);
        assert_eq!(app.nodes[1].actions.broadcast, 1);
        assert_eq!(app.busy_nodes(), vec![0, 1, 2, 3]);

        // seq 1 lands in bucket 1 on every replica
        let matrix = app.matrix.as_ref().unwrap();
        assert!(matrix
            .groups
            .iter()
            .all(|g| g.bucket_rows[1].cells[1].text() == "Q"));
    }

    #[tokio::test]
    async fn test_full_window_surfaces_error_and_keeps_matrix() {
        let cluster = Arc::new(DemoCluster::default());
        cluster.prefill(19).unwrap();
        let controller = dashboard(cluster).await;

        press_on(&controller, 0, 'n').await;

        let app = controller.app().lock().await;
        let error = app.error_message.as_deref().unwrap();
        assert!(error.starts_with("Propose node 0"), "{error}");
        assert!(app.matrix.is_some());
        assert_eq!(app.matrix.as_ref().unwrap().width(), 20);
    }

    #[tokio::test]
    async fn test_quit_and_help_keys() {
        let controller = dashboard(Arc::new(DemoCluster::default())).await;
        let mut app = controller.app().lock().await;

        assert!(app.handle_key('?').is_none());
        assert_eq!(app.state, AppState::Help);
        app.handle_key('x');
        assert_eq!(app.state, AppState::Dashboard);

        assert_eq!(app.handle_key('r'), Some(Command::Refresh));
        app.handle_key('q');
        assert!(app.should_quit());
    }
}
