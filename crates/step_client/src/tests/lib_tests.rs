use super::*;
use async_trait::async_trait;
use shared::error::ProtocolError;
use std::sync::{Arc, Mutex};

struct TestTransport {
    stdout: Vec<u8>,
    hang: bool,
    fail_to_start: bool,
    requests: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl TestTransport {
    fn replying(stdout: &str) -> Self {
        Self {
            stdout: stdout.as_bytes().to_vec(),
            hang: false,
            fail_to_start: false,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn hanging() -> Self {
        let mut transport = Self::replying("");
        transport.hang = true;
        transport
    }

    fn unavailable() -> Self {
        let mut transport = Self::replying("");
        transport.fail_to_start = true;
        transport
    }
}

#[async_trait]
impl SolverTransport for TestTransport {
    async fn exchange(&self, request: Vec<u8>) -> Result<SolverOutput, StepError> {
        self.requests.lock().expect("lock").push(request);
        if self.fail_to_start {
            return Err(StepError::ProcessUnavailable {
                program: "./astar".to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        if self.hang {
            std::future::pending::<()>().await;
        }
        Ok(SolverOutput {
            stdout: self.stdout.clone(),
            exit_code: Some(0),
        })
    }
}

fn options(timeout_ms: u64, layout: RequestLayout) -> StepOptions {
    StepOptions {
        timeout: Duration::from_millis(timeout_ms),
        layout,
    }
}

#[tokio::test]
async fn step_sends_every_cell_and_endpoints() {
    let transport = TestTransport::replying(r#"{"nodes":[]}"#);
    let requests = Arc::clone(&transport.requests);
    let client = StepClient::new(transport, options(1_000, RequestLayout::Flat));
    let grid = Grid::generate_cluster(1);

    client
        .step(&grid, CellId(0), CellId(3), &mut CancelToken::never())
        .await
        .expect("step");

    let sent = requests.lock().expect("lock");
    assert_eq!(sent.len(), 1);
    let value: serde_json::Value = serde_json::from_slice(&sent[0]).expect("request json");
    assert_eq!(value["startId"], 0);
    assert_eq!(value["endId"], 3);
    let nodes = value["nodes"].as_array().expect("nodes");
    assert_eq!(nodes.len(), 7);
    for key in ["id", "state", "q", "r", "s", "x", "y", "cost", "distance", "neighbors"] {
        assert!(nodes[0].get(key).is_some(), "missing {key}");
    }
}

#[tokio::test]
async fn grid_data_layout_wraps_nodes() {
    let transport = TestTransport::replying(r#"{"gridData":{"nodes":[]}}"#);
    let requests = Arc::clone(&transport.requests);
    let client = StepClient::new(transport, options(1_000, RequestLayout::GridData));
    let grid = Grid::generate_cluster(1);

    client
        .step(&grid, CellId(0), CellId(3), &mut CancelToken::never())
        .await
        .expect("step");

    let sent = requests.lock().expect("lock");
    let value: serde_json::Value = serde_json::from_slice(&sent[0]).expect("request json");
    assert_eq!(value["gridData"]["nodes"].as_array().map(Vec::len), Some(7));
}

#[tokio::test]
async fn returns_validated_response() {
    let client = StepClient::new(
        TestTransport::replying(r#"{"nodes":[{"id":3,"distance":5,"cost":1,"visited":true}]}"#),
        StepOptions::default(),
    );
    let grid = Grid::generate_cluster(1);

    let response = client
        .step(&grid, CellId(0), CellId(3), &mut CancelToken::never())
        .await
        .expect("step");

    assert_eq!(response.nodes.len(), 1);
    assert_eq!(response.find(CellId(3)).and_then(|n| n.distance), Some(5.0));
}

#[tokio::test]
async fn unparseable_output_is_a_protocol_error() {
    let client = StepClient::new(TestTransport::replying("not json"), StepOptions::default());
    let grid = Grid::generate_cluster(1);

    let err = client
        .step(&grid, CellId(0), CellId(3), &mut CancelToken::never())
        .await
        .expect_err("must fail");

    assert!(matches!(err, StepError::Protocol(ProtocolError::Malformed(_))));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn unavailable_solver_is_a_process_error() {
    let client = StepClient::new(TestTransport::unavailable(), StepOptions::default());
    let grid = Grid::generate_cluster(1);

    let err = client
        .step(&grid, CellId(0), CellId(3), &mut CancelToken::never())
        .await
        .expect_err("must fail");

    assert!(matches!(err, StepError::ProcessUnavailable { .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn hung_solver_times_out() {
    let client = StepClient::new(
        TestTransport::hanging(),
        options(50, RequestLayout::Flat),
    );
    let grid = Grid::generate_cluster(1);

    let err = client
        .step(&grid, CellId(0), CellId(3), &mut CancelToken::never())
        .await
        .expect_err("must time out");

    assert!(matches!(err, StepError::TimedOut(t) if t == Duration::from_millis(50)));
}

#[tokio::test]
async fn cancellation_interrupts_a_hung_solver() {
    let client = StepClient::new(
        TestTransport::hanging(),
        options(60_000, RequestLayout::Flat),
    );
    let grid = Grid::generate_cluster(1);
    let (handle, mut token) = cancel_pair();

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
    });

    let err = client
        .step(&grid, CellId(0), CellId(3), &mut token)
        .await
        .expect_err("must cancel");
    canceller.await.expect("canceller");

    assert!(matches!(err, StepError::Cancelled));
}

#[tokio::test]
async fn dropped_handle_does_not_cancel() {
    let client = StepClient::new(
        TestTransport::replying(r#"{"nodes":[]}"#),
        StepOptions::default(),
    );
    let grid = Grid::generate_cluster(1);
    let (handle, mut token) = cancel_pair();
    drop(handle);

    client
        .step(&grid, CellId(0), CellId(3), &mut token)
        .await
        .expect("step");
}

#[tokio::test]
async fn endpoints_outside_grid_are_rejected_before_spawning() {
    let transport = TestTransport::replying(r#"{"nodes":[]}"#);
    let requests = Arc::clone(&transport.requests);
    let client = StepClient::new(transport, StepOptions::default());
    let grid = Grid::generate_cluster(1);

    let err = client
        .step(&grid, CellId(0), CellId(7), &mut CancelToken::never())
        .await
        .expect_err("must fail");

    assert!(matches!(err, StepError::InvalidSelection { .. }));
    assert!(requests.lock().expect("lock").is_empty());
}

#[cfg(unix)]
mod process {
    use super::*;

    fn sh(script: &str) -> SolverCommand {
        SolverCommand::new("sh").with_args(["-c", script])
    }

    #[tokio::test]
    async fn solver_reads_request_from_stdin_and_answers_on_stdout() {
        let client = StepClient::for_command(
            sh(r#"grep -q '"endId":3' && printf '{"nodes":[{"id":3,"distance":5,"cost":1,"visited":true}]}'"#),
            StepOptions::default(),
        );
        let grid = Grid::generate_cluster(1);

        let response = client
            .step(&grid, CellId(0), CellId(3), &mut CancelToken::never())
            .await
            .expect("step");

        assert_eq!(response.find(CellId(3)).and_then(|n| n.visited), Some(true));
    }

    #[tokio::test]
    async fn stderr_chatter_is_not_parsed() {
        let client = StepClient::for_command(
            sh(r#"cat > /dev/null; echo "debug noise" >&2; echo '{"nodes":[]}'"#),
            StepOptions::default(),
        );
        let grid = Grid::generate_cluster(2);

        let response = client
            .step(&grid, CellId(0), CellId(3), &mut CancelToken::never())
            .await
            .expect("step");
        assert!(response.nodes.is_empty());
    }

    #[tokio::test]
    async fn failing_solver_output_is_rejected() {
        let client = StepClient::for_command(
            sh(r#"cat > /dev/null; echo "Error parsing JSON" >&2; exit 1"#),
            StepOptions::default(),
        );
        let grid = Grid::generate_cluster(1);

        let err = client
            .step(&grid, CellId(0), CellId(3), &mut CancelToken::never())
            .await
            .expect_err("must fail");
        assert!(matches!(err, StepError::Protocol(ProtocolError::Empty)));
    }

    #[tokio::test]
    async fn missing_program_is_unavailable() {
        let client = StepClient::for_command(
            SolverCommand::new("./definitely-not-a-solver-binary"),
            StepOptions::default(),
        );
        let grid = Grid::generate_cluster(1);

        let err = client
            .step(&grid, CellId(0), CellId(3), &mut CancelToken::never())
            .await
            .expect_err("must fail");
        assert!(matches!(err, StepError::ProcessUnavailable { .. }));
    }

    #[tokio::test]
    async fn slow_solver_is_killed_on_timeout() {
        let client = StepClient::for_command(
            sh("sleep 5; echo '{\"nodes\":[]}'"),
            options(200, RequestLayout::Flat),
        );
        let grid = Grid::generate_cluster(1);
        let started = Instant::now();

        let err = client
            .step(&grid, CellId(0), CellId(3), &mut CancelToken::never())
            .await
            .expect_err("must time out");

        assert!(matches!(err, StepError::TimedOut(_)));
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
