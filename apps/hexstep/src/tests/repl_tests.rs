use super::*;

use async_trait::async_trait;
use shared::domain::CellState;
use step_client::{SolverOutput, StepError, StepOptions};

use crate::config::Settings;

struct FixedReply(&'static str);

/// Raises an interrupt as soon as the step starts, then never answers.
struct InterruptedSolver(mpsc::UnboundedSender<()>);

#[async_trait]
impl SolverTransport for InterruptedSolver {
    async fn exchange(&self, _request: Vec<u8>) -> Result<SolverOutput, StepError> {
        let _ = self.0.send(());
        std::future::pending().await
    }
}

#[async_trait]
impl SolverTransport for FixedReply {
    async fn exchange(&self, _request: Vec<u8>) -> Result<SolverOutput, StepError> {
        Ok(SolverOutput {
            stdout: self.0.as_bytes().to_vec(),
            exit_code: Some(0),
        })
    }
}

fn session() -> Session {
    Session::from_settings(&Settings {
        seed: Some(5),
        ..Settings::default()
    })
}

async fn drive(session: &mut Session, reply: &'static str, script: &str) -> String {
    let client = StepClient::new(FixedReply(reply), StepOptions::default());
    let mut out = Vec::new();
    Repl::new(session, &client)
        .run(script.as_bytes(), &mut out)
        .await
        .expect("repl run");
    String::from_utf8(out).expect("utf8 output")
}

#[test]
fn parses_every_command() {
    let cases = [
        ("start", ReplCommand::SelectStart),
        ("END", ReplCommand::SelectEnd),
        ("click 5", ReplCommand::Click(CellId(5))),
        ("randomize", ReplCommand::Randomize),
        ("new 3", ReplCommand::NewCluster(3)),
        ("step", ReplCommand::Step),
        ("show", ReplCommand::Show),
        ("export", ReplCommand::Export(None)),
        ("export out.json", ReplCommand::Export(Some(PathBuf::from("out.json")))),
        ("help", ReplCommand::Help),
        ("exit", ReplCommand::Quit),
        ("  quit  ", ReplCommand::Quit),
    ];
    for (line, expected) in cases {
        assert_eq!(line.parse::<ReplCommand>(), Ok(expected), "{line}");
    }
}

#[test]
fn rejects_bad_commands() {
    assert_eq!(
        "fly".parse::<ReplCommand>(),
        Err("unknown command 'fly' (try 'help')".to_string())
    );
    assert!("click".parse::<ReplCommand>().is_err());
    assert!("click five".parse::<ReplCommand>().is_err());
    assert!("new -1".parse::<ReplCommand>().is_err());
    assert!("step now".parse::<ReplCommand>().is_err());
    assert!("export a b".parse::<ReplCommand>().is_err());
    assert!("new 4000000000".parse::<ReplCommand>().is_err());
}

#[tokio::test]
async fn select_start_click_and_step() {
    let mut session = session();
    let output = drive(
        &mut session,
        r#"{"nodes":[{"id":3,"distance":5,"cost":1,"visited":true}]}"#,
        "start\nclick 5\n\nstep\nquit\nclick 1\n",
    )
    .await;

    assert!(output.starts_with(HELP));
    assert!(output.contains("start = 5\n"));
    assert!(output.contains("step merged: 1 updated, 6 unchanged, max cost 5\n"));
    assert_eq!(session.selection().start_id(), CellId(5));
    assert_eq!(session.grid().get(CellId(5)).map(|c| c.state), Some(CellState::Open));
    assert_eq!(session.grid().get(CellId(3)).map(|c| c.distance), Some(5.0));
}

#[tokio::test]
async fn plain_click_reports_new_state_and_fill() {
    let mut session = session();
    session.begin_select_start();
    session.click(CellId(1)).expect("select start");
    let before = session.grid().get(CellId(2)).map(|c| c.state).expect("cell 2");
    let expected = before.cycled(shared::domain::StateScheme::Binary);

    let output = drive(&mut session, "{}", "click 2\n").await;

    assert_eq!(session.grid().get(CellId(2)).map(|c| c.state), Some(expected));
    let fill = session.color_of(CellId(2)).expect("fill");
    assert!(output.contains(&format!("cell 2 -> {expected} {fill}\n")));
}

#[tokio::test]
async fn failures_are_reported_and_the_loop_continues() {
    let mut session = session();
    let before = session.grid().cells().to_vec();

    let output = drive(&mut session, "not json", "fly\nclick 99\nstep\nshow\n").await;

    assert!(output.contains("error: unknown command 'fly' (try 'help')\n"));
    assert!(output.contains("error: ") && output.contains("99"));
    assert!(output.contains("(grid unchanged)\n"));
    assert!(output.contains("cells=7 "));
    assert_eq!(session.grid().cells(), before.as_slice());
}

#[tokio::test]
async fn new_cluster_reports_clamped_selection() {
    let mut session = session();
    let output = drive(&mut session, "{}", "new 0\n").await;

    assert!(output.contains("new cluster: 1 cells, start = 0, end = 0\n"));
    assert_eq!(session.grid().len(), 1);
}

#[tokio::test]
async fn export_writes_document_to_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("grid.json");
    let mut session = session();

    let output = drive(&mut session, "{}", &format!("export {}\n", path.display())).await;

    assert!(output.contains("exported to "));
    let written = std::fs::read_to_string(&path).expect("read export");
    let value: serde_json::Value = serde_json::from_str(&written).expect("json");
    let nodes = value["nodes"].as_array().expect("nodes");
    assert_eq!(nodes.len(), 7);
    assert_eq!(nodes[0]["neighbors"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn export_without_path_prints_document() {
    let mut session = session();
    let output = drive(&mut session, "{}", "export\n").await;
    assert!(output.contains("\"nodes\""));
}

#[tokio::test]
async fn interrupt_cancels_running_step_and_loop_continues() {
    let mut session = session();
    let before = session.grid().cells().to_vec();
    let (tx, rx) = mpsc::unbounded_channel();
    let client = StepClient::new(InterruptedSolver(tx), StepOptions::default());
    let mut out = Vec::new();

    Repl::new(&mut session, &client)
        .with_interrupts(rx)
        .run(&b"step\nshow\nquit\n"[..], &mut out)
        .await
        .expect("repl run");

    let output = String::from_utf8(out).expect("utf8 output");
    assert!(output.contains("error: step cancelled (grid unchanged)\n"));
    assert!(output.contains("cells=7 "));
    assert!(!output.contains("interrupted"));
    assert_eq!(session.grid().cells(), before.as_slice());
}

#[tokio::test]
async fn interrupt_at_the_prompt_ends_the_loop() {
    let mut session = session();
    let client = StepClient::new(FixedReply("{}"), StepOptions::default());
    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(()).expect("send interrupt");
    // Input that never yields a line.
    let (_writer, reader) = tokio::io::duplex(64);
    let mut out = Vec::new();

    Repl::new(&mut session, &client)
        .with_interrupts(rx)
        .run(tokio::io::BufReader::new(reader), &mut out)
        .await
        .expect("repl run");

    let output = String::from_utf8(out).expect("utf8 output");
    assert!(output.ends_with("interrupted\n"));
}
