//! How a request reaches the solver and its stdout comes back.

use std::{path::PathBuf, process::Stdio};

use async_trait::async_trait;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    process::{ChildStderr, Command},
};
use tracing::{debug, warn};

use crate::error::StepError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverOutput {
    pub stdout: Vec<u8>,
    /// Exit code, when the process exited normally.
    pub exit_code: Option<i32>,
}

#[async_trait]
pub trait SolverTransport: Send + Sync {
    /// Delivers one encoded request and returns everything the solver wrote once it
    /// has finished.
    async fn exchange(&self, request: Vec<u8>) -> Result<SolverOutput, StepError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl SolverCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn display_name(&self) -> String {
        self.program.display().to_string()
    }
}

/// Spawns a fresh solver process per step: request on stdin, response on stdout,
/// diagnostics on stderr forwarded to the log.
///
/// The child is killed if the exchange is dropped before it finishes.
#[derive(Debug, Clone)]
pub struct ProcessTransport {
    command: SolverCommand,
}

impl ProcessTransport {
    pub fn new(command: SolverCommand) -> Self {
        Self { command }
    }
}

#[async_trait]
impl SolverTransport for ProcessTransport {
    async fn exchange(&self, request: Vec<u8>) -> Result<SolverOutput, StepError> {
        let program = self.command.display_name();
        let mut command = Command::new(&self.command.program);
        command
            .args(&self.command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|source| StepError::ProcessUnavailable {
                program: program.clone(),
                source,
            })?;
        debug!(solver = %program, pid = ?child.id(), "spawned solver");

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_stderr(program.clone(), stderr));
        }

        let stdin = child.stdin.take();
        let write = async move {
            let Some(mut stdin) = stdin else {
                return Ok(());
            };
            stdin.write_all(&request).await?;
            stdin.shutdown().await
        };

        let (written, output) = tokio::join!(write, child.wait_with_output());
        if let Err(error) = written {
            // A solver may exit without draining stdin; its stdout still decides.
            warn!(solver = %program, %error, "solver did not accept the full request");
        }
        let output = output.map_err(|source| StepError::ProcessIo {
            program: program.clone(),
            source,
        })?;

        if !output.status.success() {
            warn!(solver = %program, status = %output.status, "solver exited unsuccessfully");
        }

        Ok(SolverOutput {
            stdout: output.stdout,
            exit_code: output.status.code(),
        })
    }
}

async fn forward_stderr(program: String, stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        warn!(solver = %program, "{line}");
    }
}
