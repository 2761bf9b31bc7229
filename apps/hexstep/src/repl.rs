//! Line-oriented stand-in for the UI: one command per line.

use std::{
    io::Write,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context;
use hexgrid::ClickOutcome;
use shared::domain::CellId;
use step_client::{cancel_pair, SolverTransport, StepClient};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::mpsc,
};

use crate::{config::parse_radius, session::Session};

pub const HELP: &str = "\
commands:
  start            next click picks the start cell
  end              next click picks the end cell
  click <id>       click a cell
  randomize        redraw open/closed states
  new <radius>     build a new cluster
  step             run one solver step
  show             print the grid
  export [path]    print or write the grid document
  help             this text
  quit             leave
Ctrl-C cancels a running step; at the prompt it leaves.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    SelectStart,
    SelectEnd,
    Click(CellId),
    Randomize,
    NewCluster(u32),
    Step,
    Show,
    Export(Option<PathBuf>),
    Help,
    Quit,
}

impl FromStr for ReplCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err("empty command".to_string());
        };
        let arg = words.next();
        if words.next().is_some() {
            return Err(format!("too many arguments for '{head}'"));
        }

        let command = match (head.to_ascii_lowercase().as_str(), arg) {
            ("start", None) => Self::SelectStart,
            ("end", None) => Self::SelectEnd,
            ("click", Some(id)) => Self::Click(CellId(
                id.parse()
                    .map_err(|_| format!("'{id}' is not a cell id"))?,
            )),
            ("randomize", None) => Self::Randomize,
            ("new", Some(radius)) => Self::NewCluster(parse_radius(radius)?),
            ("step", None) => Self::Step,
            ("show", None) => Self::Show,
            ("export", path) => Self::Export(path.map(PathBuf::from)),
            ("help", None) => Self::Help,
            ("quit" | "exit", None) => Self::Quit,
            _ => return Err(format!("unknown command '{}' (try 'help')", line.trim())),
        };
        Ok(command)
    }
}

/// Interrupt requests, one `()` per Ctrl-C.
pub type Interrupts = mpsc::UnboundedReceiver<()>;

/// Installs the process-wide Ctrl-C listener. Call once; the listener lives until the
/// returned receiver is dropped and the next Ctrl-C arrives.
pub fn ctrl_c_interrupts() -> Interrupts {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}

/// Resolves on the next interrupt. Pending forever without a source.
async fn next_interrupt(interrupts: &mut Option<Interrupts>) {
    if let Some(rx) = interrupts {
        if rx.recv().await.is_some() {
            return;
        }
    }
    std::future::pending::<()>().await
}

pub struct Repl<'a, T> {
    session: &'a mut Session,
    client: &'a StepClient<T>,
    interrupts: Option<Interrupts>,
}

impl<'a, T> Repl<'a, T>
where
    T: SolverTransport,
{
    pub fn new(session: &'a mut Session, client: &'a StepClient<T>) -> Self {
        Self {
            session,
            client,
            interrupts: None,
        }
    }

    /// An interrupt cancels the running step, or ends the loop when idle.
    pub fn with_interrupts(mut self, interrupts: Interrupts) -> Self {
        self.interrupts = Some(interrupts);
        self
    }

    /// Runs until `quit`, end of input or an interrupt at the prompt. Command failures
    /// are reported to `out` and the loop carries on.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        writeln!(out, "{HELP}")?;

        loop {
            let line = tokio::select! {
                line = lines.next_line() => line.context("failed to read command")?,
                () = next_interrupt(&mut self.interrupts) => {
                    writeln!(out, "interrupted")?;
                    break;
                }
            };
            let Some(line) = line else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            let command = match line.parse::<ReplCommand>() {
                Ok(command) => command,
                Err(message) => {
                    writeln!(out, "error: {message}")?;
                    continue;
                }
            };
            if command == ReplCommand::Quit {
                break;
            }
            self.execute(command, out).await?;
        }
        Ok(())
    }

    /// Applies one command. Only output failures are returned as errors.
    pub async fn execute<W>(&mut self, command: ReplCommand, out: &mut W) -> anyhow::Result<()>
    where
        W: Write,
    {
        match command {
            ReplCommand::SelectStart => {
                self.session.begin_select_start();
                writeln!(out, "click a cell to make it the start")?;
            }
            ReplCommand::SelectEnd => {
                self.session.begin_select_end();
                writeln!(out, "click a cell to make it the end")?;
            }
            ReplCommand::Click(id) => match self.session.click(id) {
                Ok(ClickOutcome::StartSet(id)) => writeln!(out, "start = {id}")?,
                Ok(ClickOutcome::EndSet(id)) => writeln!(out, "end = {id}")?,
                Ok(ClickOutcome::Cycled { id, state }) => {
                    let fill = self.session.color_of(id).map(|c| c.to_string());
                    writeln!(out, "cell {id} -> {state} {}", fill.unwrap_or_default())?
                }
                Err(error) => writeln!(out, "error: {error}")?,
            },
            ReplCommand::Randomize => {
                self.session.randomize();
                writeln!(out, "randomized {} cells", self.session.grid().len())?;
            }
            ReplCommand::NewCluster(radius) => {
                self.session.new_cluster(radius);
                let selection = self.session.selection();
                writeln!(
                    out,
                    "new cluster: {} cells, start = {}, end = {}",
                    self.session.grid().len(),
                    selection.start_id(),
                    selection.end_id()
                )?;
            }
            ReplCommand::Step => self.step(out).await?,
            ReplCommand::Show => write!(out, "{}", self.session.render_table())?,
            ReplCommand::Export(path) => self.export(path.as_deref(), out)?,
            ReplCommand::Help => writeln!(out, "{HELP}")?,
            ReplCommand::Quit => {}
        }
        Ok(())
    }

    async fn step<W: Write>(&mut self, out: &mut W) -> anyhow::Result<()> {
        let Self {
            session,
            client,
            interrupts,
        } = self;
        let (handle, mut token) = cancel_pair();

        let result = {
            let step = session.step(*client, &mut token);
            tokio::pin!(step);
            loop {
                tokio::select! {
                    result = &mut step => break result,
                    () = next_interrupt(interrupts) => handle.cancel(),
                }
            }
        };

        match result {
            Ok(report) => writeln!(
                out,
                "step merged: {} updated, {} unchanged, max cost {}",
                report.updated,
                report.missed,
                self.session.scale().max_cost()
            )?,
            Err(error) => writeln!(out, "error: {error} (grid unchanged)")?,
        }
        Ok(())
    }

    fn export<W: Write>(&mut self, path: Option<&Path>, out: &mut W) -> anyhow::Result<()> {
        let document = self.session.export(true).context("failed to encode grid")?;
        match path {
            Some(path) => match std::fs::write(path, document) {
                Ok(()) => writeln!(out, "exported to {}", path.display())?,
                Err(error) => writeln!(out, "error: failed to write {}: {error}", path.display())?,
            },
            None => writeln!(out, "{document}")?,
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/repl_tests.rs"]
mod tests;
