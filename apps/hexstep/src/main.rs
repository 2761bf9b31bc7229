use std::{io::Write, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use step_client::{CancelToken, StepClient};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod repl;
mod session;

use config::{load_settings, parse_radius, Settings};
use repl::Repl;
use session::Session;

/// Step an external shortest-path solver over a hexagonal cluster.
#[derive(Parser, Debug)]
#[command(name = "hexstep", version)]
struct Cli {
    /// TOML settings file (defaults to ./hexstep.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_parser = parse_radius)]
    radius: Option<u32>,
    #[arg(long)]
    seed: Option<u64>,
    /// Solver executable
    #[arg(long)]
    solver: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print or write a randomized grid document
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
        /// Fill in each node's neighbor list
        #[arg(long)]
        neighbors: bool,
    },
    /// Run solver steps and print the resulting grid
    Step {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Interactive session on stdin
    Run,
}

impl Cli {
    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(radius) = self.radius {
            settings.radius = radius;
        }
        if let Some(seed) = self.seed {
            settings.seed = Some(seed);
        }
        if let Some(solver) = &self.solver {
            settings.solver_command = solver.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    cli.apply_overrides(&mut settings);
    info!(
        solver = %settings.solver_command,
        radius = settings.radius,
        seed = ?settings.seed,
        "settings loaded"
    );

    let mut session = Session::from_settings(&settings);
    let client = StepClient::for_command(settings.solver(), settings.step_options());
    let mut stdout = std::io::stdout().lock();

    match cli.command.unwrap_or(Command::Run) {
        Command::Export { out, neighbors } => {
            let document = session.export(neighbors).context("failed to encode grid")?;
            match out {
                Some(path) => {
                    std::fs::write(&path, document)
                        .with_context(|| format!("failed to write '{}'", path.display()))?;
                    info!(path = %path.display(), "grid exported");
                }
                None => writeln!(stdout, "{document}")?,
            }
        }
        Command::Step { steps } => {
            for index in 1..=steps {
                session
                    .step(&client, &mut CancelToken::never())
                    .await
                    .with_context(|| format!("step {index} of {steps} failed"))?;
            }
            write!(stdout, "{}", session.render_table())?;
        }
        Command::Run => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            Repl::new(&mut session, &client)
                .with_interrupts(repl::ctrl_c_interrupts())
                .run(stdin, &mut stdout)
                .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
