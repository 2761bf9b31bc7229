//! One request/response round trip with the external solver process.

use std::time::{Duration, Instant};

use hexgrid::Grid;
use shared::{
    domain::CellId,
    protocol::{RequestLayout, StepRequest, StepResponse},
};
use tracing::{info, warn};

mod cancel;
pub mod error;
pub mod transport;

pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use error::StepError;
pub use transport::{ProcessTransport, SolverCommand, SolverOutput, SolverTransport};

pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOptions {
    pub timeout: Duration,
    pub layout: RequestLayout,
}

impl Default for StepOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_STEP_TIMEOUT,
            layout: RequestLayout::Flat,
        }
    }
}

pub struct StepClient<T = ProcessTransport> {
    transport: T,
    options: StepOptions,
}

impl StepClient<ProcessTransport> {
    pub fn for_command(command: SolverCommand, options: StepOptions) -> Self {
        Self::new(ProcessTransport::new(command), options)
    }
}

impl<T> StepClient<T>
where
    T: SolverTransport,
{
    pub fn new(transport: T, options: StepOptions) -> Self {
        Self { transport, options }
    }

    /// Snapshot of every cell plus the endpoints, in the configured layout.
    pub fn build_request(
        &self,
        grid: &Grid,
        start: CellId,
        end: CellId,
    ) -> Result<StepRequest, StepError> {
        if !grid.contains(start) || !grid.contains(end) {
            return Err(StepError::InvalidSelection { start, end });
        }
        Ok(StepRequest::new(
            self.options.layout,
            grid.snapshot(),
            start,
            end,
        ))
    }

    /// Sends the grid to the solver and returns its validated response.
    ///
    /// Only reads `grid`; merging the result is the caller's move. Fails with
    /// [`StepError::TimedOut`] or [`StepError::Cancelled`] if the solver does not
    /// finish in time or `cancel` fires first, in which case the solver is killed.
    pub async fn step(
        &self,
        grid: &Grid,
        start: CellId,
        end: CellId,
        cancel: &mut CancelToken,
    ) -> Result<StepResponse, StepError> {
        let request = self.build_request(grid, start, end)?;
        let line = request.to_line().map_err(StepError::Encode)?;

        info!(
            cells = request.nodes().len(),
            start = start.0,
            end = end.0,
            bytes = line.len(),
            "dispatching solver step"
        );
        let started = Instant::now();

        let exchange = tokio::time::timeout(self.options.timeout, self.transport.exchange(line));
        let output = tokio::select! {
            result = exchange => match result {
                Ok(output) => output?,
                Err(_) => {
                    warn!(timeout = ?self.options.timeout, "solver step timed out");
                    return Err(StepError::TimedOut(self.options.timeout));
                }
            },
            () = cancel.cancelled() => {
                warn!("solver step cancelled");
                return Err(StepError::Cancelled);
            }
        };

        let response = StepResponse::parse(&output.stdout).map_err(|error| {
            warn!(%error, exit_code = ?output.exit_code, "rejecting solver response");
            StepError::from(error)
        })?;

        info!(
            nodes = response.nodes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "solver step completed"
        );
        Ok(response)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
