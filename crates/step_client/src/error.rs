use std::time::Duration;

use shared::{domain::CellId, error::ProtocolError};
use thiserror::Error;

/// Why a step produced nothing to merge. The grid is never touched when one of these
/// is returned.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("solver `{program}` could not be started: {source}")]
    ProcessUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("solver `{program}` failed while running: {source}")]
    ProcessIo {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("solver response rejected: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("step request could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("solver did not answer within {0:?}")]
    TimedOut(Duration),
    #[error("step cancelled")]
    Cancelled,
    #[error("start {start} or end {end} is not a cell of the grid")]
    InvalidSelection { start: CellId, end: CellId },
}

impl StepError {
    /// Failures the user can reasonably retry without changing anything.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProcessIo { .. } | Self::TimedOut(_) | Self::Cancelled | Self::Protocol(_)
        )
    }
}
