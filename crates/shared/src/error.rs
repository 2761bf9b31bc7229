use thiserror::Error;

use crate::domain::CellId;

/// A solver response that does not satisfy the step response schema.
///
/// A response carrying any of these is rejected whole; nothing from it is merged.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("solver output is not valid JSON for a step response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("solver output is empty")]
    Empty,
    #[error("solver response has no `nodes` list")]
    MissingNodes,
    #[error("solver response lists node {0} more than once")]
    DuplicateId(CellId),
    #[error("solver response node {id} has invalid {field}: {value}")]
    InvalidValue {
        id: CellId,
        field: &'static str,
        value: f64,
    },
}

impl ProtocolError {
    pub fn invalid_value(id: CellId, field: &'static str, value: f64) -> Self {
        Self::InvalidValue { id, field, value }
    }
}
