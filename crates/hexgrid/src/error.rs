use shared::domain::CellId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("cell {0} is not part of the current grid")]
    UnknownCell(CellId),
}
