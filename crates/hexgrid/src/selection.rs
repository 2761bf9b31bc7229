//! Start/end selection and click handling.

use shared::domain::{CellId, CellState, StateScheme};

use crate::{error::GridError, grid::Grid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    #[default]
    None,
    SelectStart,
    SelectEnd,
}

/// What a click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    StartSet(CellId),
    EndSet(CellId),
    Cycled { id: CellId, state: CellState },
}

/// Start/end ids and the pending selection mode. Outlives any single grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionState {
    start_id: CellId,
    end_id: CellId,
    mode: SelectionMode,
}

impl SelectionState {
    pub fn new(start_id: CellId, end_id: CellId) -> Self {
        Self {
            start_id,
            end_id,
            mode: SelectionMode::None,
        }
    }

    pub fn start_id(&self) -> CellId {
        self.start_id
    }

    pub fn end_id(&self) -> CellId {
        self.end_id
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn begin_select_start(&mut self) {
        self.mode = SelectionMode::SelectStart;
    }

    pub fn begin_select_end(&mut self) {
        self.mode = SelectionMode::SelectEnd;
    }

    /// Consumes exactly one transition. An id outside `grid` is rejected and leaves
    /// both the grid and the mode untouched.
    pub fn click(
        &mut self,
        grid: &mut Grid,
        id: CellId,
        scheme: StateScheme,
    ) -> Result<ClickOutcome, GridError> {
        let cell = grid.try_get_mut(id)?;

        let outcome = match self.mode {
            SelectionMode::SelectStart => {
                self.start_id = id;
                cell.state = CellState::Open;
                ClickOutcome::StartSet(id)
            }
            SelectionMode::SelectEnd => {
                self.end_id = id;
                cell.state = CellState::Open;
                ClickOutcome::EndSet(id)
            }
            SelectionMode::None => {
                cell.state = cell.state.cycled(scheme);
                ClickOutcome::Cycled {
                    id,
                    state: cell.state,
                }
            }
        };

        self.mode = SelectionMode::None;
        Ok(outcome)
    }

    /// Clamps ids that fell outside a rebuilt grid to its last id. Returns whether
    /// anything changed.
    pub fn revalidate(&mut self, grid: &Grid) -> bool {
        let Some(last) = grid.last_id() else {
            return false;
        };

        let before = (self.start_id, self.end_id);
        self.start_id = self.start_id.min(last);
        self.end_id = self.end_id.min(last);
        before != (self.start_id, self.end_id)
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new(CellId(0), CellId(3))
    }
}

#[cfg(test)]
#[path = "tests/selection_tests.rs"]
mod tests;
