use rand::Rng;
use shared::domain::{CellId, CellState};
use tracing::debug;

use crate::{grid::Grid, neighbors};

/// Chance that a cell comes out `OPEN`, given its neighbors' states before the pass.
pub fn open_probability(open_count: usize, closed_count: usize) -> f64 {
    if open_count == 0 && closed_count == 0 {
        0.5
    } else if open_count < 3 {
        0.6
    } else {
        0.3
    }
}

/// Draws a fresh open/closed state for every cell and clears all step annotations.
///
/// Neighbor counts are taken from the states as they were before this call, so the
/// order cells are visited in does not bias the result. `start` and `end` are forced
/// `OPEN` after the draw.
pub fn randomize<R>(grid: &mut Grid, start: CellId, end: CellId, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let prior: Vec<CellState> = grid.cells().iter().map(|cell| cell.state).collect();
    let probabilities: Vec<f64> = grid
        .cells()
        .iter()
        .map(|cell| {
            let (open, closed) = neighbors::neighbor_ids(cell.axial(), grid).fold(
                (0, 0),
                |(open, closed), id| match prior[id.0] {
                    CellState::Open => (open + 1, closed),
                    CellState::Closed => (open, closed + 1),
                    CellState::Undetermined => (open, closed),
                },
            );
            open_probability(open, closed)
        })
        .collect();

    let mut open_total = 0usize;
    for (cell, p) in grid.cells_mut().iter_mut().zip(probabilities) {
        let u: f64 = rng.random();
        cell.state = if u < p {
            CellState::Open
        } else {
            CellState::Closed
        };
        if cell.id() == start || cell.id() == end {
            cell.state = CellState::Open;
        }
        if cell.state == CellState::Open {
            open_total += 1;
        }
        cell.reset_annotations();
    }

    debug!(
        cells = grid.len(),
        open = open_total,
        start = start.0,
        end = end.0,
        "randomized grid"
    );
}

#[cfg(test)]
#[path = "tests/randomize_tests.rs"]
mod tests;
