use std::collections::HashMap;

use shared::{
    domain::CellId,
    protocol::{NodeUpdate, StepResponse},
};
use tracing::debug;

use crate::grid::Grid;

/// Distance that maps to the far end of the visited-cell gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostScale {
    max_cost: f64,
}

impl CostScale {
    pub const INITIAL: f64 = 1.0;

    pub fn max_cost(&self) -> f64 {
        self.max_cost
    }

    /// Overwrites the reference unconditionally; it may shrink.
    pub fn record(&mut self, distance: f64) {
        self.max_cost = distance;
    }

    pub fn reset(&mut self) {
        self.max_cost = Self::INITIAL;
    }
}

impl Default for CostScale {
    fn default() -> Self {
        Self {
            max_cost: Self::INITIAL,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub updated: usize,
    /// Local cells the response had no entry for.
    pub missed: usize,
    /// Response entries naming ids outside the grid.
    pub foreign: usize,
}

/// Folds a validated step response into the grid.
///
/// Only `distance`, `cost` and `visited` are written, and only for cells the response
/// names. When the end cell's distance is updated it becomes the new `maxCost`.
pub fn merge(
    grid: &mut Grid,
    response: &StepResponse,
    end_id: CellId,
    scale: &mut CostScale,
) -> MergeReport {
    let updates: HashMap<CellId, &NodeUpdate> =
        response.nodes.iter().map(|node| (node.id, node)).collect();

    let mut report = MergeReport {
        foreign: updates.keys().filter(|id| !grid.contains(**id)).count(),
        ..MergeReport::default()
    };

    for cell in grid.cells_mut() {
        let Some(update) = updates.get(&cell.id()) else {
            report.missed += 1;
            continue;
        };

        if let Some(distance) = update.distance {
            cell.distance = distance;
            if cell.id() == end_id {
                scale.record(distance);
            }
        }
        if let Some(cost) = update.cost {
            cell.cost = cost;
        }
        if let Some(visited) = update.visited {
            cell.visited = visited;
        }
        report.updated += 1;
    }

    debug!(
        updated = report.updated,
        missed = report.missed,
        foreign = report.foreign,
        max_cost = scale.max_cost(),
        "merged step response"
    );
    report
}

#[cfg(test)]
#[path = "tests/merge_tests.rs"]
mod tests;
