//! Axial adjacency.

use shared::domain::{Axial, CellId};

use crate::{cell::HexCell, grid::Grid};

/// The six axial offsets, in lookup order.
pub const DIRECTIONS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

/// Ids of the cells adjacent to `coord`. Directions that fall off the grid yield nothing.
pub fn neighbor_ids(coord: Axial, grid: &Grid) -> impl Iterator<Item = CellId> + '_ {
    DIRECTIONS
        .iter()
        .filter_map(move |&(dq, dr)| grid.id_at(coord.offset(dq, dr)))
}

pub fn neighbors_of<'g>(cell: &HexCell, grid: &'g Grid) -> Vec<&'g HexCell> {
    neighbor_ids(cell.axial(), grid)
        .filter_map(|id| grid.get(id))
        .collect()
}
