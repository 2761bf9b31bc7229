use std::collections::HashMap;

use shared::{
    domain::{Axial, CellId},
    protocol::NodeSnapshot,
};

use tracing::warn;

use crate::{cell::HexCell, error::GridError, neighbors};

/// Pixel radius of a single hexagon.
pub const DEFAULT_HEX_RADIUS: f64 = 40.0;

/// Largest cluster radius accepted anywhere: 196 993 cells.
pub const MAX_RADIUS: u32 = 256;

/// The hex cluster: cells in id order plus an axial lookup.
///
/// The cell set is fixed for the lifetime of a `Grid`; a new cluster is a new `Grid`.
#[derive(Debug, Clone)]
pub struct Grid {
    radius: u32,
    hex_radius: f64,
    cells: Vec<HexCell>,
    index: HashMap<Axial, CellId>,
}

impl Grid {
    pub fn generate_cluster(radius: u32) -> Self {
        Self::generate_cluster_with(radius, DEFAULT_HEX_RADIUS)
    }

    /// Builds every cell within `radius` of the origin. Radii above [`MAX_RADIUS`] are
    /// clamped to it.
    ///
    /// Ids follow q-major, r-minor iteration order starting at 0. Callers address cells by
    /// id, so this order must not change.
    pub fn generate_cluster_with(radius: u32, hex_radius: f64) -> Self {
        let radius = if radius > MAX_RADIUS {
            warn!(requested = radius, max = MAX_RADIUS, "cluster radius clamped");
            MAX_RADIUS
        } else {
            radius
        };
        let k = i32::try_from(radius).unwrap_or(i32::MAX);
        let mut cells = Vec::with_capacity(centered_hex_count(radius));

        for q in -k..=k {
            for r in -k..=k {
                let coord = Axial::new(q, r);
                if coord.s().abs() > k {
                    continue;
                }
                let id = CellId(cells.len());
                cells.push(HexCell::new(id, coord, hex_radius));
            }
        }

        let index = build_index(&cells);
        Self {
            radius,
            hex_radius,
            cells,
            index,
        }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn hex_radius(&self) -> f64 {
        self.hex_radius
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[HexCell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [HexCell] {
        &mut self.cells
    }

    pub fn contains(&self, id: CellId) -> bool {
        id.0 < self.cells.len()
    }

    pub fn last_id(&self) -> Option<CellId> {
        self.cells.last().map(HexCell::id)
    }

    pub fn get(&self, id: CellId) -> Option<&HexCell> {
        self.cells.get(id.0)
    }

    pub fn get_mut(&mut self, id: CellId) -> Option<&mut HexCell> {
        self.cells.get_mut(id.0)
    }

    pub fn try_get_mut(&mut self, id: CellId) -> Result<&mut HexCell, GridError> {
        self.get_mut(id).ok_or(GridError::UnknownCell(id))
    }

    pub fn id_at(&self, coord: Axial) -> Option<CellId> {
        self.index.get(&coord).copied()
    }

    pub fn neighbors_of(&self, id: CellId) -> Result<Vec<&HexCell>, GridError> {
        let cell = self.get(id).ok_or(GridError::UnknownCell(id))?;
        Ok(neighbors::neighbors_of(cell, self))
    }

    /// Stores each cell's neighbor ids so they appear in snapshots.
    pub fn cache_neighbors(&mut self) {
        let resolved: Vec<Vec<CellId>> = self
            .cells
            .iter()
            .map(|cell| neighbors::neighbor_ids(cell.axial(), self).collect())
            .collect();

        for (cell, ids) in self.cells.iter_mut().zip(resolved) {
            cell.set_cached_neighbors(ids);
        }
    }

    pub fn snapshot(&self) -> Vec<NodeSnapshot> {
        self.cells.iter().map(HexCell::snapshot).collect()
    }
}

/// `3k² + 3k + 1`, saturating at `usize::MAX`.
pub fn centered_hex_count(radius: u32) -> usize {
    let k = radius as usize;
    k.saturating_mul(k)
        .saturating_add(k)
        .saturating_mul(3)
        .saturating_add(1)
}

fn build_index(cells: &[HexCell]) -> HashMap<Axial, CellId> {
    cells.iter().map(|cell| (cell.axial(), cell.id())).collect()
}

#[cfg(test)]
#[path = "tests/grid_tests.rs"]
mod tests;
