//! The single owner of grid, selection and cost scale.

use std::fmt::Write as _;

use hexgrid::{
    export_document, merge, randomize, CellRole, ClickOutcome, CostScale, Grid, GridError,
    MergeReport, Palette, Rgb, SelectionState,
};
use rand::{rngs::StdRng, SeedableRng};
use shared::domain::{CellId, StateScheme};
use step_client::{CancelToken, SolverTransport, StepClient, StepError};
use tracing::{info, warn};

use crate::config::Settings;

pub struct Session {
    grid: Grid,
    selection: SelectionState,
    scale: CostScale,
    scheme: StateScheme,
    hex_radius: f64,
    palette: Palette,
    rng: StdRng,
}

impl Session {
    pub fn from_settings(settings: &Settings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(
            settings.radius,
            settings.hex_radius,
            SelectionState::new(CellId(settings.start_id), CellId(settings.end_id)),
            settings.state_scheme,
            rng,
        )
    }

    /// Builds and randomizes the first cluster.
    pub fn new(
        radius: u32,
        hex_radius: f64,
        selection: SelectionState,
        scheme: StateScheme,
        rng: StdRng,
    ) -> Self {
        let mut session = Self {
            grid: Grid::generate_cluster_with(radius, hex_radius),
            selection,
            scale: CostScale::default(),
            scheme,
            hex_radius,
            palette: Palette::default(),
            rng,
        };
        session.selection.revalidate(&session.grid);
        session.randomize();
        session
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn scale(&self) -> &CostScale {
        &self.scale
    }

    /// Replaces the grid wholesale and re-validates the selection against it.
    pub fn new_cluster(&mut self, radius: u32) {
        self.grid = Grid::generate_cluster_with(radius, self.hex_radius);
        if self.selection.revalidate(&self.grid) {
            warn!(
                start = self.selection.start_id().0,
                end = self.selection.end_id().0,
                "selection clamped to the new cluster"
            );
        }
        self.randomize();
        info!(radius, cells = self.grid.len(), "new cluster");
    }

    /// Fresh states for every cell. Previous step results are discarded.
    pub fn randomize(&mut self) {
        randomize(
            &mut self.grid,
            self.selection.start_id(),
            self.selection.end_id(),
            &mut self.rng,
        );
        self.scale.reset();
    }

    pub fn begin_select_start(&mut self) {
        self.selection.begin_select_start();
    }

    pub fn begin_select_end(&mut self) {
        self.selection.begin_select_end();
    }

    pub fn click(&mut self, id: CellId) -> Result<ClickOutcome, GridError> {
        self.selection.click(&mut self.grid, id, self.scheme)
    }

    /// One solver round trip. The grid is only written after a valid response has
    /// arrived; every error leaves it exactly as it was.
    ///
    /// Takes `&mut self` for the whole round trip, so nothing else touches the grid
    /// while the solver runs.
    pub async fn step<T>(
        &mut self,
        client: &StepClient<T>,
        cancel: &mut CancelToken,
    ) -> Result<MergeReport, StepError>
    where
        T: SolverTransport,
    {
        let start = self.selection.start_id();
        let end = self.selection.end_id();

        let response = match client.step(&self.grid, start, end, cancel).await {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, retryable = error.is_retryable(), "step failed; grid unchanged");
                return Err(error);
            }
        };

        let report = merge(&mut self.grid, &response, end, &mut self.scale);
        info!(
            updated = report.updated,
            missed = report.missed,
            max_cost = self.scale.max_cost(),
            "step merged"
        );
        Ok(report)
    }

    pub fn export(&mut self, include_neighbors: bool) -> serde_json::Result<String> {
        export_document(&mut self.grid, include_neighbors)
    }

    pub fn role_of(&self, id: CellId) -> Option<CellRole> {
        let cell = self.grid.get(id)?;
        Some(CellRole::of(cell, &self.selection, &self.scale))
    }

    pub fn color_of(&self, id: CellId) -> Option<Rgb> {
        self.role_of(id).map(|role| self.palette.fill(role))
    }

    /// Plain-text table of every cell with its role and fill.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "cells={} scheme={:?} start={} end={} mode={:?} max_cost={}",
            self.grid.len(),
            self.scheme,
            self.selection.start_id(),
            self.selection.end_id(),
            self.selection.mode(),
            self.scale.max_cost()
        );
        for cell in self.grid.cells() {
            let role = CellRole::of(cell, &self.selection, &self.scale);
            let _ = writeln!(
                out,
                "{:>4} ({:>3},{:>3},{:>3}) {:<12} d={:<6} c={:<6} {} {} {}",
                cell.id(),
                cell.q(),
                cell.r(),
                cell.s(),
                cell.state,
                cell.distance,
                cell.cost,
                if cell.visited { "visited" } else { "-      " },
                role.glyph(),
                self.palette.fill(role)
            );
        }
        out
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
