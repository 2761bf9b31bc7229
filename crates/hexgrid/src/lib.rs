//! Hex cluster model and the grid-side logic of a solver step: generation, adjacency,
//! randomization, response merging, selection and fill semantics.

mod cell;
pub mod color;
pub mod error;
mod export;
mod grid;
pub mod merge;
pub mod neighbors;
pub mod randomize;
pub mod selection;

pub use cell::{axial_to_pixel, HexCell};
pub use color::{CellRole, Palette, Rgb};
pub use error::GridError;
pub use export::export_document;
pub use grid::{centered_hex_count, Grid, DEFAULT_HEX_RADIUS, MAX_RADIUS};
pub use merge::{merge, CostScale, MergeReport};
pub use randomize::randomize;
pub use selection::{ClickOutcome, SelectionMode, SelectionState};
