use shared::protocol::GridData;

use crate::grid::Grid;

/// Pretty-printed `{ "nodes": [...] }` document for handing to a persistence layer.
///
/// With `include_neighbors` the neighbor cache is filled first so every node lists its
/// exact axial neighbors; otherwise nodes carry whatever was already cached.
pub fn export_document(grid: &mut Grid, include_neighbors: bool) -> serde_json::Result<String> {
    if include_neighbors {
        grid.cache_neighbors();
    }
    let document = GridData {
        nodes: grid.snapshot(),
    };
    serde_json::to_string_pretty(&document)
}
