use shared::{
    domain::{Axial, CellId, CellState},
    protocol::NodeSnapshot,
};

/// A single hexagon of the cluster.
///
/// Identity, coordinates and the pixel projection are fixed at generation. Only the
/// public annotation fields change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct HexCell {
    id: CellId,
    coord: Axial,
    x: f64,
    y: f64,
    pub state: CellState,
    pub cost: f64,
    pub distance: f64,
    pub visited: bool,
    neighbors: Option<Vec<CellId>>,
}

impl HexCell {
    pub(crate) fn new(id: CellId, coord: Axial, hex_radius: f64) -> Self {
        let (x, y) = axial_to_pixel(coord, hex_radius);
        Self {
            id,
            coord,
            x,
            y,
            state: CellState::default(),
            cost: 0.0,
            distance: 0.0,
            visited: false,
            neighbors: None,
        }
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn axial(&self) -> Axial {
        self.coord
    }

    pub fn q(&self) -> i32 {
        self.coord.q
    }

    pub fn r(&self) -> i32 {
        self.coord.r
    }

    pub fn s(&self) -> i32 {
        self.coord.s()
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn cached_neighbors(&self) -> Option<&[CellId]> {
        self.neighbors.as_deref()
    }

    pub(crate) fn set_cached_neighbors(&mut self, neighbors: Vec<CellId>) {
        self.neighbors = Some(neighbors);
    }

    pub fn reset_annotations(&mut self) {
        self.cost = 0.0;
        self.distance = 0.0;
        self.visited = false;
    }

    /// Wire form of the cell. Neighbors are only listed once they have been cached.
    pub fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot {
            id: self.id,
            state: self.state,
            q: self.q(),
            r: self.r(),
            s: self.s(),
            x: self.x,
            y: self.y,
            cost: self.cost,
            distance: self.distance,
            neighbors: self.neighbors.clone().unwrap_or_default(),
        }
    }
}

/// Flat-topped projection.
pub fn axial_to_pixel(coord: Axial, hex_radius: f64) -> (f64, f64) {
    let q = f64::from(coord.q);
    let r = f64::from(coord.r);
    let x = 1.5 * hex_radius * q;
    let y = 3f64.sqrt() * hex_radius * (r + q / 2.0);
    (x, y)
}
