//! Wire records exchanged with the solver process and written by export.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    domain::{CellId, CellState},
    error::ProtocolError,
};

/// One cell as the solver (and the export document) sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: CellId,
    pub state: CellState,
    pub q: i32,
    pub r: i32,
    pub s: i32,
    pub x: f64,
    pub y: f64,
    pub cost: f64,
    pub distance: f64,
    #[serde(default)]
    pub neighbors: Vec<CellId>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GridData {
    pub nodes: Vec<NodeSnapshot>,
}

/// How the request document is laid out on the solver's stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestLayout {
    /// `{ "nodes": [...], "startId": .., "endId": .. }`
    #[default]
    Flat,
    /// `{ "gridData": { "nodes": [...] }, "startId": .., "endId": .. }`
    GridData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StepRequest {
    Flat {
        nodes: Vec<NodeSnapshot>,
        #[serde(rename = "startId")]
        start_id: CellId,
        #[serde(rename = "endId")]
        end_id: CellId,
    },
    GridData {
        #[serde(rename = "gridData")]
        grid_data: GridData,
        #[serde(rename = "startId")]
        start_id: CellId,
        #[serde(rename = "endId")]
        end_id: CellId,
    },
}

impl StepRequest {
    pub fn new(
        layout: RequestLayout,
        nodes: Vec<NodeSnapshot>,
        start_id: CellId,
        end_id: CellId,
    ) -> Self {
        match layout {
            RequestLayout::Flat => Self::Flat {
                nodes,
                start_id,
                end_id,
            },
            RequestLayout::GridData => Self::GridData {
                grid_data: GridData { nodes },
                start_id,
                end_id,
            },
        }
    }

    pub fn nodes(&self) -> &[NodeSnapshot] {
        match self {
            Self::Flat { nodes, .. } => nodes,
            Self::GridData { grid_data, .. } => &grid_data.nodes,
        }
    }

    /// Single-line JSON terminated by a newline, as written to the solver's stdin.
    pub fn to_line(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}

/// Per-cell annotations returned by the solver. Absent fields leave the cell's field as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeUpdate {
    pub id: CellId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visited: Option<bool>,
}

impl NodeUpdate {
    pub fn new(id: CellId, distance: f64, cost: f64, visited: bool) -> Self {
        Self {
            id,
            distance: Some(distance),
            cost: Some(cost),
            visited: Some(visited),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StepResponse {
    pub nodes: Vec<NodeUpdate>,
}

#[derive(Deserialize)]
struct RawNodes {
    nodes: Option<Vec<NodeUpdate>>,
}

#[derive(Deserialize)]
struct RawResponse {
    #[serde(default)]
    nodes: Option<Vec<NodeUpdate>>,
    #[serde(default, rename = "gridData")]
    grid_data: Option<RawNodes>,
}

impl StepResponse {
    /// Parses and validates raw solver stdout.
    pub fn parse(raw: &[u8]) -> Result<Self, ProtocolError> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Err(ProtocolError::Empty);
        }

        let raw: RawResponse = serde_json::from_slice(raw)?;
        let nodes = raw
            .nodes
            .or_else(|| raw.grid_data.and_then(|grid| grid.nodes))
            .ok_or(ProtocolError::MissingNodes)?;

        let response = Self { nodes };
        response.validate()?;
        Ok(response)
    }

    pub fn validate(&self) -> Result<(), ProtocolError> {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !seen.insert(node.id) {
                return Err(ProtocolError::DuplicateId(node.id));
            }
            for (field, value) in [("distance", node.distance), ("cost", node.cost)] {
                if let Some(value) = value {
                    if !value.is_finite() || value < 0.0 {
                        return Err(ProtocolError::invalid_value(node.id, field, value));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn find(&self, id: CellId) -> Option<&NodeUpdate> {
        self.nodes.iter().find(|node| node.id == id)
    }
}
