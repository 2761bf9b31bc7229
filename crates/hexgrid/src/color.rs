//! Cell fill semantics.

use std::fmt;

use shared::domain::CellState;

use crate::{cell::HexCell, merge::CostScale, selection::SelectionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Linear blend; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| {
            let (a, b) = (f64::from(a), f64::from(b));
            (a + (b - a) * t).round() as u8
        };
        Rgb(
            mix(self.0, other.0),
            mix(self.1, other.1),
            mix(self.2, other.2),
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Why a cell gets the fill it does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellRole {
    Start,
    End,
    Blocked,
    Undetermined,
    /// Finalized by the solver; carries `distance / maxCost` clamped to `[0, 1]`.
    Visited(f64),
    Weighted,
    Open,
}

impl CellRole {
    pub fn of(cell: &HexCell, selection: &SelectionState, scale: &CostScale) -> Self {
        if cell.id() == selection.start_id() {
            return Self::Start;
        }
        if cell.id() == selection.end_id() {
            return Self::End;
        }
        match cell.state {
            CellState::Closed => Self::Blocked,
            CellState::Undetermined => Self::Undetermined,
            CellState::Open if cell.visited && cell.distance > 0.0 => {
                Self::Visited(gradient_ratio(cell.distance, scale.max_cost()))
            }
            CellState::Open if cell.cost > 0.0 => Self::Weighted,
            CellState::Open => Self::Open,
        }
    }

    /// One-character tag for text views.
    pub fn glyph(self) -> char {
        match self {
            Self::Start => 'S',
            Self::End => 'E',
            Self::Blocked => '#',
            Self::Undetermined => '?',
            Self::Visited(_) => '*',
            Self::Weighted => '+',
            Self::Open => '.',
        }
    }
}

/// `distance / max_cost` in `[0, 1]`. A non-positive `max_cost` maps to the far end.
pub fn gradient_ratio(distance: f64, max_cost: f64) -> f64 {
    if max_cost <= 0.0 {
        return 1.0;
    }
    (distance / max_cost).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub start: Rgb,
    pub end: Rgb,
    pub blocked: Rgb,
    pub undetermined: Rgb,
    pub open: Rgb,
    pub weighted: Rgb,
    pub near: Rgb,
    pub far: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            start: Rgb(0x2e, 0xcc, 0x71),
            end: Rgb(0xe7, 0x4c, 0x3c),
            blocked: Rgb(0x00, 0x00, 0x00),
            undetermined: Rgb(0x80, 0x80, 0x80),
            open: Rgb(0xff, 0xff, 0xff),
            weighted: Rgb(0xf1, 0xc4, 0x0f),
            near: Rgb(0xae, 0xd6, 0xf1),
            far: Rgb(0x1b, 0x4f, 0x72),
        }
    }
}

impl Palette {
    pub fn fill(&self, role: CellRole) -> Rgb {
        match role {
            CellRole::Start => self.start,
            CellRole::End => self.end,
            CellRole::Blocked => self.blocked,
            CellRole::Undetermined => self.undetermined,
            CellRole::Visited(t) => self.near.lerp(self.far, t),
            CellRole::Weighted => self.weighted,
            CellRole::Open => self.open,
        }
    }

    pub fn color_of(&self, cell: &HexCell, selection: &SelectionState, scale: &CostScale) -> Rgb {
        self.fill(CellRole::of(cell, selection, scale))
    }
}

#[cfg(test)]
#[path = "tests/color_tests.rs"]
mod tests;
