use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub usize);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_newtype!(CellId);

/// Traversability of a cell.
///
/// `Undetermined` is what a freshly generated cell starts as. The legacy
/// `GRAY`/`WHITE`/`BLACK` names are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CellState {
    #[default]
    #[serde(alias = "GRAY")]
    Undetermined,
    #[serde(alias = "WHITE")]
    Open,
    #[serde(alias = "BLACK")]
    Closed,
}

impl CellState {
    /// Next state for a click, wrapping within `scheme`.
    pub fn cycled(self, scheme: StateScheme) -> Self {
        match (scheme, self) {
            (StateScheme::Binary, Self::Undetermined) => Self::Open,
            (StateScheme::Binary, Self::Open) => Self::Closed,
            (StateScheme::Binary, Self::Closed) => Self::Open,
            (StateScheme::Tristate, Self::Undetermined) => Self::Open,
            (StateScheme::Tristate, Self::Open) => Self::Closed,
            (StateScheme::Tristate, Self::Closed) => Self::Undetermined,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Undetermined => "UNDETERMINED",
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Which states a click cycles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateScheme {
    /// `OPEN <-> CLOSED`; an undetermined cell becomes `OPEN`.
    #[default]
    Binary,
    /// `UNDETERMINED -> OPEN -> CLOSED -> UNDETERMINED`.
    Tristate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Axial {
    pub q: i32,
    pub r: i32,
}

impl Axial {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    pub const fn offset(self, dq: i32, dr: i32) -> Self {
        Self::new(self.q + dq, self.r + dr)
    }
}
