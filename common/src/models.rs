use std::fmt;

use serde::{Deserialize, Serialize};

/// What the player may see of a single cell.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "state")]
pub enum Cell {
    #[serde(rename = "hidden")]
    Hidden,
    #[serde(rename = "flagged")]
    Flagged,
    #[serde(rename = "revealed")]
    Revealed { adjacent: u8 },
    #[serde(rename = "mine")]
    Mine,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Dimensions of a grid, in cells.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardSize {
    pub rows: usize,
    pub cols: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct GameParams {
    pub rows: usize,
    pub cols: usize,
    pub mines: usize,
}

impl GameParams {
    pub fn size(&self) -> BoardSize {
        BoardSize {
            rows: self.rows,
            cols: self.cols,
        }
    }
}

impl Default for GameParams {
    fn default() -> Self {
        Preset::Beginner.params()
    }
}

/// The three fixed difficulty levels.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    Beginner,
    Intermediate,
    Expert,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Beginner, Preset::Intermediate, Preset::Expert];

    pub fn params(self) -> GameParams {
        match self {
            Preset::Beginner => GameParams {
                rows: 9,
                cols: 9,
                mines: 10,
            },
            Preset::Intermediate => GameParams {
                rows: 16,
                cols: 16,
                mines: 40,
            },
            Preset::Expert => GameParams {
                rows: 16,
                cols: 30,
                mines: 99,
            },
        }
    }

    /// Parses the lowercase preset name, e.g. from an environment variable.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(Preset::Beginner),
            "intermediate" => Some(Preset::Intermediate),
            "expert" => Some(Preset::Expert),
            _ => None,
        }
    }
}
