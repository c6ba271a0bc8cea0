use serde::{Deserialize, Serialize};

use crate::models::{Cell, GameParams, Pos};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellUpdate {
    pub pos: Pos,
    pub value: Cell,
}

/// Result of a single reveal action.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RevealOutcome {
    Continue,
    Win,
    Loss,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Idle,
    Active,
    Won,
    Lost,
}

/// Lifecycle notifications for the presentation layer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum GameEvent {
    #[serde(rename = "initialized")]
    GameInitialized { params: GameParams },
    #[serde(rename = "board_updated")]
    BoardUpdated { changed_positions: Vec<Pos> },
    #[serde(rename = "won")]
    GameWon { elapsed_seconds: f64 },
    #[serde(rename = "lost")]
    GameLost { exploded: Pos },
    #[serde(rename = "score_recorded")]
    ScoreRecorded { rank: Option<usize> },
}
