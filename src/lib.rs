//! Minesweeper engine
//!
//! Generates mine fields, applies reveal and flag actions, tracks the game
//! clock and keeps a persisted list of the ten best winning times.
//!
//! ```rust,no_run
//! use minesweeper_engine::{Config, Game, Pos, Preset, RevealOutcome};
//!
//! let mut game = Game::from_config(&Config::from_env());
//! game.start_preset(Preset::Beginner)?;
//!
//! if let Some(report) = game.reveal(Pos::new(4, 4)) {
//!     if report.outcome == RevealOutcome::Win {
//!         game.submit_name("ABC")?;
//!     }
//! }
//!
//! for line in game.ledger().ranked_lines() {
//!     println!("{}", line);
//! }
//! # Ok::<(), minesweeper_engine::GameError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod game;
pub mod ledger;
pub mod logic;

pub use config::Config;
pub use data::Field;
pub use error::{ConfigError, GameError, LedgerError};
pub use game::{Game, RevealReport, Stopwatch};
pub use ledger::{
    ScoreEntry, ScoreLedger, is_valid_name, normalize_name_input,
    storage::{FileStorage, MemoryStorage, Storage},
};

// Re-export common types for convenience
pub use minesweeper_common::{models::*, protocol::*};
