use std::{error::Error, fmt, io};

/// A board configuration that cannot produce a playable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidConfig {
        rows: usize,
        cols: usize,
        mines: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidConfig { rows, cols, mines } => write!(
                f,
                "invalid board {}x{} with {} mines: need at least one row, one column, one mine and one safe cell",
                rows, cols, mines
            ),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug)]
pub enum LedgerError {
    /// Names must be exactly three uppercase letters.
    InvalidName(String),
    InvalidTime(f64),
    Storage(io::Error),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::InvalidName(name) => {
                write!(f, "invalid name {:?}: must be exactly 3 uppercase letters", name)
            }
            LedgerError::InvalidTime(time) => write!(f, "invalid time {}", time),
            LedgerError::Storage(e) => write!(f, "failed to persist scores: {}", e),
        }
    }
}

impl Error for LedgerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LedgerError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for LedgerError {
    fn from(e: io::Error) -> Self {
        LedgerError::Storage(e)
    }
}

#[derive(Debug)]
pub enum GameError {
    Config(ConfigError),
    Ledger(LedgerError),
    /// `restart` was called before any game was started.
    NotStarted,
    /// A name was submitted but there is no won game waiting for one.
    NoPendingScore,
}

impl GameError {
    pub fn is_invalid_name(&self) -> bool {
        matches!(self, GameError::Ledger(LedgerError::InvalidName(_)))
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::Config(e) => e.fmt(f),
            GameError::Ledger(e) => e.fmt(f),
            GameError::NotStarted => write!(f, "no game has been started"),
            GameError::NoPendingScore => write!(f, "no winning time is waiting for a name"),
        }
    }
}

impl Error for GameError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GameError::Config(e) => Some(e),
            GameError::Ledger(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for GameError {
    fn from(e: ConfigError) -> Self {
        GameError::Config(e)
    }
}

impl From<LedgerError> for GameError {
    fn from(e: LedgerError) -> Self {
        GameError::Ledger(e)
    }
}
