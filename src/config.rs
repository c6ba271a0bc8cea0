use std::{env, path::PathBuf};

use minesweeper_common::models::Preset;
use serde::Deserialize;
use tracing::{info, warn};

use crate::ledger::{DEFAULT_KEY, storage::FileStorage};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub scores_key: String,
    pub default_preset: Preset,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            scores_key: DEFAULT_KEY.to_string(),
            default_preset: Preset::Beginner,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let data_dir: PathBuf = env::var("MINESWEEPER_DATA_DIR")
            .unwrap_or_else(|_| ".".to_string())
            .into();

        let scores_key =
            env::var("MINESWEEPER_SCORES_KEY").unwrap_or_else(|_| DEFAULT_KEY.to_string());

        let preset_name =
            env::var("MINESWEEPER_DEFAULT_PRESET").unwrap_or_else(|_| "beginner".to_string());
        let default_preset = Preset::from_name(&preset_name).unwrap_or_else(|| {
            warn!("Unknown preset {:?}, falling back to beginner", preset_name);
            Preset::Beginner
        });

        info!(
            "Loaded config: data dir {}, scores key {}, default preset {:?}",
            data_dir.display(),
            scores_key,
            default_preset
        );

        Self {
            data_dir,
            scores_key,
            default_preset,
        }
    }

    pub fn file_storage(&self) -> FileStorage {
        FileStorage::new(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_storage_key() {
        let config = Config::default();
        assert_eq!(config.scores_key, "minesweeperHighScores");
        assert_eq!(config.default_preset, Preset::Beginner);
    }

    #[test]
    fn game_params_fill_missing_fields_from_beginner() {
        use minesweeper_common::models::GameParams;

        assert_eq!(GameParams::default(), Preset::Beginner.params());
        let params: GameParams = serde_json::from_str(r#"{"rows":5}"#).expect("valid params");
        assert_eq!(params, GameParams { rows: 5, cols: 9, mines: 10 });
    }

    #[test]
    fn deserializes_partial_json_with_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"default_preset":"expert"}"#).expect("valid config");
        assert_eq!(config.default_preset, Preset::Expert);
        assert_eq!(config.data_dir, PathBuf::from("."));
        assert_eq!(config.scores_key, DEFAULT_KEY);
    }
}
