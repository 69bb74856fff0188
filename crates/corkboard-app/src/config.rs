//! Application configuration.

use crate::AppError;
use corkboard_core::{BoardConfig, SerializableColor};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for one snapshot run. Every field has a default, so a partial
/// JSON file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the saved board. `None` uses the platform data
    /// directory.
    pub storage_dir: Option<PathBuf>,
    /// Where the PNG snapshot is written.
    pub output: PathBuf,
    pub background_color: SerializableColor,
    /// Render only the viewport instead of the whole board.
    pub visible_only: bool,
    pub board: BoardConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            output: PathBuf::from("corkboard.png"),
            background_color: SerializableColor::new(245, 240, 230, 255),
            visible_only: false,
            board: BoardConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Resolved storage directory.
    pub fn storage_path(&self) -> Result<PathBuf, AppError> {
        match &self.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(corkboard_core::storage::FileStorage::default_path()?),
        }
    }
}
