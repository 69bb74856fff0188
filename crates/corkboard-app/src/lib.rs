//! Corkboard Application
//!
//! Headless shell: loads configuration, opens the persisted board and
//! writes a PNG snapshot of it.

mod app;
mod config;

pub use app::App;
pub use config::AppConfig;

use corkboard_core::storage::StorageError;
use corkboard_render::RendererError;
use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Render error: {0}")]
    Render(#[from] RendererError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
