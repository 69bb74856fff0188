//! Board configuration.

use crate::strokes::HitBuffer;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Geometry and limits for a board. Every field has a default, so a
/// partial JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Scrollable extent of the board.
    pub board_width: f64,
    pub board_height: f64,
    /// Visible window onto the board.
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub default_note_width: f64,
    pub default_note_height: f64,
    /// Notes never shrink below this on either axis.
    pub min_note_size: f64,
    /// Minimum hit-test slack around stroke bounds.
    pub hit_buffer: f64,
    /// Hit-test slack per unit of stroke width.
    pub hit_buffer_width_factor: f64,
    /// Gap between a note and its floating toolbar.
    pub toolbar_margin: f64,
    pub toolbar_width: f64,
    pub toolbar_height: f64,
    /// Ink drawn on a note uses the board width times this.
    pub note_ink_scale: f64,
    /// Stroke-list undo depth.
    pub max_undo: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            board_width: 3000.0,
            board_height: 2000.0,
            viewport_width: 1280.0,
            viewport_height: 800.0,
            default_note_width: 250.0,
            default_note_height: 250.0,
            min_note_size: 150.0,
            hit_buffer: 10.0,
            hit_buffer_width_factor: 1.0,
            toolbar_margin: 10.0,
            toolbar_width: 320.0,
            toolbar_height: 44.0,
            note_ink_scale: 0.5,
            max_undo: 50,
        }
    }
}

impl BoardConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn board_size(&self) -> Size {
        Size::new(self.board_width, self.board_height)
    }

    pub fn viewport_size(&self) -> Size {
        Size::new(self.viewport_width, self.viewport_height)
    }

    pub fn default_note_size(&self) -> Size {
        Size::new(
            self.default_note_width.max(self.min_note_size),
            self.default_note_height.max(self.min_note_size),
        )
    }

    pub fn toolbar_size(&self) -> Size {
        Size::new(self.toolbar_width, self.toolbar_height)
    }

    pub fn hit_buffer(&self) -> HitBuffer {
        HitBuffer {
            min: self.hit_buffer,
            width_factor: self.hit_buffer_width_factor,
        }
    }
}
