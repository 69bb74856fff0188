//! Snapshot run: open the saved board, render it, write a PNG.

use crate::{AppConfig, AppError};
use corkboard_core::Board;
use corkboard_core::storage::{BoardStore, FileStorage};
use corkboard_render::{RasterRenderer, RenderContext};
use std::path::PathBuf;
use std::sync::Arc;

/// Main application struct.
pub struct App {
    config: AppConfig,
    renderer: RasterRenderer,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            renderer: RasterRenderer::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Store over the configured storage directory.
    pub fn open_store(&self) -> Result<BoardStore<FileStorage>, AppError> {
        let path = self.config.storage_path()?;
        log::debug!("Opening board storage at {}", path.display());
        Ok(BoardStore::new(Arc::new(FileStorage::new(path)?)))
    }

    pub fn load_board(&self) -> Result<Board, AppError> {
        let store = self.open_store()?;
        Ok(pollster::block_on(store.load(self.config.board.clone()))?)
    }

    /// Encode a PNG of `board`.
    pub fn snapshot(&mut self, board: &Board) -> Result<Vec<u8>, AppError> {
        let mut ctx = RenderContext::new(board)
            .with_background(self.config.background_color.into())
            .without_selection();
        if self.config.visible_only {
            ctx = ctx.with_visible_region();
        }
        let image = self.renderer.export_png(&ctx)?;
        Ok(image.encode()?)
    }

    /// Load, render and write the snapshot. Returns the output path.
    pub fn run(&mut self) -> Result<PathBuf, AppError> {
        let board = self.load_board()?;
        log::info!(
            "Loaded board: {} strokes, {} notes",
            board.strokes().len(),
            board.list_notes().len()
        );
        let png = self.snapshot(&board)?;

        let output = self.config.output.clone();
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&output, &png)?;
        log::info!("Wrote {} ({} bytes)", output.display(), png.len());
        Ok(output)
    }
}
