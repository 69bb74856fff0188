//! Renderer trait abstraction.

use corkboard_core::Board;
use kurbo::Rect;
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("PNG encoding failed: {0}")]
    Encode(String),
    #[error("Surface error: {0}")]
    Surface(String),
}

impl From<png::EncodingError> for RendererError {
    fn from(err: png::EncodingError) -> Self {
        RendererError::Encode(err.to_string())
    }
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The board to render.
    pub board: &'a Board,
    /// Region of the board to draw, in board coordinates.
    pub region: Rect,
    /// Background color behind strokes and notes.
    pub background_color: Color,
    /// Outline color for the selected note.
    pub selection_color: Color,
    /// Draw the selected note's outline, handles and floating toolbar.
    pub show_selection: bool,
}

impl<'a> RenderContext<'a> {
    /// Create a context covering the whole board.
    pub fn new(board: &'a Board) -> Self {
        let size = board.board_size();
        Self {
            board,
            region: Rect::new(0.0, 0.0, size.width, size.height),
            background_color: Color::from_rgba8(245, 240, 230, 255),
            selection_color: Color::from_rgba8(59, 130, 246, 255), // Blue
            show_selection: true,
        }
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Set the selection outline color.
    pub fn with_selection_color(mut self, color: Color) -> Self {
        self.selection_color = color;
        self
    }

    /// Restrict drawing to a region of the board.
    pub fn with_region(mut self, region: Rect) -> Self {
        self.region = region;
        self
    }

    /// Restrict drawing to what the board's viewport currently shows.
    pub fn with_visible_region(self) -> Self {
        let region = self.board.viewport.visible_rect();
        self.with_region(region)
    }

    /// Hide selection chrome (for exports).
    pub fn without_selection(mut self) -> Self {
        self.show_selection = false;
        self
    }

    /// Pixel size of the output for this region.
    pub fn output_size(&self) -> (u32, u32) {
        pixel_size(self.region)
    }
}

/// Whole-pixel size of a board region, at least 1×1.
pub(crate) fn pixel_size(region: Rect) -> (u32, u32) {
    let px = |len: f64| if len.is_finite() { len.round().max(1.0) as u32 } else { 1 };
    (px(region.width()), px(region.height()))
}

/// Trait for rendering backends.
///
/// Implementations can rasterise in software, or hand the scene to a GPU
/// renderer, without the board model knowing which.
pub trait Renderer: Send + Sync {
    /// Build the retained scene for a frame.
    ///
    /// This method is called once per frame and should prepare all drawing commands.
    fn build_scene(&mut self, ctx: &RenderContext);
}
