//! Viewport module: maps pointer positions to board coordinates.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// The visible window onto the scrollable board.
///
/// Pointer positions arrive in client space (relative to the window). The
/// board element sits at `origin` in client space and is scrolled by
/// `scroll`, so a board coordinate is `client - origin + scroll`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// On-screen origin of the board element in client space.
    pub origin: Point,
    /// Current scroll offset of the board container.
    pub scroll: Vec2,
    /// Size of the visible window.
    pub size: Size,
    /// Full scrollable extent of the board.
    pub board_size: Size,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Size::new(1280.0, 800.0), Size::new(3000.0, 2000.0))
    }
}

impl Viewport {
    pub fn new(size: Size, board_size: Size) -> Self {
        Self {
            origin: Point::ZERO,
            scroll: Vec2::ZERO,
            size,
            board_size,
        }
    }

    /// Client space to board space.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.scroll - self.origin.to_vec2())
    }

    /// Convert a client position to board coordinates. Out-of-bounds
    /// results are returned as-is.
    pub fn to_board_coords(&self, client: Point) -> Point {
        self.transform() * client
    }

    /// Convert a board position back to client space.
    pub fn to_client_coords(&self, board: Point) -> Point {
        self.transform().inverse() * board
    }

    /// Largest valid scroll offset.
    pub fn max_scroll(&self) -> Vec2 {
        Vec2::new(
            (self.board_size.width - self.size.width).max(0.0),
            (self.board_size.height - self.size.height).max(0.0),
        )
    }

    /// Set the scroll offset, clamped to the scrollable extent.
    pub fn scroll_to(&mut self, scroll: Vec2) {
        let max = self.max_scroll();
        self.scroll = Vec2::new(scroll.x.clamp(0.0, max.x), scroll.y.clamp(0.0, max.y));
    }

    /// Scroll by `delta`, clamped.
    pub fn scroll_by(&mut self, delta: Vec2) {
        self.scroll_to(self.scroll + delta);
    }

    /// Hand-tool pan: moving the pointer by `delta` drags the content with
    /// it, so the scroll offset moves the opposite way.
    pub fn pan(&mut self, delta: Vec2) {
        self.scroll_by(-delta);
    }

    /// Visible region in board coordinates.
    pub fn visible_rect(&self) -> Rect {
        Rect::from_origin_size(self.scroll.to_point(), self.size)
    }

    /// Center of the visible region in board coordinates.
    pub fn center(&self) -> Point {
        self.visible_rect().center()
    }

    /// Board extent as a rectangle anchored at the origin.
    pub fn board_rect(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.board_size)
    }

    /// Change the visible window size and re-clamp the scroll offset.
    pub fn resize(&mut self, size: Size) {
        self.size = size;
        self.scroll_to(self.scroll);
    }

    /// Change the board extent and re-clamp the scroll offset.
    pub fn resize_board(&mut self, board_size: Size) {
        self.board_size = board_size;
        self.scroll_to(self.scroll);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_mapping() {
        let viewport = Viewport::default();
        let p = viewport.to_board_coords(Point::new(100.0, 200.0));
        assert!((p.x - 100.0).abs() < f64::EPSILON);
        assert!((p.y - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_origin_and_scroll() {
        let mut viewport = Viewport::default();
        viewport.origin = Point::new(20.0, 60.0);
        viewport.scroll_to(Vec2::new(300.0, 150.0));
        let p = viewport.to_board_coords(Point::new(100.0, 100.0));
        assert!((p.x - 380.0).abs() < f64::EPSILON);
        assert!((p.y - 190.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut viewport = Viewport::default();
        viewport.origin = Point::new(12.0, 34.0);
        viewport.scroll_to(Vec2::new(56.0, 78.0));
        let client = Point::new(123.0, 456.0);
        let back = viewport.to_client_coords(viewport.to_board_coords(client));
        assert!((back.x - client.x).abs() < 1e-10);
        assert!((back.y - client.y).abs() < 1e-10);
    }

    #[test]
    fn test_out_of_bounds_not_clamped() {
        let viewport = Viewport::default();
        let p = viewport.to_board_coords(Point::new(-50.0, 99999.0));
        assert!((p.x + 50.0).abs() < f64::EPSILON);
        assert!((p.y - 99999.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scroll_clamped() {
        let mut viewport = Viewport::new(Size::new(1000.0, 500.0), Size::new(3000.0, 2000.0));
        viewport.scroll_to(Vec2::new(-10.0, 5000.0));
        assert_eq!(viewport.scroll, Vec2::new(0.0, 1500.0));
    }

    #[test]
    fn test_pan_moves_opposite() {
        let mut viewport = Viewport::default();
        viewport.scroll_to(Vec2::new(500.0, 500.0));
        viewport.pan(Vec2::new(100.0, -40.0));
        assert_eq!(viewport.scroll, Vec2::new(400.0, 540.0));
    }

    #[test]
    fn test_center_follows_scroll() {
        let mut viewport = Viewport::new(Size::new(800.0, 600.0), Size::new(3000.0, 2000.0));
        assert_eq!(viewport.center(), Point::new(400.0, 300.0));
        viewport.scroll_to(Vec2::new(100.0, 50.0));
        assert_eq!(viewport.center(), Point::new(500.0, 350.0));
    }

    #[test]
    fn test_resize_board_reclamps() {
        let mut viewport = Viewport::new(Size::new(1000.0, 1000.0), Size::new(3000.0, 3000.0));
        viewport.scroll_to(Vec2::new(2000.0, 2000.0));
        viewport.resize_board(Size::new(1500.0, 1200.0));
        assert_eq!(viewport.scroll, Vec2::new(500.0, 200.0));
    }
}
