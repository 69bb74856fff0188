//! Corner resize handles on a note.

use kurbo::{Point, Rect, Vec2};

/// Side length of a drawn corner handle, in board units.
pub const HANDLE_SIZE: f64 = 12.0;

/// Extra slack around a handle when hit testing.
pub const HANDLE_HIT_TOLERANCE: f64 = 4.0;

/// One of the four note corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Whether dragging this corner moves the left edge (otherwise the right).
    pub fn moves_left(&self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }

    /// Whether dragging this corner moves the top edge (otherwise the bottom).
    pub fn moves_top(&self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }

    /// Position of this corner on `rect`.
    pub fn point_on(&self, rect: Rect) -> Point {
        let x = if self.moves_left() { rect.x0 } else { rect.x1 };
        let y = if self.moves_top() { rect.y0 } else { rect.y1 };
        Point::new(x, y)
    }
}

/// A manipulation handle on a note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub corner: Corner,
    /// Center in board coordinates.
    pub position: Point,
}

impl Handle {
    pub fn new(corner: Corner, position: Point) -> Self {
        Self { corner, position }
    }

    /// Square drawn for this handle.
    pub fn rect(&self) -> Rect {
        Rect::from_center_size(self.position, (HANDLE_SIZE, HANDLE_SIZE))
    }

    pub fn hit_test(&self, point: Point) -> bool {
        self.rect().inflate(HANDLE_HIT_TOLERANCE, HANDLE_HIT_TOLERANCE).contains(point)
    }
}

/// The four corner handles of `rect`.
pub fn handles_for(rect: Rect) -> [Handle; 4] {
    Corner::ALL.map(|corner| Handle::new(corner, corner.point_on(rect)))
}

/// Which corner handle of `rect`, if any, lies under `point`.
pub fn hit_test_handle(rect: Rect, point: Point) -> Option<Corner> {
    handles_for(rect)
        .into_iter()
        .find(|h| h.hit_test(point))
        .map(|h| h.corner)
}

/// New rectangle after dragging `corner` of `start` by `delta`.
///
/// The opposite edges stay fixed. Moving edges are kept inside
/// `[0, bounds]`, then the minimum size wins so the result is never smaller
/// than `min_size` on either axis.
pub fn resize_rect(start: Rect, corner: Corner, delta: Vec2, min_size: f64, bounds: Rect) -> Rect {
    let (mut x0, mut y0, mut x1, mut y1) = (start.x0, start.y0, start.x1, start.y1);

    if corner.moves_left() {
        x0 = (x0 + delta.x).max(bounds.x0).min(x1 - min_size);
    } else {
        x1 = (x1 + delta.x).min(bounds.x1).max(x0 + min_size);
    }

    if corner.moves_top() {
        y0 = (y0 + delta.y).max(bounds.y0).min(y1 - min_size);
    } else {
        y1 = (y1 + delta.y).min(bounds.y1).max(y0 + min_size);
    }

    Rect::new(x0, y0, x1, y1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD: Rect = Rect::new(0.0, 0.0, 3000.0, 2000.0);

    #[test]
    fn test_handle_positions() {
        let rect = Rect::new(10.0, 20.0, 110.0, 220.0);
        let handles = handles_for(rect);
        assert_eq!(handles[0].position, Point::new(10.0, 20.0));
        assert_eq!(handles[3].position, Point::new(110.0, 220.0));
    }

    #[test]
    fn test_hit_test_handle() {
        let rect = Rect::new(100.0, 100.0, 350.0, 350.0);
        assert_eq!(hit_test_handle(rect, Point::new(348.0, 352.0)), Some(Corner::BottomRight));
        assert_eq!(hit_test_handle(rect, Point::new(101.0, 99.0)), Some(Corner::TopLeft));
        assert_eq!(hit_test_handle(rect, Point::new(200.0, 200.0)), None);
    }

    #[test]
    fn test_bottom_right_grows() {
        let start = Rect::new(100.0, 100.0, 350.0, 350.0);
        let rect = resize_rect(start, Corner::BottomRight, Vec2::new(50.0, 20.0), 150.0, BOARD);
        assert_eq!(rect, Rect::new(100.0, 100.0, 400.0, 370.0));
    }

    #[test]
    fn test_top_left_anchors_bottom_right() {
        let start = Rect::new(100.0, 100.0, 350.0, 350.0);
        let rect = resize_rect(start, Corner::TopLeft, Vec2::new(500.0, 500.0), 150.0, BOARD);
        assert_eq!(rect, Rect::new(200.0, 200.0, 350.0, 350.0));
    }

    #[test]
    fn test_min_size_under_extreme_deltas() {
        let start = Rect::new(500.0, 500.0, 750.0, 750.0);
        for corner in Corner::ALL {
            for delta in [
                Vec2::new(1e9, 1e9),
                Vec2::new(-1e9, -1e9),
                Vec2::new(1e9, -1e9),
                Vec2::new(-1e9, 1e9),
            ] {
                let rect = resize_rect(start, corner, delta, 150.0, BOARD);
                assert!(rect.width() >= 150.0, "{corner:?} {delta:?}");
                assert!(rect.height() >= 150.0, "{corner:?} {delta:?}");
                assert!(rect.x0 >= 0.0 && rect.y0 >= 0.0);
                assert!(rect.x1 <= BOARD.x1 && rect.y1 <= BOARD.y1);
            }
        }
    }

    #[test]
    fn test_top_right_moves_top_and_right() {
        let start = Rect::new(100.0, 100.0, 350.0, 350.0);
        let rect = resize_rect(start, Corner::TopRight, Vec2::new(10.0, -10.0), 150.0, BOARD);
        assert_eq!(rect, Rect::new(100.0, 90.0, 360.0, 350.0));
    }
}
