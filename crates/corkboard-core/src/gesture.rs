//! Board-level gesture state.

use crate::notes::NoteId;
use crate::strokes::{Bounds, StrokeId};
use kurbo::{Point, Vec2};

/// Tape shorter than this is discarded on release.
pub const MIN_TAPE_LENGTH: f64 = 1.0;

/// The pointer gesture the board is running. Exactly one at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Appending points to the last stroke in the list.
    Inking { id: StrokeId },
    /// Stretching a tape segment; nothing is committed until release.
    Taping { start: Point, current: Point, seed: u32 },
    /// Moving a stroke. `applied` is the translation applied so far, measured
    /// from `start_bounds`. `edited` is set once the stroke list changed and
    /// an undo snapshot was taken.
    DraggingStroke {
        id: StrokeId,
        origin: Point,
        start_bounds: Bounds,
        applied: Vec2,
        edited: bool,
    },
    /// Scrolling the viewport with the hand tool.
    Panning { last_client: Point },
    /// A note owns the gesture; its [`NoteMode`](crate::notes::NoteMode)
    /// says what kind.
    Note { id: NoteId },
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Idle => "idle",
            Gesture::Inking { .. } => "inking",
            Gesture::Taping { .. } => "taping",
            Gesture::DraggingStroke { .. } => "dragging-stroke",
            Gesture::Panning { .. } => "panning",
            Gesture::Note { .. } => "note",
        }
    }
}

/// Clamp a total drag translation so `bounds` stays inside `[0, extent]`.
/// A stroke already hanging over an edge may stay there but never moves
/// further out.
pub(crate) fn clamp_translation(desired: Vec2, bounds: Bounds, extent: kurbo::Size) -> Vec2 {
    let axis = |d: f64, min: f64, max: f64, limit: f64| {
        let lo = (-min).min(0.0);
        let hi = (limit - max).max(0.0);
        d.clamp(lo, hi)
    };
    Vec2::new(
        axis(desired.x, bounds.min_x, bounds.max_x, extent.width),
        axis(desired.y, bounds.min_y, bounds.max_y, extent.height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;

    #[test]
    fn test_clamp_translation_inside() {
        let bounds = Bounds::new(100.0, 100.0, 200.0, 150.0);
        let board = Size::new(1000.0, 500.0);
        assert_eq!(clamp_translation(Vec2::new(50.0, -20.0), bounds, board), Vec2::new(50.0, -20.0));
        assert_eq!(clamp_translation(Vec2::new(-500.0, 900.0), bounds, board), Vec2::new(-100.0, 350.0));
    }

    #[test]
    fn test_clamp_translation_overhanging() {
        // Already 10px past the left edge: may not go further left, may go right.
        let bounds = Bounds::new(-10.0, 0.0, 50.0, 20.0);
        let board = Size::new(1000.0, 500.0);
        assert_eq!(clamp_translation(Vec2::new(-30.0, 0.0), bounds, board).x, 0.0);
        assert_eq!(clamp_translation(Vec2::new(30.0, 0.0), bounds, board).x, 30.0);
    }

    #[test]
    fn test_gesture_names() {
        assert!(Gesture::default().is_idle());
        assert_eq!(Gesture::Note { id: 1 }.name(), "note");
    }
}
