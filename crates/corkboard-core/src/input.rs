//! Pointer input for mouse, touch and pen.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Movement below this many pixels between down and up counts as a click.
pub const CLICK_DISTANCE: f64 = 3.0;

/// Source device of a pointer event. All kinds are handled identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
    Pen,
}

/// Pointer event type for unified mouse/touch handling.
///
/// Positions are in client space; the board maps them through its
/// viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, kind: PointerKind },
    Move { position: Point, kind: PointerKind },
    Up { position: Point, kind: PointerKind },
    /// The pointer left the board surface. Ends any gesture like `Up`.
    Leave,
}

impl PointerEvent {
    pub fn down(x: f64, y: f64) -> Self {
        PointerEvent::Down {
            position: Point::new(x, y),
            kind: PointerKind::Mouse,
        }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        PointerEvent::Move {
            position: Point::new(x, y),
            kind: PointerKind::Mouse,
        }
    }

    pub fn up(x: f64, y: f64) -> Self {
        PointerEvent::Up {
            position: Point::new(x, y),
            kind: PointerKind::Mouse,
        }
    }

    pub fn position(&self) -> Option<Point> {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position, .. }
            | PointerEvent::Up { position, .. } => Some(*position),
            PointerEvent::Leave => None,
        }
    }
}

/// Tracks the pointer across a gesture.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Current pointer position in client coordinates.
    pub pointer_position: Point,
    /// Previous pointer position for delta calculations.
    pub previous_pointer_position: Point,
    /// Whether the pointer is currently pressed.
    pub is_pressed: bool,
    /// Where the current press started.
    pub press_start: Option<Point>,
    /// Longest distance from `press_start` seen during this press.
    max_travel: f64,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a pointer event.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        if let Some(position) = event.position() {
            self.previous_pointer_position = self.pointer_position;
            self.pointer_position = position;
        }
        match event {
            PointerEvent::Down { position, .. } => {
                self.previous_pointer_position = position;
                self.is_pressed = true;
                self.press_start = Some(position);
                self.max_travel = 0.0;
            }
            PointerEvent::Move { position, .. } | PointerEvent::Up { position, .. } => {
                if let Some(start) = self.press_start {
                    self.max_travel = self.max_travel.max((position - start).hypot());
                }
                if matches!(event, PointerEvent::Up { .. }) {
                    self.is_pressed = false;
                }
            }
            PointerEvent::Leave => {
                self.is_pressed = false;
            }
        }
    }

    /// Pointer movement since the previous event.
    pub fn pointer_delta(&self) -> Vec2 {
        self.pointer_position - self.previous_pointer_position
    }

    /// Offset from the press start, if pressed.
    pub fn drag_delta(&self) -> Option<Vec2> {
        self.press_start.map(|start| self.pointer_position - start)
    }

    /// Whether the last press stayed within [`CLICK_DISTANCE`].
    pub fn is_click(&self) -> bool {
        self.press_start.is_some() && self.max_travel < CLICK_DISTANCE
    }
}
