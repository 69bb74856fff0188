//! Tool selection and the active style owned by the board.

use crate::notes::NoteColor;
use crate::strokes::{InkStyle, InkTool, SerializableColor, TapePattern, TapeStroke};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    #[default]
    Select,
    Hand,
    Marker,
    Highlighter,
    Eraser,
    Tape,
    /// One-shot action: adds a note, then the board returns to select.
    AddNote,
}

impl ToolKind {
    /// The ink tool this kind draws with, if any.
    pub fn ink_tool(&self) -> Option<InkTool> {
        match self {
            ToolKind::Marker => Some(InkTool::Marker),
            ToolKind::Highlighter => Some(InkTool::Highlighter),
            ToolKind::Eraser => Some(InkTool::Eraser),
            _ => None,
        }
    }

    /// Whether pointer-down on empty board starts a stroke.
    pub fn is_drawing_tool(&self) -> bool {
        self.ink_tool().is_some() || *self == ToolKind::Tape
    }
}

/// Highlighter strokes never go below this width.
pub const HIGHLIGHTER_MIN_WIDTH: f64 = 20.0;
/// Highlighter opacity, regardless of the opacity slider.
pub const HIGHLIGHTER_OPACITY: f64 = 0.3;
/// Eraser strokes never go below this width.
pub const ERASER_MIN_WIDTH: f64 = 30.0;

/// The active tool and style selections.
///
/// A single instance lives on the board; gesture handlers read it when a
/// stroke or note is created, so later changes never touch existing marks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolState {
    pub active: ToolKind,
    /// Ink color for marker and highlighter.
    pub color: SerializableColor,
    pub width: f64,
    pub opacity: f64,
    pub tape_pattern: TapePattern,
    pub tape_color: SerializableColor,
    pub tape_width: f64,
    /// Background color for new notes.
    pub note_color: NoteColor,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            active: ToolKind::Select,
            color: SerializableColor::black(),
            width: InkTool::Marker.default_width(),
            opacity: 1.0,
            tape_pattern: TapePattern::default(),
            tape_color: TapeStroke::DEFAULT_COLOR,
            tape_width: TapeStroke::DEFAULT_WIDTH,
            note_color: NoteColor::default(),
        }
    }
}

impl ToolState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_color(&mut self, color: SerializableColor) {
        self.color = color;
    }

    pub fn set_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.width = width;
        }
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        if opacity.is_finite() {
            self.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    pub fn set_tape_pattern(&mut self, pattern: TapePattern) {
        self.tape_pattern = pattern;
    }

    pub fn set_tape_color(&mut self, color: SerializableColor) {
        self.tape_color = color;
    }

    pub fn set_tape_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.tape_width = width;
        }
    }

    pub fn set_note_color(&mut self, color: NoteColor) {
        self.note_color = color;
    }

    /// Style a new stroke of `tool` starts with.
    pub fn ink_style(&self, tool: InkTool) -> InkStyle {
        match tool {
            InkTool::Marker => InkStyle {
                color: self.color,
                width: self.width,
                opacity: self.opacity,
            },
            InkTool::Highlighter => InkStyle {
                color: self.color,
                width: self.width.max(HIGHLIGHTER_MIN_WIDTH),
                opacity: HIGHLIGHTER_OPACITY,
            },
            InkTool::Eraser => InkStyle {
                color: SerializableColor::transparent(),
                width: self.width.max(ERASER_MIN_WIDTH),
                opacity: 1.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let tools = ToolState::new();
        assert_eq!(tools.active, ToolKind::Select);
        assert_eq!(tools.tape_pattern, TapePattern::Diagonal);
        assert_eq!(tools.tape_color.to_hex(), "#ff6b6b");
        assert!((tools.width - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_highlighter_style_forced() {
        let mut tools = ToolState::new();
        tools.set_opacity(0.9);
        let style = tools.ink_style(InkTool::Highlighter);
        assert!((style.opacity - HIGHLIGHTER_OPACITY).abs() < f64::EPSILON);
        assert!((style.width - HIGHLIGHTER_MIN_WIDTH).abs() < f64::EPSILON);
    }

    #[test]
    fn test_eraser_min_width() {
        let mut tools = ToolState::new();
        tools.set_width(50.0);
        assert!((tools.ink_style(InkTool::Eraser).width - 50.0).abs() < f64::EPSILON);
        tools.set_width(2.0);
        assert!((tools.ink_style(InkTool::Eraser).width - ERASER_MIN_WIDTH).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_values_ignored() {
        let mut tools = ToolState::new();
        tools.set_width(-3.0);
        tools.set_width(f64::NAN);
        assert!((tools.width - 5.0).abs() < f64::EPSILON);
        tools.set_opacity(4.0);
        assert!((tools.opacity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tool_kind_names() {
        assert_eq!(serde_json::to_string(&ToolKind::AddNote).unwrap(), "\"add-note\"");
        assert_eq!(ToolKind::Highlighter.ink_tool(), Some(InkTool::Highlighter));
        assert!(ToolKind::Tape.is_drawing_tool());
        assert!(!ToolKind::Hand.is_drawing_tool());
    }
}
