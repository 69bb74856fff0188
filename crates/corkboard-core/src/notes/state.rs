//! Per-note interaction state machine.

use super::content::TextSelection;
use super::handles::{self, Corner};
use super::note::Note;
use crate::strokes::{InkStroke, InkStyle, InkTool};
use kurbo::{Point, Rect, Size, Vec2};

/// What a note is doing right now. Exactly one mode at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NoteMode {
    #[default]
    Idle,
    /// Following the pointer. `grab` is the pointer offset from the note
    /// origin; `pressed_text` records whether the press landed on the text
    /// region, so a click there can enter text editing on release.
    Dragging { grab: Vec2, pressed_text: bool },
    /// Dragging a corner handle.
    Resizing {
        corner: Corner,
        start_rect: Rect,
        start_pointer: Point,
    },
    /// Pointer gestures draw into the note's own layer. `stroke` holds the
    /// stroke in progress, in note-local coordinates.
    InlineDrawing { stroke: Option<InkStroke> },
    /// The text region has focus.
    TextEditing { selection: TextSelection },
}

impl NoteMode {
    pub fn is_idle(&self) -> bool {
        matches!(self, NoteMode::Idle)
    }

    pub fn is_inline_drawing(&self) -> bool {
        matches!(self, NoteMode::InlineDrawing { .. })
    }

    pub fn is_text_editing(&self) -> bool {
        matches!(self, NoteMode::TextEditing { .. })
    }

    /// Whether a pointer gesture is in flight.
    pub fn is_gesture(&self) -> bool {
        matches!(
            self,
            NoteMode::Dragging { .. }
                | NoteMode::Resizing { .. }
                | NoteMode::InlineDrawing { stroke: Some(_) }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            NoteMode::Idle => "idle",
            NoteMode::Dragging { .. } => "dragging",
            NoteMode::Resizing { .. } => "resizing",
            NoteMode::InlineDrawing { .. } => "inline-drawing",
            NoteMode::TextEditing { .. } => "text-editing",
        }
    }
}

impl Note {
    fn set_mode(&mut self, mode: NoteMode) {
        if std::mem::discriminant(&self.mode) != std::mem::discriminant(&mode) {
            log::debug!("Note {}: {} -> {}", self.id, self.mode.name(), mode.name());
        }
        self.mode = mode;
    }

    /// Start following the pointer. Refused while inline drawing or while
    /// the press is on a focused text region.
    pub fn begin_drag(&mut self, pointer: Point) -> bool {
        let on_text = self.text_rect().contains(pointer);
        let allowed = match &self.mode {
            NoteMode::Idle => true,
            NoteMode::TextEditing { .. } => !on_text,
            _ => false,
        };
        if allowed {
            self.set_mode(NoteMode::Dragging {
                grab: pointer - self.position(),
                pressed_text: on_text,
            });
        }
        allowed
    }

    pub fn drag_to(&mut self, pointer: Point, board: Size) {
        if let NoteMode::Dragging { grab, .. } = self.mode {
            self.move_to(pointer - grab, board);
        }
    }

    /// Start a corner resize. Refused while inline drawing.
    pub fn begin_resize(&mut self, corner: Corner, pointer: Point) -> bool {
        if !matches!(self.mode, NoteMode::Idle | NoteMode::TextEditing { .. }) {
            return false;
        }
        self.set_mode(NoteMode::Resizing {
            corner,
            start_rect: self.rect(),
            start_pointer: pointer,
        });
        true
    }

    /// Apply the current pointer to an ongoing resize. The drawing is only
    /// resampled when the gesture ends.
    pub fn resize_to(&mut self, pointer: Point, min_size: f64, bounds: Rect) {
        if let NoteMode::Resizing {
            corner,
            start_rect,
            start_pointer,
        } = self.mode
        {
            let rect = handles::resize_rect(start_rect, corner, pointer - start_pointer, min_size, bounds);
            self.set_rect(rect);
        }
    }

    /// Enable or disable inline drawing. Disabling commits any stroke in
    /// progress. Returns true when the mode changed.
    pub fn set_inline_drawing(&mut self, enable: bool) -> bool {
        match (enable, &self.mode) {
            (true, NoteMode::Idle | NoteMode::TextEditing { .. }) => {
                self.set_mode(NoteMode::InlineDrawing { stroke: None });
                true
            }
            (false, NoteMode::InlineDrawing { .. }) => {
                self.commit_ink();
                self.set_mode(NoteMode::Idle);
                true
            }
            _ => false,
        }
    }

    /// Begin an ink stroke at a board point. Only valid while inline drawing.
    pub fn begin_ink(&mut self, point: Point, tool: InkTool, style: &InkStyle) -> bool {
        let local = self.to_local(point);
        match &mut self.mode {
            NoteMode::InlineDrawing { stroke } => {
                *stroke = Some(InkStroke::begin(tool, local, style));
                true
            }
            _ => false,
        }
    }

    pub fn extend_ink(&mut self, point: Point) {
        let local = self.to_local(point);
        if let NoteMode::InlineDrawing { stroke: Some(stroke) } = &mut self.mode {
            stroke.extend(local);
        }
    }

    /// Stroke currently being drawn on this note, in note-local space.
    pub fn pending_ink(&self) -> Option<&InkStroke> {
        match &self.mode {
            NoteMode::InlineDrawing { stroke } => stroke.as_ref(),
            _ => None,
        }
    }

    fn commit_ink(&mut self) -> bool {
        if let NoteMode::InlineDrawing { stroke } = &mut self.mode {
            if let Some(stroke) = stroke.take() {
                self.sub_drawing.draw_stroke(&stroke);
                return true;
            }
        }
        false
    }

    /// Focus the text region with `selection`. Refused while inline drawing.
    pub fn begin_text_editing(&mut self, selection: TextSelection) -> bool {
        match self.mode {
            NoteMode::Idle | NoteMode::TextEditing { .. } => {
                self.set_mode(NoteMode::TextEditing { selection });
                true
            }
            _ => false,
        }
    }

    /// Current text selection, when editing.
    pub fn text_selection(&self) -> Option<TextSelection> {
        match self.mode {
            NoteMode::TextEditing { selection } => Some(selection),
            _ => None,
        }
    }

    pub(crate) fn set_text_selection(&mut self, selection: TextSelection) {
        if let NoteMode::TextEditing { selection: current } = &mut self.mode {
            *current = selection;
        }
    }

    /// End the pointer gesture. `is_click` is true when the pointer barely
    /// moved. Returns true when the note changed and must be persisted.
    pub fn finish_gesture(&mut self, is_click: bool) -> bool {
        match self.mode {
            NoteMode::Dragging { pressed_text, .. } => {
                if is_click && pressed_text {
                    let caret = TextSelection::caret(self.content.char_len());
                    self.set_mode(NoteMode::TextEditing { selection: caret });
                } else {
                    self.set_mode(NoteMode::Idle);
                }
                true
            }
            NoteMode::Resizing { .. } => {
                self.fit_drawing();
                self.set_mode(NoteMode::Idle);
                true
            }
            NoteMode::InlineDrawing { .. } => self.commit_ink(),
            NoteMode::Idle | NoteMode::TextEditing { .. } => false,
        }
    }

    /// Drop focus and return to idle, committing any pending work. Returns
    /// true when the note must be persisted.
    pub fn blur(&mut self) -> bool {
        let persist = match self.mode {
            NoteMode::Idle => false,
            NoteMode::InlineDrawing { .. } => {
                self.commit_ink();
                true
            }
            NoteMode::Dragging { .. } | NoteMode::Resizing { .. } => {
                self.finish_gesture(false);
                true
            }
            NoteMode::TextEditing { .. } => true,
        };
        self.set_mode(NoteMode::Idle);
        persist
    }
}
