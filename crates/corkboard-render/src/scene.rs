//! Retained scene: the ordered list of primitives a frame is drawn from.
//!
//! Building a scene only reads the board. Any backend can then draw it,
//! so the model layer never knows how pixels are produced.

use crate::renderer::RenderContext;
use corkboard_core::notes::handles_for;
use corkboard_core::{InkStroke, NoteId, SerializableColor, Stroke, Surface, TapeStroke};
use kurbo::Rect;

/// A drawable on the stroke layer, in board coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawItem {
    Ink(InkStroke),
    Tape(TapeStroke),
}

/// A note card ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteCard {
    pub id: NoteId,
    pub rect: Rect,
    pub fill: SerializableColor,
    /// Private drawing with any in-progress stroke already applied.
    pub drawing: Surface,
    pub selected: bool,
}

/// Selection chrome drawn above everything else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Chrome {
    Outline(Rect),
    Handle(Rect),
    Toolbar(Rect),
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    /// Stroke layer: all ink in z-order, then all tape, then the tape
    /// preview.
    pub strokes: Vec<DrawItem>,
    /// Notes bottom to top.
    pub notes: Vec<NoteCard>,
    pub chrome: Vec<Chrome>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stroke layer items for a stroke list: ink first, tape second, each
    /// in z-order.
    pub fn stroke_items(strokes: &[Stroke]) -> Vec<DrawItem> {
        let ink = strokes.iter().filter_map(Stroke::as_ink).cloned().map(DrawItem::Ink);
        let tape = strokes.iter().filter_map(Stroke::as_tape).cloned().map(DrawItem::Tape);
        ink.chain(tape).collect()
    }

    /// Snapshot the board for one frame.
    pub fn build(ctx: &RenderContext) -> Self {
        let board = ctx.board;
        let mut strokes = Self::stroke_items(board.strokes());
        if let Some(preview) = board.preview_tape() {
            strokes.push(DrawItem::Tape(preview));
        }

        let selected = board.note_manager().selected();
        let notes: Vec<NoteCard> = board
            .notes_in_paint_order()
            .into_iter()
            .map(|note| {
                let mut drawing = note.sub_drawing().surface().clone();
                if let Some(ink) = note.pending_ink() {
                    drawing.draw_ink(ink.points(), &ink.style(), ink.tool);
                }
                NoteCard {
                    id: note.id(),
                    rect: note.rect(),
                    fill: note.style.color.to_color(),
                    drawing,
                    selected: selected == Some(note.id()),
                }
            })
            .collect();

        let mut chrome = Vec::new();
        if ctx.show_selection {
            if let Some(note) = board.selected_note() {
                chrome.push(Chrome::Outline(note.rect()));
                chrome.extend(handles_for(note.rect()).iter().map(|h| Chrome::Handle(h.rect())));
            }
            if let Some(rect) = board.note_manager().toolbar.rect() {
                chrome.push(Chrome::Toolbar(rect));
            }
        }

        log::trace!(
            "Built scene: {} stroke items, {} notes, {} chrome",
            strokes.len(),
            notes.len(),
            chrome.len()
        );
        Self { strokes, notes, chrome }
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.notes.is_empty() && self.chrome.is_empty()
    }
}
