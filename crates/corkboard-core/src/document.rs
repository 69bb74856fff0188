//! Board document: the persisted strokes and notes plus stroke history.

use crate::notes::{Note, NoteId};
use crate::strokes::{Stroke, StrokeId};
use std::collections::BTreeMap;

/// Default number of stroke-list snapshots kept for undo.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Strokes in z-order plus notes keyed by id.
#[derive(Debug, Clone)]
pub struct BoardDocument {
    strokes: Vec<Stroke>,
    notes: BTreeMap<NoteId, Note>,
    /// Next id handed out by [`BoardDocument::allocate_note_id`].
    next_note_id: NoteId,
    /// Undo history of the stroke list.
    undo_stack: Vec<Vec<Stroke>>,
    /// Redo history of the stroke list.
    redo_stack: Vec<Vec<Stroke>>,
    max_undo: usize,
}

impl Default for BoardDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardDocument {
    pub fn new() -> Self {
        Self {
            strokes: Vec::new(),
            notes: BTreeMap::new(),
            next_note_id: 1,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo: MAX_UNDO_HISTORY,
        }
    }

    /// Assemble a document from loaded parts. The id counter is raised past
    /// every existing note id.
    pub fn from_parts(strokes: Vec<Stroke>, notes: Vec<Note>, next_note_id: NoteId) -> Self {
        let mut document = Self::new();
        document.strokes = strokes;
        document.notes = notes.into_iter().map(|n| (n.id(), n)).collect();
        document.next_note_id = next_note_id.max(1);
        document.raise_note_counter();
        document
    }

    pub fn set_max_undo(&mut self, max_undo: usize) {
        self.max_undo = max_undo;
        let excess = self.undo_stack.len().saturating_sub(max_undo);
        self.undo_stack.drain(..excess);
    }

    fn raise_note_counter(&mut self) {
        if let Some(max) = self.notes.keys().next_back() {
            self.next_note_id = self.next_note_id.max(max.saturating_add(1));
        }
    }

    // --- Strokes ---

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub(crate) fn strokes_mut(&mut self) -> &mut Vec<Stroke> {
        &mut self.strokes
    }

    pub fn stroke(&self, id: StrokeId) -> Option<&Stroke> {
        self.strokes.iter().find(|s| s.id() == id)
    }

    pub(crate) fn stroke_mut(&mut self, id: StrokeId) -> Option<&mut Stroke> {
        // The active stroke is nearly always the last one.
        self.strokes.iter_mut().rev().find(|s| s.id() == id)
    }

    pub fn add_stroke(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    /// Move the stroke at `index` to the end of the list (front).
    pub fn bring_to_front(&mut self, index: usize) -> Option<StrokeId> {
        if index >= self.strokes.len() {
            return None;
        }
        let stroke = self.strokes.remove(index);
        let id = stroke.id();
        self.strokes.push(stroke);
        Some(id)
    }

    pub fn clear_strokes(&mut self) {
        self.strokes.clear();
    }

    /// Push the current stroke list to the undo stack (call before making
    /// changes).
    pub fn push_undo(&mut self) {
        self.undo_stack.push(self.strokes.clone());
        self.redo_stack.clear();
        if self.undo_stack.len() > self.max_undo {
            self.undo_stack.remove(0);
        }
    }

    /// Undo the last stroke-list change. Returns false if there is none.
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(snapshot) => {
                let current = std::mem::replace(&mut self.strokes, snapshot);
                self.redo_stack.push(current);
                true
            }
            None => false,
        }
    }

    /// Redo the last undone change. Returns false if there is none.
    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(snapshot) => {
                let current = std::mem::replace(&mut self.strokes, snapshot);
                self.undo_stack.push(current);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    // --- Notes ---

    pub fn notes(&self) -> &BTreeMap<NoteId, Note> {
        &self.notes
    }

    pub(crate) fn notes_mut(&mut self) -> &mut BTreeMap<NoteId, Note> {
        &mut self.notes
    }

    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes.get(&id)
    }

    pub fn next_note_id(&self) -> NoteId {
        self.next_note_id
    }

    /// Hand out a fresh, never reused note id.
    /// Hand out an id no live note uses. The counter wraps back to 1 once
    /// it is exhausted.
    pub fn allocate_note_id(&mut self) -> NoteId {
        let mut id = self.next_note_id;
        while self.notes.contains_key(&id) {
            id = successor(id);
        }
        self.next_note_id = successor(id);
        id
    }

    pub fn insert_note(&mut self, note: Note) {
        self.next_note_id = self.next_note_id.max(note.id().saturating_add(1));
        self.notes.insert(note.id(), note);
    }

    pub fn remove_note(&mut self, id: NoteId) -> Option<Note> {
        self.notes.remove(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.notes.is_empty()
    }
}

/// Next note id, skipping 0 on wrap.
pub(crate) fn successor(id: NoteId) -> NoteId {
    id.checked_add(1).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::NoteStyle;
    use crate::strokes::{InkStroke, InkStyle, InkTool};
    use kurbo::{Point, Size};

    fn marker(x: f64) -> Stroke {
        let style = InkStyle::for_tool(InkTool::Marker);
        Stroke::Ink(InkStroke::begin(InkTool::Marker, Point::new(x, x), &style))
    }

    fn note(id: NoteId) -> Note {
        Note::new(id, Point::ZERO, Size::new(250.0, 250.0), NoteStyle::default())
    }

    #[test]
    fn test_undo_redo() {
        let mut doc = BoardDocument::new();
        doc.push_undo();
        doc.add_stroke(marker(1.0));
        doc.push_undo();
        doc.add_stroke(marker(2.0));

        assert!(doc.undo());
        assert_eq!(doc.strokes().len(), 1);
        assert!(doc.undo());
        assert!(doc.strokes().is_empty());
        assert!(!doc.undo());

        assert!(doc.redo());
        assert!(doc.redo());
        assert_eq!(doc.strokes().len(), 2);
        assert!(!doc.redo());
    }

    #[test]
    fn test_new_change_clears_redo() {
        let mut doc = BoardDocument::new();
        doc.push_undo();
        doc.add_stroke(marker(1.0));
        doc.undo();
        assert!(doc.can_redo());
        doc.push_undo();
        assert!(!doc.can_redo());
    }

    #[test]
    fn test_undo_history_bounded() {
        let mut doc = BoardDocument::new();
        doc.set_max_undo(3);
        for i in 0..10 {
            doc.push_undo();
            doc.add_stroke(marker(i as f64));
        }
        let mut undone = 0;
        while doc.undo() {
            undone += 1;
        }
        assert_eq!(undone, 3);
        assert_eq!(doc.strokes().len(), 7);
    }

    #[test]
    fn test_bring_to_front() {
        let mut doc = BoardDocument::new();
        let first = marker(1.0);
        let first_id = first.id();
        doc.add_stroke(first);
        doc.add_stroke(marker(2.0));
        assert_eq!(doc.bring_to_front(0), Some(first_id));
        assert_eq!(doc.strokes().last().map(Stroke::id), Some(first_id));
        assert_eq!(doc.bring_to_front(5), None);
    }

    #[test]
    fn test_note_ids_monotonic() {
        let mut doc = BoardDocument::new();
        let a = doc.allocate_note_id();
        let b = doc.allocate_note_id();
        assert!(b > a);
        doc.insert_note(note(b));
        doc.remove_note(b);
        assert!(doc.allocate_note_id() > b);
    }

    #[test]
    fn test_from_parts_raises_counter() {
        let doc = BoardDocument::from_parts(Vec::new(), vec![note(3), note(9)], 2);
        assert_eq!(doc.next_note_id(), 10);
        let doc = BoardDocument::from_parts(Vec::new(), vec![note(3)], 40);
        assert_eq!(doc.next_note_id(), 40);
    }

    #[test]
    fn test_note_counter_at_limit() {
        let mut doc = BoardDocument::from_parts(Vec::new(), vec![note(1), note(NoteId::MAX)], NoteId::MAX);
        assert_eq!(doc.next_note_id(), NoteId::MAX);
        let id = doc.allocate_note_id();
        assert_eq!(id, 2);
        doc.insert_note(note(id));
        assert_eq!(doc.allocate_note_id(), 3);
    }
}
