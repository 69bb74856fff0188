//! Note selection and hit testing.

use super::handles::Corner;
use super::note::{Note, NoteId};
use super::toolbar::FloatingToolbar;
use crate::strokes::InkTool;
use kurbo::{Point, Size};
use std::collections::BTreeMap;

/// Which part of a note a point landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteTarget {
    Handle(Corner),
    Text,
    Body,
}

/// A note hit with the part that was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteHit {
    pub id: NoteId,
    pub target: NoteTarget,
}

/// Tracks which note is selected and owns the floating toolbar.
///
/// Note data lives on the board document; this only holds the UI state
/// that sits across notes.
#[derive(Debug, Clone)]
pub struct NoteManager {
    selected: Option<NoteId>,
    pub toolbar: FloatingToolbar,
    /// Tool used when drawing inline on a note.
    pub ink_tool: InkTool,
}

impl NoteManager {
    pub fn new(toolbar_size: Size, toolbar_margin: f64) -> Self {
        Self {
            selected: None,
            toolbar: FloatingToolbar::new(toolbar_size, toolbar_margin),
            ink_tool: InkTool::Marker,
        }
    }

    pub fn selected(&self) -> Option<NoteId> {
        self.selected
    }

    pub fn is_selected(&self, id: NoteId) -> bool {
        self.selected == Some(id)
    }

    /// Select a note and show the toolbar above it.
    pub fn select(&mut self, note: &Note, board_width: f64) {
        self.selected = Some(note.id());
        self.toolbar.attach(note.id(), note.rect(), board_width);
    }

    /// Clear the selection and hide the toolbar. Returns the previous
    /// selection.
    pub fn deselect(&mut self) -> Option<NoteId> {
        self.toolbar.detach();
        self.selected.take()
    }

    /// Reposition the toolbar if it is bound to `note`.
    pub fn follow(&mut self, note: &Note, board_width: f64) {
        if self.toolbar.note() == Some(note.id()) {
            self.toolbar.place_above(note.rect(), board_width);
        }
    }

    /// Ids in paint order: ascending id, selected note last (on top).
    pub fn paint_order(&self, notes: &BTreeMap<NoteId, Note>) -> Vec<NoteId> {
        let mut order: Vec<NoteId> = notes.keys().copied().filter(|id| !self.is_selected(*id)).collect();
        if let Some(id) = self.selected.filter(|id| notes.contains_key(id)) {
            order.push(id);
        }
        order
    }

    /// Top-most note under `point`. Corner handles are only offered for
    /// notes not in inline-drawing mode; they may lie slightly outside the
    /// note rect.
    pub fn hit_test(&self, notes: &BTreeMap<NoteId, Note>, point: Point) -> Option<NoteHit> {
        for id in self.paint_order(notes).into_iter().rev() {
            let Some(note) = notes.get(&id) else {
                continue;
            };
            if !note.mode().is_inline_drawing() {
                if let Some(corner) = note.handle_at(point) {
                    return Some(NoteHit {
                        id,
                        target: NoteTarget::Handle(corner),
                    });
                }
            }
            if note.contains(point) {
                let target = if note.text_rect().contains(point) {
                    NoteTarget::Text
                } else {
                    NoteTarget::Body
                };
                return Some(NoteHit { id, target });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::NoteStyle;

    fn notes() -> BTreeMap<NoteId, Note> {
        let mut notes = BTreeMap::new();
        for (id, x) in [(1, 100.0), (2, 200.0)] {
            notes.insert(id, Note::new(id, Point::new(x, 100.0), Size::new(250.0, 250.0), NoteStyle::default()));
        }
        notes
    }

    #[test]
    fn test_highest_id_on_top() {
        let manager = NoteManager::new(Size::new(320.0, 44.0), 10.0);
        let hit = manager.hit_test(&notes(), Point::new(300.0, 200.0)).unwrap();
        assert_eq!(hit.id, 2);
        assert_eq!(hit.target, NoteTarget::Text);
    }

    #[test]
    fn test_selected_on_top() {
        let notes = notes();
        let mut manager = NoteManager::new(Size::new(320.0, 44.0), 10.0);
        manager.select(&notes[&1], 3000.0);
        assert_eq!(manager.paint_order(&notes), vec![2, 1]);
        let hit = manager.hit_test(&notes, Point::new(300.0, 200.0)).unwrap();
        assert_eq!(hit.id, 1);
        assert!(manager.toolbar.is_visible());
    }

    #[test]
    fn test_handle_and_body_targets() {
        let manager = NoteManager::new(Size::new(320.0, 44.0), 10.0);
        let notes = notes();
        let hit = manager.hit_test(&notes, Point::new(452.0, 351.0)).unwrap();
        assert_eq!(hit.target, NoteTarget::Handle(Corner::BottomRight));
        let hit = manager.hit_test(&notes, Point::new(300.0, 110.0)).unwrap();
        assert_eq!(hit.target, NoteTarget::Body);
        assert!(manager.hit_test(&notes, Point::new(900.0, 900.0)).is_none());
    }

    #[test]
    fn test_no_handles_while_drawing() {
        let mut notes = notes();
        notes.get_mut(&2).unwrap().set_inline_drawing(true);
        let manager = NoteManager::new(Size::new(320.0, 44.0), 10.0);
        let hit = manager.hit_test(&notes, Point::new(449.0, 349.0)).unwrap();
        assert_eq!(hit, NoteHit { id: 2, target: NoteTarget::Body });
    }

    #[test]
    fn test_deselect_hides_toolbar() {
        let notes = notes();
        let mut manager = NoteManager::new(Size::new(320.0, 44.0), 10.0);
        manager.select(&notes[&2], 3000.0);
        assert_eq!(manager.deselect(), Some(2));
        assert!(!manager.toolbar.is_visible());
        assert_eq!(manager.selected(), None);
    }
}
