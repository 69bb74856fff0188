//! The board aggregate: document, viewport, tool state and gesture routing.

use crate::config::BoardConfig;
use crate::document::BoardDocument;
use crate::gesture::{self, Gesture, MIN_TAPE_LENGTH};
use crate::input::{InputState, PointerEvent};
use crate::notes::{
    FormatCommand, Note, NoteColor, NoteFont, NoteHit, NoteId, NoteManager, NoteMode, NoteSize, NoteStyle,
    NoteTarget, TextSelection, ToolbarMenu,
};
use crate::strokes::{self, InkStroke, InkTool, Stroke, TapeStroke, generate_seed};
use crate::tools::{ToolKind, ToolState};
use crate::viewport::Viewport;
use kurbo::{Point, Size, Vec2};

/// Prompt shown before deleting a note.
pub const DELETE_NOTE_PROMPT: &str = "Are you sure you want to delete this sticky note?";
/// Prompt shown before clearing every stroke.
pub const CLEAR_STROKES_PROMPT: &str = "Clear all drawings?";

/// A persisted part of the board that changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// The stroke list.
    Strokes,
    /// A note was created or modified.
    Note(NoteId),
    NoteRemoved(NoteId),
}

/// The annotation board.
///
/// All mutation goes through pointer events or explicit actions. Each
/// completed mutation queues a [`Change`]; the persistence layer drains them
/// with [`Board::take_changes`].
#[derive(Debug, Clone)]
pub struct Board {
    document: BoardDocument,
    pub viewport: Viewport,
    pub tools: ToolState,
    notes: NoteManager,
    gesture: Gesture,
    input: InputState,
    config: BoardConfig,
    changes: Vec<Change>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

impl Board {
    pub fn new(config: BoardConfig) -> Self {
        Self::with_document(BoardDocument::new(), config)
    }

    /// Wrap a loaded document.
    pub fn with_document(mut document: BoardDocument, config: BoardConfig) -> Self {
        document.set_max_undo(config.max_undo);
        Self {
            document,
            viewport: Viewport::new(config.viewport_size(), config.board_size()),
            tools: ToolState::default(),
            notes: NoteManager::new(config.toolbar_size(), config.toolbar_margin),
            gesture: Gesture::Idle,
            input: InputState::new(),
            config,
            changes: Vec::new(),
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn document(&self) -> &BoardDocument {
        &self.document
    }

    pub fn note_manager(&self) -> &NoteManager {
        &self.notes
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn board_size(&self) -> Size {
        self.viewport.board_size
    }

    fn mark(&mut self, change: Change) {
        if !self.changes.contains(&change) {
            self.changes.push(change);
        }
    }

    /// Drain the queued changes.
    pub fn take_changes(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.changes)
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    fn set_gesture(&mut self, gesture: Gesture) {
        log::debug!("Board gesture: {} -> {}", self.gesture.name(), gesture.name());
        self.gesture = gesture;
    }

    /// Change the board extent. Notes are pulled back inside it.
    pub fn resize_board(&mut self, size: Size) {
        self.viewport.resize_board(size);
        let mut moved = Vec::new();
        for note in self.document.notes_mut().values_mut() {
            let before = note.position();
            note.move_to(before, size);
            if note.position() != before {
                moved.push(note.id());
            }
        }
        for id in moved {
            self.mark(Change::Note(id));
        }
    }

    // --- Tools ---

    /// Activate a tool. Any tool but select drops the note selection.
    /// [`ToolKind::AddNote`] adds a note and falls back to select; the new
    /// note's id is returned.
    pub fn select_tool(&mut self, tool: ToolKind) -> Option<NoteId> {
        self.end_gesture();
        if tool != ToolKind::Select {
            self.deselect_note();
        }
        if tool == ToolKind::AddNote {
            let id = self.add_note();
            self.tools.active = ToolKind::Select;
            return Some(id);
        }
        self.tools.active = tool;
        None
    }

    // --- Pointer input ---

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.input.handle_pointer_event(event);
        match event {
            PointerEvent::Down { position, .. } => self.pointer_down(position),
            PointerEvent::Move { position, .. } => self.pointer_move(position),
            PointerEvent::Up { position, .. } => self.pointer_up(Some(position)),
            PointerEvent::Leave => self.pointer_up(None),
        }
    }

    /// Finish whatever gesture is running as if the pointer were released.
    pub fn end_gesture(&mut self) {
        if !self.gesture.is_idle() {
            self.pointer_up(None);
        }
    }

    fn pointer_down(&mut self, client: Point) {
        if !self.gesture.is_idle() {
            self.pointer_up(None);
        }
        let point = self.viewport.to_board_coords(client);
        if self.notes.toolbar.contains(point) {
            return;
        }
        self.notes.toolbar.close_menus();

        if self.tools.active == ToolKind::Hand {
            self.set_gesture(Gesture::Panning { last_client: client });
            return;
        }

        if let Some(hit) = self.notes.hit_test(self.document.notes(), point) {
            self.press_note(hit, point);
            return;
        }

        self.deselect_note();
        match self.tools.active {
            ToolKind::Select => {
                let buffer = self.config.hit_buffer();
                let Some(index) = strokes::find_stroke_index_at(self.document.strokes(), point, buffer) else {
                    return;
                };
                // Raising a buried stroke is an edit on its own; a stroke
                // already on top only becomes one once it moves.
                let edited = index + 1 < self.document.strokes().len();
                if edited {
                    self.document.push_undo();
                }
                let Some(id) = self.document.bring_to_front(index) else {
                    return;
                };
                let Some(start_bounds) = self.document.strokes().last().map(Stroke::bounds) else {
                    return;
                };
                self.set_gesture(Gesture::DraggingStroke {
                    id,
                    origin: point,
                    start_bounds,
                    applied: Vec2::ZERO,
                    edited,
                });
            }
            ToolKind::Marker | ToolKind::Highlighter | ToolKind::Eraser => {
                let Some(tool) = self.tools.active.ink_tool() else {
                    return;
                };
                let style = self.tools.ink_style(tool);
                let stroke = InkStroke::begin(tool, point, &style);
                let id = stroke.id();
                self.document.push_undo();
                self.document.add_stroke(Stroke::Ink(stroke));
                self.set_gesture(Gesture::Inking { id });
            }
            ToolKind::Tape => self.set_gesture(Gesture::Taping {
                start: point,
                current: point,
                seed: generate_seed(),
            }),
            ToolKind::Hand | ToolKind::AddNote => {}
        }
    }

    fn press_note(&mut self, hit: NoteHit, point: Point) {
        let drawing = self
            .document
            .note(hit.id)
            .is_some_and(|note| note.mode().is_inline_drawing());
        if !drawing && self.tools.active != ToolKind::Select {
            return;
        }
        if !self.notes.is_selected(hit.id) {
            self.deselect_note();
        }

        let board = self.board_size();
        let ink_tool = self.notes.ink_tool;
        let ink_style = self.tools.ink_style(ink_tool).scaled(self.config.note_ink_scale);
        let Some(note) = self.document.notes_mut().get_mut(&hit.id) else {
            return;
        };

        let started = if drawing {
            note.begin_ink(point, ink_tool, &ink_style)
        } else {
            match hit.target {
                NoteTarget::Handle(corner) => {
                    let started = note.begin_resize(corner, point);
                    if started {
                        self.notes.select(note, board.width);
                        self.notes.toolbar.hide();
                    }
                    started
                }
                NoteTarget::Text | NoteTarget::Body => {
                    // A press on focused text moves the caret; the text
                    // editor handles that.
                    let started = note.begin_drag(point);
                    if started {
                        self.notes.select(note, board.width);
                    }
                    started
                }
            }
        };
        if started {
            self.set_gesture(Gesture::Note { id: hit.id });
        }
    }

    fn pointer_move(&mut self, client: Point) {
        let point = self.viewport.to_board_coords(client);
        log::trace!("Pointer move ({:.1}, {:.1}) in {}", point.x, point.y, self.gesture.name());
        let board = self.board_size();
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Inking { id } => {
                if let Some(Stroke::Ink(stroke)) = self.document.stroke_mut(*id) {
                    stroke.extend(point);
                }
            }
            Gesture::Taping { current, .. } => *current = point,
            Gesture::DraggingStroke {
                id,
                origin,
                start_bounds,
                applied,
                edited,
            } => {
                let total = gesture::clamp_translation(point - *origin, *start_bounds, board);
                let step = total - *applied;
                if step == Vec2::ZERO {
                    return;
                }
                if !*edited {
                    self.document.push_undo();
                    *edited = true;
                }
                if let Some(stroke) = self.document.stroke_mut(*id) {
                    stroke.translate(step);
                }
                *applied = total;
            }
            Gesture::Panning { last_client } => {
                let delta = client - *last_client;
                *last_client = client;
                self.viewport.pan(delta);
            }
            Gesture::Note { id } => {
                let id = *id;
                let bounds = self.viewport.board_rect();
                let min_size = self.config.min_note_size;
                let Some(note) = self.document.notes_mut().get_mut(&id) else {
                    return;
                };
                if matches!(note.mode(), NoteMode::Dragging { .. }) {
                    note.drag_to(point, board);
                    self.notes.follow(note, board.width);
                } else if matches!(note.mode(), NoteMode::Resizing { .. }) {
                    note.resize_to(point, min_size, bounds);
                } else {
                    note.extend_ink(point);
                }
            }
        }
    }

    /// Release. `client` is `None` when the pointer left the surface.
    fn pointer_up(&mut self, client: Option<Point>) {
        let gesture = std::mem::take(&mut self.gesture);
        if !gesture.is_idle() {
            log::debug!("Board gesture: {} -> idle", gesture.name());
        }
        match gesture {
            Gesture::Idle | Gesture::Panning { .. } => {}
            Gesture::Inking { .. } | Gesture::DraggingStroke { edited: true, .. } => self.mark(Change::Strokes),
            Gesture::DraggingStroke { edited: false, .. } => {}
            Gesture::Taping { start, current, seed } => {
                let end = client.map_or(current, |c| self.viewport.to_board_coords(c));
                if (end - start).hypot() < MIN_TAPE_LENGTH {
                    return;
                }
                let tape = TapeStroke::with_seed(
                    start,
                    end,
                    self.tools.tape_pattern,
                    self.tools.tape_color,
                    self.tools.tape_width,
                    seed,
                );
                self.document.push_undo();
                self.document.add_stroke(Stroke::Tape(tape));
                self.mark(Change::Strokes);
            }
            Gesture::Note { id } => {
                let is_click = self.input.is_click();
                let board_width = self.board_size().width;
                let Some(note) = self.document.notes_mut().get_mut(&id) else {
                    return;
                };
                let persist = note.finish_gesture(is_click);
                if self.notes.is_selected(id) {
                    self.notes.follow(note, board_width);
                    self.notes.toolbar.show();
                }
                if persist {
                    self.mark(Change::Note(id));
                }
            }
        }
    }

    // --- Strokes ---

    pub fn strokes(&self) -> &[Stroke] {
        self.document.strokes()
    }

    /// Top-most draggable stroke under a board point.
    pub fn find_stroke_at(&self, point: Point) -> Option<&Stroke> {
        strokes::find_stroke_at(self.document.strokes(), point, self.config.hit_buffer())
    }

    /// The tape segment being stretched, for preview rendering.
    pub fn preview_tape(&self) -> Option<TapeStroke> {
        match self.gesture {
            Gesture::Taping { start, current, seed } => Some(TapeStroke::with_seed(
                start,
                current,
                self.tools.tape_pattern,
                self.tools.tape_color,
                self.tools.tape_width,
                seed,
            )),
            _ => None,
        }
    }

    /// Remove every stroke once `confirm` accepts the prompt.
    pub fn clear_strokes(&mut self, confirm: impl FnOnce(&str) -> bool) -> bool {
        if self.document.strokes().is_empty() || !confirm(CLEAR_STROKES_PROMPT) {
            return false;
        }
        self.end_gesture();
        self.document.push_undo();
        self.document.clear_strokes();
        self.mark(Change::Strokes);
        log::info!("Cleared all strokes");
        true
    }

    pub fn undo(&mut self) -> bool {
        self.end_gesture();
        let undone = self.document.undo();
        if undone {
            self.mark(Change::Strokes);
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        self.end_gesture();
        let redone = self.document.redo();
        if redone {
            self.mark(Change::Strokes);
        }
        redone
    }

    // --- Notes ---

    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.document.note(id)
    }

    /// Every note, sorted by id.
    pub fn list_notes(&self) -> Vec<&Note> {
        self.document.notes().values().collect()
    }

    /// Notes bottom to top, selected note last.
    pub fn notes_in_paint_order(&self) -> Vec<&Note> {
        self.notes
            .paint_order(self.document.notes())
            .into_iter()
            .filter_map(|id| self.document.note(id))
            .collect()
    }

    pub fn selected_note(&self) -> Option<&Note> {
        self.notes.selected().and_then(|id| self.document.note(id))
    }

    /// Add a note in the active note colour, centred in the viewport.
    pub fn add_note(&mut self) -> NoteId {
        self.create_note(NoteStyle::with_color(self.tools.note_color))
    }

    /// Create a default-sized note centred in the viewport.
    pub fn create_note(&mut self, style: NoteStyle) -> NoteId {
        let size = self.config.default_note_size();
        let center = self.viewport.center();
        let position = Point::new(center.x - size.width / 2.0, center.y - size.height / 2.0);
        self.create_note_at(position, style)
    }

    /// Create a default-sized note with its top-left at `position`, clamped
    /// into the board.
    pub fn create_note_at(&mut self, position: Point, style: NoteStyle) -> NoteId {
        let id = self.document.allocate_note_id();
        let mut note = Note::new(id, Point::ZERO, self.config.default_note_size(), style);
        note.move_to(position, self.board_size());
        log::info!("Created note {} at ({:.0}, {:.0})", id, note.position().x, note.position().y);
        self.document.insert_note(note);
        self.mark(Change::Note(id));
        id
    }

    /// Delete a note once `confirm` accepts the prompt. The toolbar goes
    /// with it if bound to this note.
    pub fn delete_note(&mut self, id: NoteId, confirm: impl FnOnce(&str) -> bool) -> bool {
        if self.document.note(id).is_none() || !confirm(DELETE_NOTE_PROMPT) {
            return false;
        }
        if self.notes.is_selected(id) {
            self.notes.deselect();
        }
        if self.gesture == (Gesture::Note { id }) {
            self.gesture = Gesture::Idle;
        }
        self.document.remove_note(id);
        self.mark(Change::NoteRemoved(id));
        log::info!("Deleted note {}", id);
        true
    }

    /// Select a note and show the toolbar over it.
    pub fn select_note(&mut self, id: NoteId) -> bool {
        if !self.notes.is_selected(id) {
            self.deselect_note();
        }
        let board_width = self.board_size().width;
        match self.document.note(id) {
            Some(note) => {
                self.notes.select(note, board_width);
                true
            }
            None => false,
        }
    }

    /// Drop the selection, committing the note's pending work.
    pub fn deselect_note(&mut self) {
        let Some(id) = self.notes.deselect() else {
            return;
        };
        let persist = self
            .document
            .notes_mut()
            .get_mut(&id)
            .is_some_and(|note| note.blur());
        if persist {
            self.mark(Change::Note(id));
        }
    }

    /// Run `edit` on the selected note, queueing a change when it reports
    /// one.
    fn edit_selected(&mut self, edit: impl FnOnce(&mut Note) -> bool) -> bool {
        let Some(id) = self.notes.selected() else {
            return false;
        };
        let Some(note) = self.document.notes_mut().get_mut(&id) else {
            return false;
        };
        let changed = edit(note);
        if changed {
            self.mark(Change::Note(id));
        }
        changed
    }

    /// Toggle inline drawing on the selected note. Turning it off commits
    /// the drawing.
    pub fn toggle_note_drawing(&mut self) -> bool {
        let Some(id) = self.notes.selected() else {
            return false;
        };
        let Some(note) = self.document.notes_mut().get_mut(&id) else {
            return false;
        };
        let enable = !note.mode().is_inline_drawing();
        let toggled = note.set_inline_drawing(enable);
        if toggled && !enable {
            self.mark(Change::Note(id));
        }
        toggled
    }

    /// Whether the selected note is in inline-drawing mode.
    pub fn is_note_drawing(&self) -> bool {
        self.selected_note().is_some_and(|note| note.mode().is_inline_drawing())
    }

    pub fn set_note_ink_tool(&mut self, tool: InkTool) {
        self.notes.ink_tool = tool;
    }

    pub fn set_note_color(&mut self, color: NoteColor) -> bool {
        self.notes.toolbar.close_menus();
        self.edit_selected(|note| {
            let changed = note.style.color != color;
            note.style.color = color;
            changed
        })
    }

    pub fn set_note_font(&mut self, font: NoteFont) -> bool {
        self.notes.toolbar.close_menus();
        self.edit_selected(|note| {
            let changed = note.style.font != font;
            note.style.font = font;
            changed
        })
    }

    pub fn set_note_size(&mut self, size: NoteSize) -> bool {
        self.notes.toolbar.close_menus();
        self.edit_selected(|note| {
            let changed = note.style.size != size;
            note.style.size = size;
            changed
        })
    }

    /// Wipe the selected note's drawing layer.
    pub fn clear_note_drawing(&mut self) -> bool {
        self.edit_selected(|note| {
            if note.sub_drawing.is_blank() {
                return false;
            }
            note.sub_drawing.clear();
            true
        })
    }

    pub fn set_note_title(&mut self, title: &str) -> bool {
        self.edit_selected(|note| {
            let changed = note.title != title;
            note.title = title.to_string();
            changed
        })
    }

    pub fn toggle_toolbar_menu(&mut self, menu: ToolbarMenu) {
        if self.notes.toolbar.is_visible() {
            self.notes.toolbar.toggle_menu(menu);
        }
    }

    /// Focus the selected note's text with `selection`, clamped to the
    /// content.
    pub fn set_text_selection(&mut self, selection: TextSelection) -> bool {
        let Some(id) = self.notes.selected() else {
            return false;
        };
        let Some(note) = self.document.notes_mut().get_mut(&id) else {
            return false;
        };
        let len = note.content.char_len();
        let selection = TextSelection::new(selection.anchor.min(len), selection.focus.min(len));
        note.begin_text_editing(selection)
    }

    /// Apply a formatting command to the selected note's text selection.
    /// Focuses the text with the caret at the end if it is not focused.
    pub fn apply_format(&mut self, command: FormatCommand) -> bool {
        self.edit_selected(|note| {
            let Some(selection) = focus_text(note) else {
                return false;
            };
            note.content.apply(command, selection);
            true
        })
    }

    /// Replace the selected note's text selection with `text`.
    pub fn insert_text(&mut self, text: &str) -> bool {
        self.edit_selected(|note| {
            let Some(selection) = focus_text(note) else {
                return false;
            };
            let caret = note.content.insert_text(selection, text);
            note.set_text_selection(caret);
            true
        })
    }

    /// Insert the author's name at the caret.
    pub fn insert_author_stamp(&mut self, author: &str) -> bool {
        self.insert_text(&format!("{author} "))
    }

    /// Drop focus from the selected note's text or drawing, keeping it
    /// selected.
    pub fn blur_note(&mut self) -> bool {
        self.edit_selected(Note::blur)
    }
}

/// Current selection, entering text editing with the caret at the end if
/// needed. `None` while the note is inline drawing.
fn focus_text(note: &mut Note) -> Option<TextSelection> {
    if let Some(selection) = note.text_selection() {
        return Some(selection);
    }
    let caret = TextSelection::caret(note.content.char_len());
    note.begin_text_editing(caret).then_some(caret)
}
