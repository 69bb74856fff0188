//! The floating contextual toolbar bound to the selected note.

use super::note::NoteId;
use kurbo::{Point, Rect, Size};

/// Dropdown menus on the toolbar. At most one is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolbarMenu {
    Color,
    Font,
    Size,
}

/// A single toolbar instance, shown above whichever note is selected.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingToolbar {
    note: Option<NoteId>,
    visible: bool,
    position: Point,
    size: Size,
    margin: f64,
    open_menu: Option<ToolbarMenu>,
}

impl FloatingToolbar {
    pub fn new(size: Size, margin: f64) -> Self {
        Self {
            note: None,
            visible: false,
            position: Point::ZERO,
            size,
            margin,
            open_menu: None,
        }
    }

    /// The note the toolbar is bound to.
    pub fn note(&self) -> Option<NoteId> {
        self.note
    }

    pub fn is_visible(&self) -> bool {
        self.visible && self.note.is_some()
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn open_menu(&self) -> Option<ToolbarMenu> {
        self.open_menu
    }

    /// Screen area of the toolbar when shown.
    pub fn rect(&self) -> Option<Rect> {
        self.is_visible()
            .then(|| Rect::from_origin_size(self.position, self.size))
    }

    pub fn contains(&self, point: Point) -> bool {
        self.rect().is_some_and(|r| r.contains(point))
    }

    /// Bind to a note and show above it.
    pub fn attach(&mut self, note: NoteId, note_rect: Rect, board_width: f64) {
        if self.note != Some(note) {
            self.open_menu = None;
        }
        self.note = Some(note);
        self.visible = true;
        self.place_above(note_rect, board_width);
    }

    /// Unbind and hide.
    pub fn detach(&mut self) {
        self.note = None;
        self.visible = false;
        self.open_menu = None;
    }

    /// Hide without unbinding, e.g. while the note is being resized.
    pub fn hide(&mut self) {
        self.visible = false;
        self.open_menu = None;
    }

    pub fn show(&mut self) {
        self.visible = self.note.is_some();
    }

    /// Center above the note, `margin` away. The top is clamped to the
    /// board edge; the left stays `margin` inside both board edges.
    pub fn place_above(&mut self, note_rect: Rect, board_width: f64) {
        let top = (note_rect.y0 - self.size.height - self.margin).max(0.0);
        let left = (note_rect.center().x - self.size.width / 2.0)
            .max(self.margin)
            .min(board_width - self.size.width - self.margin);
        self.position = Point::new(left, top);
    }

    /// Open `menu`, or close it if it is already open.
    pub fn toggle_menu(&mut self, menu: ToolbarMenu) {
        self.open_menu = if self.open_menu == Some(menu) { None } else { Some(menu) };
    }

    pub fn close_menus(&mut self) {
        self.open_menu = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toolbar() -> FloatingToolbar {
        FloatingToolbar::new(Size::new(320.0, 44.0), 10.0)
    }

    #[test]
    fn test_centered_above_note() {
        let mut toolbar = toolbar();
        toolbar.attach(1, Rect::new(500.0, 300.0, 750.0, 550.0), 3000.0);
        assert_eq!(toolbar.position(), Point::new(465.0, 246.0));
        assert!(toolbar.is_visible());
    }

    #[test]
    fn test_clamped_to_board() {
        let mut toolbar = toolbar();
        toolbar.attach(1, Rect::new(0.0, 20.0, 250.0, 270.0), 3000.0);
        assert_eq!(toolbar.position(), Point::new(10.0, 0.0));

        toolbar.place_above(Rect::new(2750.0, 500.0, 3000.0, 750.0), 3000.0);
        assert_eq!(toolbar.position().x, 3000.0 - 320.0 - 10.0);
    }

    #[test]
    fn test_menu_toggle_and_reset() {
        let mut toolbar = toolbar();
        toolbar.attach(1, Rect::new(500.0, 300.0, 750.0, 550.0), 3000.0);
        toolbar.toggle_menu(ToolbarMenu::Font);
        assert_eq!(toolbar.open_menu(), Some(ToolbarMenu::Font));
        toolbar.toggle_menu(ToolbarMenu::Color);
        assert_eq!(toolbar.open_menu(), Some(ToolbarMenu::Color));
        toolbar.toggle_menu(ToolbarMenu::Color);
        assert_eq!(toolbar.open_menu(), None);

        toolbar.toggle_menu(ToolbarMenu::Size);
        toolbar.attach(2, Rect::new(0.0, 300.0, 250.0, 550.0), 3000.0);
        assert_eq!(toolbar.open_menu(), None);
    }

    #[test]
    fn test_hidden_toolbar_has_no_rect() {
        let mut toolbar = toolbar();
        assert!(toolbar.rect().is_none());
        toolbar.attach(1, Rect::new(500.0, 300.0, 750.0, 550.0), 3000.0);
        toolbar.hide();
        assert!(!toolbar.contains(Point::new(470.0, 250.0)));
        toolbar.show();
        assert!(toolbar.contains(Point::new(470.0, 250.0)));
        toolbar.detach();
        toolbar.show();
        assert!(!toolbar.is_visible());
    }
}
