//! Note entity and its style attributes.

use super::content::{DEFAULT_NOTE_TEXT, RichText};
use super::handles::{self, Corner};
use super::state::NoteMode;
use super::sub_drawing::SubDrawing;
use crate::strokes::SerializableColor;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Unique, monotonically assigned note identifier.
pub type NoteId = u64;

/// Default title for a fresh note.
pub const DEFAULT_NOTE_TITLE: &str = "New Sticky Note";

/// Inset between the note edge and its text region.
pub const TEXT_INSET: f64 = 12.0;

/// Height of the title strip above the text region.
pub const HEADER_HEIGHT: f64 = 28.0;

/// Note background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteColor {
    White,
    #[default]
    Yellow,
    Blue,
    Green,
    Pink,
    Purple,
}

impl NoteColor {
    pub const ALL: [NoteColor; 6] = [
        NoteColor::White,
        NoteColor::Yellow,
        NoteColor::Blue,
        NoteColor::Green,
        NoteColor::Pink,
        NoteColor::Purple,
    ];

    pub fn to_color(&self) -> SerializableColor {
        match self {
            NoteColor::White => SerializableColor::new(0xff, 0xff, 0xff, 255),
            NoteColor::Yellow => SerializableColor::new(0xff, 0xf9, 0xb0, 255),
            NoteColor::Blue => SerializableColor::new(0xa0, 0xd9, 0xff, 255),
            NoteColor::Green => SerializableColor::new(0xba, 0xff, 0xc9, 255),
            NoteColor::Pink => SerializableColor::new(0xff, 0xb3, 0xba, 255),
            NoteColor::Purple => SerializableColor::new(0xe0, 0xb5, 0xff, 255),
        }
    }
}

/// Note body font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteFont {
    #[default]
    Inter,
    Roboto,
    Marker,
}

impl NoteFont {
    pub fn family(&self) -> &'static str {
        match self {
            NoteFont::Inter => "Inter",
            NoteFont::Roboto => "Roboto",
            NoteFont::Marker => "Permanent Marker",
        }
    }
}

/// Note text size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoteSize {
    Small,
    #[default]
    Medium,
    Large,
    XLarge,
}

impl NoteSize {
    pub fn font_px(&self) -> f64 {
        match self {
            NoteSize::Small => 12.0,
            NoteSize::Medium => 16.0,
            NoteSize::Large => 20.0,
            NoteSize::XLarge => 24.0,
        }
    }
}

/// Enumerated style attributes of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NoteStyle {
    pub color: NoteColor,
    pub font: NoteFont,
    pub size: NoteSize,
}

impl NoteStyle {
    pub fn with_color(color: NoteColor) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }
}

/// A movable, resizable card on the board.
#[derive(Debug, Clone)]
pub struct Note {
    pub(crate) id: NoteId,
    position: Point,
    size: Size,
    pub title: String,
    pub content: RichText,
    pub style: NoteStyle,
    pub(crate) sub_drawing: SubDrawing,
    pub(crate) mode: NoteMode,
}

impl Note {
    /// New note with default title and content and a blank drawing.
    pub fn new(id: NoteId, position: Point, size: Size, style: NoteStyle) -> Self {
        Self {
            id,
            position,
            size,
            title: DEFAULT_NOTE_TITLE.to_string(),
            content: RichText::from_plain(DEFAULT_NOTE_TEXT),
            style,
            sub_drawing: SubDrawing::new(pixel_len(size.width), pixel_len(size.height)),
            mode: NoteMode::Idle,
        }
    }

    pub fn id(&self) -> NoteId {
        self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Editable text area below the title strip.
    pub fn text_rect(&self) -> Rect {
        let rect = self.rect().inset(-TEXT_INSET);
        Rect::new(rect.x0, (rect.y0 + HEADER_HEIGHT).min(rect.y1), rect.x1, rect.y1)
    }

    pub fn contains(&self, point: Point) -> bool {
        self.rect().contains(point)
    }

    /// Corner handle under `point`, if any.
    pub fn handle_at(&self, point: Point) -> Option<Corner> {
        handles::hit_test_handle(self.rect(), point)
    }

    pub fn sub_drawing(&self) -> &SubDrawing {
        &self.sub_drawing
    }

    pub fn mode(&self) -> &NoteMode {
        &self.mode
    }

    /// Board point to note-local pixel space.
    pub fn to_local(&self, point: Point) -> Point {
        point - self.position.to_vec2()
    }

    /// Place the note at `position`, clamped to `[0, board − size]`.
    pub fn move_to(&mut self, position: Point, board: Size) {
        self.position = clamp_position(position, self.size, board);
    }

    pub fn move_by(&mut self, delta: Vec2, board: Size) {
        self.move_to(self.position + delta, board);
    }

    /// Adopt a new rectangle without touching the drawing. The renderer
    /// stretches the drawing to the rect until [`Note::fit_drawing`].
    pub(crate) fn set_rect(&mut self, rect: Rect) {
        self.position = rect.origin();
        self.size = rect.size();
    }

    /// Resample the drawing to the current size.
    pub(crate) fn fit_drawing(&mut self) {
        let (w, h) = (pixel_len(self.size.width), pixel_len(self.size.height));
        if w != self.sub_drawing.width() || h != self.sub_drawing.height() {
            self.sub_drawing = self.sub_drawing.resized(w, h);
        }
    }

    /// Rebuild from persisted geometry, enforcing the size floor and board
    /// extent.
    pub(crate) fn restore(id: NoteId, rect: Rect, style: NoteStyle, min_size: f64, board: Size) -> Self {
        let size = Size::new(
            rect.width().max(min_size).min(board.width.max(min_size)),
            rect.height().max(min_size).min(board.height.max(min_size)),
        );
        let mut note = Self::new(id, Point::ZERO, size, style);
        note.move_to(rect.origin(), board);
        note
    }

    /// Adopt a decoded drawing, stretched to the note size.
    pub(crate) fn set_drawing(&mut self, drawing: SubDrawing) {
        self.sub_drawing = drawing;
        self.fit_drawing();
    }
}

/// Raster size for a board length.
pub(crate) fn pixel_len(len: f64) -> u32 {
    if len.is_finite() { len.round().max(1.0) as u32 } else { 1 }
}

fn clamp_position(position: Point, size: Size, board: Size) -> Point {
    Point::new(
        position.x.min(board.width - size.width).max(0.0),
        position.y.min(board.height - size.height).max(0.0),
    )
}
