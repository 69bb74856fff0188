//! Note cards: movable, resizable entities with rich text and a private
//! drawing layer.
//!
//! - [`Note`] holds the persisted data plus its interaction [`NoteMode`].
//! - [`NoteManager`] tracks the selection and the single
//!   [`FloatingToolbar`].
//! - The board routes pointer gestures into these types.

mod content;
mod handles;
mod manager;
mod note;
mod state;
mod sub_drawing;
mod toolbar;

pub use content::{Block, BlockKind, DEFAULT_NOTE_TEXT, FormatCommand, RichText, Span, TextSelection};
pub use handles::{Corner, HANDLE_SIZE, Handle, handles_for, hit_test_handle, resize_rect};
pub use manager::{NoteHit, NoteManager, NoteTarget};
pub use note::{DEFAULT_NOTE_TITLE, Note, NoteColor, NoteFont, NoteId, NoteSize, NoteStyle};
pub use state::NoteMode;
pub use sub_drawing::{SubDrawing, SubDrawingError};
pub use toolbar::{FloatingToolbar, ToolbarMenu};

pub(crate) use note::pixel_len;
