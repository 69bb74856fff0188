//! Corkboard Core Library
//!
//! Platform-agnostic model for the Corkboard annotation board: strokes,
//! tape, notes, tool state, gesture handling and persistence.

pub mod board;
pub mod config;
pub mod document;
pub mod gesture;
pub mod input;
pub mod notes;
pub mod raster;
pub mod storage;
pub mod strokes;
pub mod tools;
pub mod viewport;

pub use board::{Board, CLEAR_STROKES_PROMPT, Change, DELETE_NOTE_PROMPT};
pub use config::{BoardConfig, ConfigError};
pub use document::{BoardDocument, MAX_UNDO_HISTORY};
pub use gesture::{Gesture, MIN_TAPE_LENGTH};
pub use input::{CLICK_DISTANCE, InputState, PointerEvent, PointerKind};
pub use notes::{Note, NoteColor, NoteFont, NoteId, NoteManager, NoteMode, NoteSize, NoteStyle, RichText};
pub use raster::{CompositeOp, Surface};
pub use strokes::{
    Bounds, HitBuffer, InkStroke, InkStyle, InkTool, SerializableColor, Stroke, StrokeId, TapePattern, TapeStroke,
    find_stroke_at,
};
pub use tools::{ToolKind, ToolState};
pub use viewport::Viewport;
