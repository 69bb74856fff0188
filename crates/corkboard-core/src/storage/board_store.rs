//! Board persistence over a key/value [`Storage`] backend.

use super::records::{notes_to_json, parse_notes, parse_strokes, strokes_to_json};
use super::{Storage, StorageError, StorageResult};
use crate::board::{Board, Change};
use crate::config::BoardConfig;
use crate::document::BoardDocument;
use crate::notes::{Note, NoteId};
use crate::strokes::Stroke;
use std::sync::Arc;

/// Key holding the stroke list.
pub const STROKES_KEY: &str = "annotationStrokes";
/// Key holding the note list.
pub const NOTES_KEY: &str = "stickyNotes";
/// Key holding the next note id.
pub const NOTE_COUNTER_KEY: &str = "stickyNoteIdCounter";

/// Saves and restores a board.
///
/// Strokes and notes are independent collections, each written whole
/// under its own key.
pub struct BoardStore<S: Storage> {
    storage: Arc<S>,
}

impl<S: Storage> BoardStore<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    pub async fn save_strokes(&self, strokes: &[Stroke]) -> StorageResult<()> {
        let json = strokes_to_json(strokes)?;
        self.storage.save(STROKES_KEY, &json).await?;
        log::debug!("Saved {} strokes", strokes.len());
        Ok(())
    }

    /// Save the note list and the id counter.
    pub async fn save_notes<'a>(
        &self,
        notes: impl IntoIterator<Item = &'a Note>,
        next_note_id: NoteId,
    ) -> StorageResult<()> {
        let json = notes_to_json(notes)?;
        self.storage.save(NOTES_KEY, &json).await?;
        self.storage.save(NOTE_COUNTER_KEY, &next_note_id.to_string()).await?;
        log::debug!("Saved notes, next id {}", next_note_id);
        Ok(())
    }

    /// Save everything.
    pub async fn save(&self, board: &Board) -> StorageResult<()> {
        let document = board.document();
        self.save_strokes(document.strokes()).await?;
        self.save_notes(document.notes().values(), document.next_note_id()).await
    }

    /// Write the collections touched since the last call. Returns false
    /// when there was nothing to write. The board's change queue is drained
    /// either way.
    pub async fn persist(&self, board: &mut Board) -> StorageResult<bool> {
        let changes = board.take_changes();
        if changes.is_empty() {
            return Ok(false);
        }
        let document = board.document();
        if changes.contains(&Change::Strokes) {
            self.save_strokes(document.strokes()).await?;
        }
        if changes.iter().any(|c| matches!(c, Change::Note(_) | Change::NoteRemoved(_))) {
            self.save_notes(document.notes().values(), document.next_note_id()).await?;
        }
        Ok(true)
    }

    /// Load a value, treating a missing key as absent.
    async fn load_optional(&self, key: &str) -> StorageResult<Option<String>> {
        match self.storage.load(key).await {
            Ok(value) => Ok(Some(value)),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Load the document. Missing keys give an empty board; malformed
    /// records are migrated or skipped.
    pub async fn load_document(&self, config: &BoardConfig) -> StorageResult<BoardDocument> {
        let strokes = self
            .load_optional(STROKES_KEY)
            .await?
            .map(|json| parse_strokes(&json))
            .unwrap_or_default();

        let mut next_id = self
            .load_optional(NOTE_COUNTER_KEY)
            .await?
            .and_then(|value| value.trim().trim_matches('"').parse::<NoteId>().ok())
            .unwrap_or(1);
        let notes = self
            .load_optional(NOTES_KEY)
            .await?
            .map(|json| parse_notes(&json, &mut next_id, config))
            .unwrap_or_default();

        log::debug!("Loaded {} strokes and {} notes", strokes.len(), notes.len());
        Ok(BoardDocument::from_parts(strokes, notes, next_id))
    }

    /// Load a board ready for interaction.
    pub async fn load(&self, config: BoardConfig) -> StorageResult<Board> {
        let document = self.load_document(&config).await?;
        Ok(Board::with_document(document, config))
    }
}

/// Create a store over file storage in the default location.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_store() -> StorageResult<BoardStore<super::FileStorage>> {
    Ok(BoardStore::new(Arc::new(super::FileStorage::default_location()?)))
}
