//! Persisted record formats for strokes and notes, with migration of
//! older layouts.

use crate::config::BoardConfig;
use crate::document::successor;
use crate::notes::{Note, NoteColor, NoteFont, NoteId, NoteSize, NoteStyle, RichText, SubDrawing};
use crate::storage::{StorageError, StorageResult};
use crate::strokes::{
    Bounds, InkStroke, InkStyle, InkTool, SerializableColor, Stroke, StrokeId, TapePattern, TapeStroke,
};
use kurbo::{Point, Rect, Size};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Deserialize a value, falling back to its default when it does not
/// parse. Unknown enum names in old records must not drop the record.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value.clone()).unwrap_or_else(|_| {
        log::warn!("Unrecognised value {}, using default", value);
        T::default()
    }))
}

fn default_tape_color() -> SerializableColor {
    TapeStroke::DEFAULT_COLOR
}

/// Fields shared by marker, highlighter and eraser records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InkRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<StrokeId>,
    #[serde(default)]
    pub color: SerializableColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default)]
    pub points: Vec<Point>,
    /// Absent in records written before bounds were cached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TapeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<StrokeId>,
    pub start: Point,
    pub end: Point,
    #[serde(default, deserialize_with = "lenient")]
    pub pattern: TapePattern,
    #[serde(default = "default_tape_color")]
    pub color: SerializableColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Torn-edge seed. Derived from the endpoints when missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
}

/// A persisted stroke, tagged by `tool`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "lowercase")]
pub enum StrokeRecord {
    Marker(InkRecord),
    #[serde(alias = "highlight")]
    Highlighter(InkRecord),
    Eraser(InkRecord),
    Tape(TapeRecord),
}

impl StrokeRecord {
    pub fn from_stroke(stroke: &Stroke) -> Self {
        match stroke {
            Stroke::Ink(ink) => {
                let record = InkRecord {
                    id: Some(ink.id()),
                    color: ink.color,
                    width: Some(ink.width),
                    opacity: Some(ink.opacity),
                    points: ink.points().to_vec(),
                    bounds: Some(ink.bounds()),
                };
                match ink.tool {
                    InkTool::Marker => StrokeRecord::Marker(record),
                    InkTool::Highlighter => StrokeRecord::Highlighter(record),
                    InkTool::Eraser => StrokeRecord::Eraser(record),
                }
            }
            Stroke::Tape(tape) => StrokeRecord::Tape(TapeRecord {
                id: Some(tape.id()),
                start: tape.start(),
                end: tape.end(),
                pattern: tape.pattern,
                color: tape.color,
                width: Some(tape.width),
                seed: Some(tape.seed),
                bounds: Some(tape.bounds()),
            }),
        }
    }

    /// Rebuild the stroke, filling in anything an older record lacks.
    /// Returns `None` for an ink record with no points.
    pub fn into_stroke(self) -> Option<Stroke> {
        let (tool, record) = match self {
            StrokeRecord::Marker(r) => (InkTool::Marker, r),
            StrokeRecord::Highlighter(r) => (InkTool::Highlighter, r),
            StrokeRecord::Eraser(r) => (InkTool::Eraser, r),
            StrokeRecord::Tape(r) => return Some(Stroke::Tape(tape_from_record(r))),
        };
        if record.bounds.is_none() {
            log::debug!("Deriving bounds for {} stroke from {} points", tool.name(), record.points.len());
        }
        let style = InkStyle {
            color: record.color,
            width: record.width.filter(|w| w.is_finite() && *w > 0.0).unwrap_or(tool.default_width()),
            opacity: record.opacity.filter(|o| o.is_finite()).unwrap_or(tool.default_opacity()),
        };
        let id = record.id.unwrap_or_else(Uuid::new_v4);
        InkStroke::from_parts(id, tool, &style, record.points, record.bounds).map(Stroke::Ink)
    }
}

fn tape_from_record(record: TapeRecord) -> TapeStroke {
    let seed = record.seed.unwrap_or_else(|| {
        log::debug!("Deriving torn-edge seed for tape stroke");
        TapeStroke::derive_seed(record.start, record.end)
    });
    let width = record
        .width
        .filter(|w| w.is_finite() && *w > 0.0)
        .unwrap_or(TapeStroke::DEFAULT_WIDTH);
    TapeStroke::from_parts(
        record.id.unwrap_or_else(Uuid::new_v4),
        record.start,
        record.end,
        record.pattern,
        record.color,
        width,
        seed,
    )
}

/// Parse a persisted stroke list. Records that cannot be understood are
/// skipped with a warning; a value that is not a list yields no strokes.
pub fn parse_strokes(json: &str) -> Vec<Stroke> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(json) {
        Ok(values) => values,
        Err(e) => {
            log::warn!("Ignoring unreadable stroke list: {}", e);
            return Vec::new();
        }
    };
    values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value::<StrokeRecord>(value) {
            Ok(record) => {
                let stroke = record.into_stroke();
                if stroke.is_none() {
                    log::warn!("Skipping stroke record {}: no points", i);
                }
                stroke
            }
            Err(e) => {
                log::warn!("Skipping stroke record {}: {}", i, e);
                None
            }
        })
        .collect()
}

pub fn strokes_to_json(strokes: &[Stroke]) -> StorageResult<String> {
    let records: Vec<StrokeRecord> = strokes.iter().map(StrokeRecord::from_stroke).collect();
    Ok(serde_json::to_string(&records)?)
}

/// Note body: structured rich text, or markup from older records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentRecord {
    Rich(RichText),
    Markup(String),
}

impl Default for ContentRecord {
    fn default() -> Self {
        ContentRecord::Rich(RichText::from_plain(crate::notes::DEFAULT_NOTE_TEXT))
    }
}

impl From<ContentRecord> for RichText {
    fn from(record: ContentRecord) -> Self {
        match record {
            ContentRecord::Rich(text) => text,
            ContentRecord::Markup(markup) => RichText::from_markup(&markup),
        }
    }
}

fn default_title() -> String {
    crate::notes::DEFAULT_NOTE_TITLE.to_string()
}

/// A persisted note.
///
/// Older records store geometry as `canvasX`/`canvasY`/`noteWidth`/
/// `noteHeight` and prefix style fields with `note`; both layouts load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NoteId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeRecord>,
    #[serde(default, skip_serializing)]
    pub canvas_x: Option<f64>,
    #[serde(default, skip_serializing)]
    pub canvas_y: Option<f64>,
    #[serde(default, skip_serializing)]
    pub note_width: Option<f64>,
    #[serde(default, skip_serializing)]
    pub note_height: Option<f64>,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default, alias = "noteContent")]
    pub content: ContentRecord,
    #[serde(default, alias = "noteColor", deserialize_with = "lenient")]
    pub color: NoteColor,
    #[serde(default, alias = "noteFont", deserialize_with = "lenient")]
    pub font: NoteFont,
    #[serde(default, alias = "noteSize", deserialize_with = "lenient")]
    pub size_class: NoteSize,
    /// PNG data URL; absent or null when the drawing is blank.
    #[serde(default, alias = "noteCanvasData")]
    pub sub_drawing: Option<String>,
}

/// Note dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeRecord {
    pub width: f64,
    pub height: f64,
}

impl From<Size> for SizeRecord {
    fn from(size: Size) -> Self {
        Self {
            width: size.width,
            height: size.height,
        }
    }
}

impl NoteRecord {
    pub fn from_note(note: &Note) -> StorageResult<Self> {
        let sub_drawing = note
            .sub_drawing()
            .to_data_url()
            .map_err(|e| StorageError::Serialization(format!("Note {} drawing: {}", note.id(), e)))?;
        Ok(Self {
            id: Some(note.id()),
            position: Some(note.position()),
            size: Some(note.size().into()),
            canvas_x: None,
            canvas_y: None,
            note_width: None,
            note_height: None,
            title: note.title.clone(),
            content: ContentRecord::Rich(note.content.clone()),
            color: note.style.color,
            font: note.style.font,
            size_class: note.style.size,
            sub_drawing,
        })
    }

    /// Geometry from either layout, defaulting like a freshly added note.
    fn rect(&self, config: &BoardConfig) -> Rect {
        let default_size = config.default_note_size();
        let position = self.position.unwrap_or_else(|| {
            Point::new(self.canvas_x.unwrap_or(0.0), self.canvas_y.unwrap_or(0.0))
        });
        let size = self.size.map(|s| Size::new(s.width, s.height)).unwrap_or_else(|| {
            Size::new(
                self.note_width.unwrap_or(default_size.width),
                self.note_height.unwrap_or(default_size.height),
            )
        });
        let finite = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        Rect::from_origin_size(
            Point::new(finite(position.x, 0.0), finite(position.y, 0.0)),
            Size::new(finite(size.width, default_size.width), finite(size.height, default_size.height)),
        )
    }

    /// Rebuild the note under `id`, clamped to the board and the size
    /// floor. An undecodable drawing is dropped with a warning.
    pub fn into_note(self, id: NoteId, config: &BoardConfig) -> Note {
        let style = NoteStyle {
            color: self.color,
            font: self.font,
            size: self.size_class,
        };
        let rect = self.rect(config);
        let mut note = Note::restore(id, rect, style, config.min_note_size, config.board_size());
        note.title = self.title;
        note.content = self.content.into();
        if let Some(url) = self.sub_drawing.as_deref().filter(|u| !u.is_empty()) {
            let size = note.size();
            match SubDrawing::from_data_url(url, crate::notes::pixel_len(size.width), crate::notes::pixel_len(size.height)) {
                Ok(drawing) => note.set_drawing(drawing),
                Err(e) => log::warn!("Dropping unreadable drawing on note {}: {}", id, e),
            }
        }
        note
    }
}

/// Parse a persisted note list. Notes without an id get one from
/// `next_id`, which is advanced past every id seen. Unreadable records are
/// skipped with a warning.
pub fn parse_notes(json: &str, next_id: &mut NoteId, config: &BoardConfig) -> Vec<Note> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(json) {
        Ok(values) => values,
        Err(e) => {
            log::warn!("Ignoring unreadable note list: {}", e);
            return Vec::new();
        }
    };
    let records: Vec<NoteRecord> = values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| {
            serde_json::from_value(value)
                .map_err(|e| log::warn!("Skipping note record {}: {}", i, e))
                .ok()
        })
        .collect();

    if let Some(max) = records.iter().filter_map(|r| r.id).max() {
        *next_id = (*next_id).max(max.saturating_add(1));
    }
    let mut seen = std::collections::HashSet::new();
    records
        .into_iter()
        .map(|record| {
            let id = match record.id {
                Some(id) if seen.insert(id) => id,
                _ => {
                    let mut id = *next_id;
                    while seen.contains(&id) {
                        id = successor(id);
                    }
                    *next_id = successor(id);
                    seen.insert(id);
                    log::warn!("Assigning id {} to note record without a unique id", id);
                    id
                }
            };
            record.into_note(id, config)
        })
        .collect()
}

pub fn notes_to_json<'a>(notes: impl IntoIterator<Item = &'a Note>) -> StorageResult<String> {
    let records = notes
        .into_iter()
        .map(NoteRecord::from_note)
        .collect::<StorageResult<Vec<_>>>()?;
    Ok(serde_json::to_string(&records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::{BlockKind, TextSelection};

    #[test]
    fn test_missing_bounds_derived() {
        let strokes = parse_strokes(
            r##"[{"tool":"marker","color":"#000000","width":5,"opacity":1,"points":[{"x":0,"y":0},{"x":5,"y":5}]}]"##,
        );
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].bounds(), Bounds::new(0.0, 0.0, 5.0, 5.0));
    }

    #[test]
    fn test_legacy_highlight_tool_and_defaults() {
        let strokes = parse_strokes(r#"[{"tool":"highlight","points":[{"x":1,"y":2}]}]"#);
        let ink = strokes[0].as_ink().unwrap();
        assert_eq!(ink.tool, InkTool::Highlighter);
        assert!((ink.width - 20.0).abs() < f64::EPSILON);
        assert!((ink.opacity - 0.3).abs() < f64::EPSILON);
        assert_eq!(ink.color, SerializableColor::black());
    }

    #[test]
    fn test_bad_records_skipped() {
        let strokes = parse_strokes(
            r#"[
                {"tool":"marker","points":[]},
                {"tool":"spray","points":[{"x":1,"y":1}]},
                {"tool":"tape","start":{"x":0,"y":0}},
                {"tool":"eraser","points":[{"x":3,"y":4}]}
            ]"#,
        );
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].tool_name(), "eraser");
        assert!(parse_strokes("{not json").is_empty());
        assert!(parse_strokes(r#"{"tool":"marker"}"#).is_empty());
    }

    #[test]
    fn test_non_ascii_color_falls_back_to_black() {
        let strokes = parse_strokes(r##"[{"tool":"marker","color":"#€","points":[{"x":1,"y":1}]}]"##);
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].as_ink().unwrap().color, SerializableColor::black());
    }

    #[test]
    fn test_tape_seed_derived_and_stable() {
        let json = r##"[{"tool":"tape","start":{"x":100,"y":100},"end":{"x":300,"y":100},"pattern":"dots","color":"#ff6b6b","width":24}]"##;
        let a = parse_strokes(json);
        let b = parse_strokes(json);
        let (ta, tb) = (a[0].as_tape().unwrap(), b[0].as_tape().unwrap());
        assert_eq!(ta.seed, tb.seed);
        assert_eq!(ta.pattern, TapePattern::Dots);
        assert_eq!(ta.bounds(), Bounds::new(100.0, 100.0, 300.0, 100.0));
    }

    #[test]
    fn test_unknown_pattern_falls_back() {
        let strokes = parse_strokes(r#"[{"tool":"tape","start":{"x":0,"y":0},"end":{"x":9,"y":0},"pattern":"zigzag"}]"#);
        let tape = strokes[0].as_tape().unwrap();
        assert_eq!(tape.pattern, TapePattern::Diagonal);
        assert_eq!(tape.color, TapeStroke::DEFAULT_COLOR);
    }

    #[test]
    fn test_stroke_record_preserves_identity() {
        let tape = TapeStroke::with_seed(
            Point::new(1.0, 2.0),
            Point::new(30.0, 40.0),
            TapePattern::Grid,
            SerializableColor::parse("blue").unwrap(),
            16.0,
            77,
        );
        let json = strokes_to_json(&[Stroke::Tape(tape.clone())]).unwrap();
        assert!(json.contains(r#""tool":"tape""#));
        let loaded = parse_strokes(&json);
        assert_eq!(loaded, vec![Stroke::Tape(tape)]);
    }

    #[test]
    fn test_legacy_note_layout() {
        let config = BoardConfig::default();
        let mut next_id = 1;
        let notes = parse_notes(
            r#"[{
                "id": 4,
                "title": "Groceries",
                "noteColor": "pink",
                "noteFont": "marker",
                "noteSize": "x-large",
                "noteContent": "<ul><li>milk</li><li><b>eggs</b></li></ul>",
                "canvasX": 40, "canvasY": 60,
                "noteWidth": 300, "noteHeight": 90,
                "noteCanvasData": null
            }]"#,
            &mut next_id,
            &config,
        );
        assert_eq!(next_id, 5);
        let note = &notes[0];
        assert_eq!(note.id(), 4);
        assert_eq!(note.title, "Groceries");
        assert_eq!(note.position(), Point::new(40.0, 60.0));
        assert_eq!(note.size(), Size::new(300.0, 150.0));
        assert_eq!(
            (note.style.color, note.style.font, note.style.size),
            (NoteColor::Pink, NoteFont::Marker, NoteSize::XLarge)
        );
        assert_eq!(note.content.blocks()[0].kind, BlockKind::Bullet);
        assert_eq!(note.content.plain_text(), "milk\neggs");
        assert!(note.sub_drawing().is_blank());
    }

    #[test]
    fn test_note_without_id_gets_fresh_one() {
        let config = BoardConfig::default();
        let mut next_id = 1;
        let notes = parse_notes(r#"[{"id": 7}, {"title": "orphan"}, {"id": 7}]"#, &mut next_id, &config);
        let ids: Vec<NoteId> = notes.iter().map(Note::id).collect();
        assert_eq!(ids, vec![7, 8, 9]);
        assert_eq!(next_id, 10);
        assert_eq!(notes[0].content.plain_text(), crate::notes::DEFAULT_NOTE_TEXT);
    }

    #[test]
    fn test_oversized_note_capped_to_board() {
        let config = BoardConfig::default();
        let mut next_id = 1;
        let notes = parse_notes(r#"[{"id":1,"noteWidth":1e9,"noteHeight":1e9}]"#, &mut next_id, &config);
        let note = &notes[0];
        assert!((note.size().width - config.board_width).abs() < f64::EPSILON);
        assert!((note.size().height - config.board_height).abs() < f64::EPSILON);
        assert_eq!(note.position(), Point::ZERO);
        assert!(note.sub_drawing().width() <= config.board_width as u32);
        assert!(note.sub_drawing().height() <= config.board_height as u32);
    }

    #[test]
    fn test_note_id_at_limit() {
        let config = BoardConfig::default();
        let mut next_id = 1;
        let notes = parse_notes(r#"[{"id":18446744073709551615},{"title":"orphan"}]"#, &mut next_id, &config);
        let ids: Vec<NoteId> = notes.iter().map(Note::id).collect();
        assert_eq!(ids, vec![NoteId::MAX, 1]);
        assert_eq!(next_id, 2);
    }

    #[test]
    fn test_unknown_note_style_falls_back() {
        let config = BoardConfig::default();
        let mut next_id = 1;
        let notes = parse_notes(r#"[{"id": 1, "color": "orange", "font": 3}]"#, &mut next_id, &config);
        assert_eq!(notes[0].style, NoteStyle::default());
    }

    #[test]
    fn test_note_record_roundtrip_with_drawing() {
        let config = BoardConfig::default();
        let mut note = Note::new(2, Point::new(10.0, 20.0), Size::new(200.0, 180.0), NoteStyle::default());
        note.content.toggle_bold(TextSelection::new(0, 5));
        let style = InkStyle::for_tool(InkTool::Marker);
        let stroke = InkStroke::begin(InkTool::Marker, Point::new(50.0, 50.0), &style);
        note.sub_drawing.draw_stroke(&stroke);

        let json = notes_to_json([&note]).unwrap();
        assert!(json.contains(r#""subDrawing":"data:image/png;base64,"#));
        assert!(json.contains(r#""sizeClass":"medium""#));

        let mut next_id = 1;
        let loaded = parse_notes(&json, &mut next_id, &config);
        let restored = &loaded[0];
        assert_eq!(restored.rect(), note.rect());
        assert_eq!(restored.content, note.content);
        assert_eq!(restored.sub_drawing(), note.sub_drawing());
    }

    #[test]
    fn test_blank_drawing_serialized_as_absent() {
        let note = Note::new(1, Point::ZERO, Size::new(250.0, 250.0), NoteStyle::default());
        let record = NoteRecord::from_note(&note).unwrap();
        assert_eq!(record.sub_drawing, None);
    }

    #[test]
    fn test_corrupt_drawing_dropped() {
        let config = BoardConfig::default();
        let mut next_id = 1;
        let notes = parse_notes(r#"[{"id": 1, "subDrawing": "data:image/png;base64,!!!"}]"#, &mut next_id, &config);
        assert_eq!(notes.len(), 1);
        assert!(notes[0].sub_drawing().is_blank());
    }
}
