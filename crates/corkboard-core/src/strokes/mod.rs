//! Stroke definitions for the annotation board.

mod ink;
mod tape;

pub use ink::{InkStroke, InkStyle, InkTool};
pub use tape::{TapePattern, TapeStroke};

use kurbo::{BezPath, Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serializable color representation (RGBA8).
///
/// Persisted as a CSS-style hex string (`#rrggbb`, or `#rrggbbaa` when
/// translucent). Parsing also accepts `#rgb` and a few named colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse a color string. Returns `None` for anything unrecognised.
    pub fn parse(color: &str) -> Option<Self> {
        let color = color.trim();
        match color.to_ascii_lowercase().as_str() {
            "black" => return Some(Self::black()),
            "white" => return Some(Self::white()),
            "red" => return Some(Self::new(255, 0, 0, 255)),
            "blue" => return Some(Self::new(0, 0, 255, 255)),
            "green" => return Some(Self::new(0, 128, 0, 255)),
            "transparent" => return Some(Self::transparent()),
            _ => {}
        }

        let hex = color.strip_prefix('#').filter(|hex| hex.is_ascii())?;
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let r = channel(&hex[0..1])? * 17;
                let g = channel(&hex[1..2])? * 17;
                let b = channel(&hex[2..3])? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                255,
            )),
            8 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    /// Format as a hex string.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Channels as floats in `0.0..=1.0`.
    pub fn to_f32(&self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    /// Mix towards another color by `t` (0 = self, 1 = other).
    pub fn mix(&self, other: SerializableColor, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self::new(
            lerp(self.r, other.r),
            lerp(self.g, other.g),
            lerp(self.b, other.b),
            lerp(self.a, other.a),
        )
    }

    /// Same color with a new alpha.
    pub fn with_alpha(&self, a: u8) -> Self {
        Self { a, ..*self }
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::black()
    }
}

impl From<String> for SerializableColor {
    fn from(value: String) -> Self {
        Self::parse(&value).unwrap_or_else(|| {
            log::warn!("Unrecognised color {:?}, falling back to black", value);
            Self::black()
        })
    }
}

impl From<SerializableColor> for String {
    fn from(color: SerializableColor) -> Self {
        color.to_hex()
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Axis-aligned bounding box in board coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Degenerate box around a single point.
    pub fn from_point(point: Point) -> Self {
        Self::new(point.x, point.y, point.x, point.y)
    }

    /// Smallest box containing every point, or `None` when there are none.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self::from_point(*first);
        for point in iter {
            bounds.include(*point);
        }
        Some(bounds)
    }

    /// Widen the box to cover `point`. Never shrinks.
    pub fn include(&mut self, point: Point) {
        self.min_x = self.min_x.min(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_x = self.max_x.max(point.x);
        self.max_y = self.max_y.max(point.y);
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x && point.x <= self.max_x && point.y >= self.min_y && point.y <= self.max_y
    }

    /// Box grown by `amount` on every side.
    pub fn inflate(&self, amount: f64) -> Self {
        Self::new(
            self.min_x - amount,
            self.min_y - amount,
            self.max_x + amount,
            self.max_y + amount,
        )
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.min_x += delta.x;
        self.max_x += delta.x;
        self.min_y += delta.y;
        self.max_y += delta.y;
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

impl From<Bounds> for Rect {
    fn from(bounds: Bounds) -> Self {
        bounds.to_rect()
    }
}

/// Unique identifier for strokes.
pub type StrokeId = Uuid;

/// Generate a seed for torn-edge jitter.
/// Counter + splitmix32 mixing, so it works without a clock or OS entropy.
pub fn generate_seed() -> u32 {
    use std::sync::atomic::{AtomicU32, Ordering};

    static SEED_COUNTER: AtomicU32 = AtomicU32::new(1);

    let counter = SEED_COUNTER.fetch_add(1, Ordering::Relaxed);
    mix_seed(counter)
}

/// splitmix32 finaliser.
pub(crate) fn mix_seed(value: u32) -> u32 {
    let mut x = value.wrapping_mul(0x9E3779B9);
    x ^= x >> 16;
    x = x.wrapping_mul(0x85EBCA6B);
    x ^= x >> 13;
    x = x.wrapping_mul(0xC2B2AE35);
    x ^= x >> 16;
    x
}

/// Hit-test slack around a stroke's bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitBuffer {
    /// Minimum slack in board units, applied to every stroke.
    pub min: f64,
    /// Multiplier on stroke width; wins over `min` for thick strokes.
    pub width_factor: f64,
}

impl HitBuffer {
    pub fn for_width(&self, width: f64) -> f64 {
        self.min.max(width * self.width_factor)
    }
}

impl Default for HitBuffer {
    fn default() -> Self {
        Self {
            min: 10.0,
            width_factor: 1.0,
        }
    }
}

/// A drawn mark on the board. List order is z-order.
#[derive(Debug, Clone, PartialEq)]
pub enum Stroke {
    Ink(InkStroke),
    Tape(TapeStroke),
}

impl Stroke {
    pub fn id(&self) -> StrokeId {
        match self {
            Stroke::Ink(s) => s.id(),
            Stroke::Tape(s) => s.id(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        match self {
            Stroke::Ink(s) => s.bounds(),
            Stroke::Tape(s) => s.bounds(),
        }
    }

    pub fn width(&self) -> f64 {
        match self {
            Stroke::Ink(s) => s.width,
            Stroke::Tape(s) => s.width,
        }
    }

    /// Tool name as persisted in the `tool` tag.
    pub fn tool_name(&self) -> &'static str {
        match self {
            Stroke::Ink(s) => s.tool.name(),
            Stroke::Tape(_) => "tape",
        }
    }

    /// Whether the select tool may pick this stroke up.
    /// Eraser marks are invisible and never draggable.
    pub fn is_draggable(&self) -> bool {
        match self {
            Stroke::Ink(s) => s.tool != InkTool::Eraser,
            Stroke::Tape(_) => true,
        }
    }

    /// Bounds-with-buffer containment test.
    pub fn hit_test(&self, point: Point, buffer: HitBuffer) -> bool {
        self.bounds()
            .inflate(buffer.for_width(self.width()))
            .contains(point)
    }

    /// Shift every point and the cached bounds by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Stroke::Ink(s) => s.translate(delta),
            Stroke::Tape(s) => s.translate(delta),
        }
    }

    pub fn to_path(&self) -> BezPath {
        match self {
            Stroke::Ink(s) => s.to_path(),
            Stroke::Tape(s) => s.to_path(),
        }
    }

    pub fn as_ink(&self) -> Option<&InkStroke> {
        match self {
            Stroke::Ink(s) => Some(s),
            Stroke::Tape(_) => None,
        }
    }

    pub fn as_tape(&self) -> Option<&TapeStroke> {
        match self {
            Stroke::Tape(s) => Some(s),
            Stroke::Ink(_) => None,
        }
    }
}

impl From<InkStroke> for Stroke {
    fn from(stroke: InkStroke) -> Self {
        Stroke::Ink(stroke)
    }
}

impl From<TapeStroke> for Stroke {
    fn from(stroke: TapeStroke) -> Self {
        Stroke::Tape(stroke)
    }
}

/// Find the top-most draggable stroke under `point`.
///
/// Scans from the end of the list (front) to the start (back).
pub fn find_stroke_at(strokes: &[Stroke], point: Point, buffer: HitBuffer) -> Option<&Stroke> {
    find_stroke_index_at(strokes, point, buffer).map(|i| &strokes[i])
}

/// Index variant of [`find_stroke_at`].
pub fn find_stroke_index_at(strokes: &[Stroke], point: Point, buffer: HitBuffer) -> Option<usize> {
    strokes
        .iter()
        .enumerate()
        .rev()
        .find(|(_, s)| s.is_draggable() && s.hit_test(point, buffer))
        .map(|(i, _)| i)
}
