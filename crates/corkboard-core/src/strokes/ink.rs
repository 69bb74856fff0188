//! Freehand ink strokes: marker, highlighter and eraser.

use super::{Bounds, SerializableColor, StrokeId};
use kurbo::{BezPath, Point, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The tool that produced a freehand stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InkTool {
    Marker,
    #[serde(alias = "highlight")]
    Highlighter,
    Eraser,
}

impl InkTool {
    pub fn name(&self) -> &'static str {
        match self {
            InkTool::Marker => "marker",
            InkTool::Highlighter => "highlighter",
            InkTool::Eraser => "eraser",
        }
    }

    pub fn default_width(&self) -> f64 {
        match self {
            InkTool::Marker => 5.0,
            InkTool::Highlighter => 20.0,
            InkTool::Eraser => 30.0,
        }
    }

    pub fn default_opacity(&self) -> f64 {
        match self {
            InkTool::Highlighter => 0.3,
            InkTool::Marker | InkTool::Eraser => 1.0,
        }
    }
}

/// Color, width and opacity captured when a stroke begins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InkStyle {
    pub color: SerializableColor,
    pub width: f64,
    pub opacity: f64,
}

impl InkStyle {
    pub fn for_tool(tool: InkTool) -> Self {
        Self {
            color: SerializableColor::black(),
            width: tool.default_width(),
            opacity: tool.default_opacity(),
        }
    }

    /// Same style with the width multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            width: self.width * factor,
            ..*self
        }
    }
}

/// A freehand stroke sampled from pointer moves.
#[derive(Debug, Clone, PartialEq)]
pub struct InkStroke {
    pub(crate) id: StrokeId,
    pub tool: InkTool,
    /// Ignored when rendering an eraser stroke.
    pub color: SerializableColor,
    pub width: f64,
    pub opacity: f64,
    points: Vec<Point>,
    bounds: Bounds,
}

impl InkStroke {
    /// Start a stroke at `point`.
    pub fn begin(tool: InkTool, point: Point, style: &InkStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            tool,
            color: style.color,
            width: style.width,
            opacity: style.opacity.clamp(0.0, 1.0),
            points: vec![point],
            bounds: Bounds::from_point(point),
        }
    }

    /// Rebuild a stroke from persisted parts.
    ///
    /// Returns `None` for an empty point list. When `bounds` is missing, or
    /// does not cover every point, it is derived from the points.
    pub fn from_parts(
        id: StrokeId,
        tool: InkTool,
        style: &InkStyle,
        points: Vec<Point>,
        bounds: Option<Bounds>,
    ) -> Option<Self> {
        let derived = Bounds::from_points(&points)?;
        let bounds = match bounds {
            Some(b) if points.iter().all(|p| b.contains(*p)) => b,
            _ => derived,
        };
        Some(Self {
            id,
            tool,
            color: style.color,
            width: style.width,
            opacity: style.opacity.clamp(0.0, 1.0),
            points,
            bounds,
        })
    }

    pub fn id(&self) -> StrokeId {
        self.id
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn style(&self) -> InkStyle {
        InkStyle {
            color: self.color,
            width: self.width,
            opacity: self.opacity,
        }
    }

    /// Append a sample and widen the bounds.
    pub fn extend(&mut self, point: Point) {
        self.points.push(point);
        self.bounds.include(point);
    }

    /// Shift every point and the bounds. Extrema are not recomputed.
    pub fn translate(&mut self, delta: Vec2) {
        for point in &mut self.points {
            *point += delta;
        }
        self.bounds.translate(delta);
    }

    /// Polyline through all samples. A single sample yields a zero-length
    /// segment so it still renders as a dot.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        if let Some(first) = self.points.first() {
            path.move_to(*first);
            if self.points.len() == 1 {
                path.line_to(*first);
            }
            for point in &self.points[1..] {
                path.line_to(*point);
            }
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_seeds_bounds() {
        let style = InkStyle::for_tool(InkTool::Marker);
        let stroke = InkStroke::begin(InkTool::Marker, Point::new(10.0, 10.0), &style);
        assert_eq!(stroke.points().len(), 1);
        assert_eq!(stroke.bounds(), Bounds::new(10.0, 10.0, 10.0, 10.0));
    }

    #[test]
    fn test_extend_marker_vertical() {
        let style = InkStyle::for_tool(InkTool::Marker);
        let mut stroke = InkStroke::begin(InkTool::Marker, Point::new(10.0, 10.0), &style);
        stroke.extend(Point::new(10.0, 50.0));
        assert_eq!(stroke.bounds(), Bounds::new(10.0, 10.0, 10.0, 50.0));
    }

    #[test]
    fn test_bounds_contain_every_point() {
        let style = InkStyle::for_tool(InkTool::Highlighter);
        let mut stroke = InkStroke::begin(InkTool::Highlighter, Point::new(0.0, 0.0), &style);
        for i in 0..50 {
            let t = i as f64 * 0.37;
            stroke.extend(Point::new(t.sin() * 40.0, t.cos() * 25.0 - t));
            assert!(stroke.points().iter().all(|p| stroke.bounds().contains(*p)));
        }
    }

    #[test]
    fn test_defaults_per_tool() {
        let highlighter = InkStyle::for_tool(InkTool::Highlighter);
        assert!((highlighter.opacity - 0.3).abs() < f64::EPSILON);
        assert!((highlighter.width - 20.0).abs() < f64::EPSILON);
        assert!((InkStyle::for_tool(InkTool::Eraser).width - 30.0).abs() < f64::EPSILON);
        assert!((InkStyle::for_tool(InkTool::Marker).opacity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_parts_derives_missing_bounds() {
        let style = InkStyle::for_tool(InkTool::Marker);
        let points = vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)];
        let stroke = InkStroke::from_parts(Uuid::new_v4(), InkTool::Marker, &style, points, None).unwrap();
        assert_eq!(stroke.bounds(), Bounds::new(0.0, 0.0, 5.0, 5.0));
    }

    #[test]
    fn test_from_parts_repairs_stale_bounds() {
        let style = InkStyle::for_tool(InkTool::Marker);
        let points = vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)];
        let stale = Some(Bounds::new(1.0, 1.0, 2.0, 2.0));
        let stroke = InkStroke::from_parts(Uuid::new_v4(), InkTool::Marker, &style, points, stale).unwrap();
        assert_eq!(stroke.bounds(), Bounds::new(0.0, 0.0, 5.0, 5.0));
    }

    #[test]
    fn test_from_parts_rejects_empty() {
        let style = InkStyle::for_tool(InkTool::Marker);
        assert!(InkStroke::from_parts(Uuid::new_v4(), InkTool::Marker, &style, Vec::new(), None).is_none());
    }

    #[test]
    fn test_single_point_path_is_dot() {
        let style = InkStyle::for_tool(InkTool::Marker);
        let stroke = InkStroke::begin(InkTool::Marker, Point::new(3.0, 4.0), &style);
        assert_eq!(stroke.to_path().elements().len(), 2);
    }

    #[test]
    fn test_tool_serde_names() {
        assert_eq!(serde_json::to_string(&InkTool::Highlighter).unwrap(), "\"highlighter\"");
        let legacy: InkTool = serde_json::from_str("\"highlight\"").unwrap();
        assert_eq!(legacy, InkTool::Highlighter);
    }
}
