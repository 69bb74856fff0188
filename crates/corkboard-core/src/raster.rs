//! Software raster surface with canvas-style compositing.
//!
//! Pixels are stored as straight (non-premultiplied) RGBA8 in an
//! [`image::RgbaImage`]. Every drawing call goes through a coverage
//! buffer and a [`CompositeOp`], so the board layer, note sub-drawings and
//! the tape offscreen band all share the same blend rules.

use crate::strokes::{InkStyle, InkTool, SerializableColor};
use image::{Rgba, RgbaImage, imageops::FilterType};
use kurbo::{Affine, Point, Rect, Vec2};

/// How source pixels combine with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeOp {
    /// Paint over existing content.
    #[default]
    SourceOver,
    /// Darken by multiplying with existing content, then paint over.
    Multiply,
    /// Remove existing content where the source is opaque.
    DestinationOut,
    /// Paint only behind existing content.
    DestinationOver,
}

impl From<InkTool> for CompositeOp {
    fn from(tool: InkTool) -> Self {
        match tool {
            InkTool::Marker => CompositeOp::SourceOver,
            InkTool::Highlighter => CompositeOp::Multiply,
            InkTool::Eraser => CompositeOp::DestinationOut,
        }
    }
}

/// Blend one straight-alpha source color into a destination pixel.
fn blend(dst: [u8; 4], src: [f32; 4], op: CompositeOp) -> [u8; 4] {
    let da = dst[3] as f32 / 255.0;
    let dc = [dst[0] as f32 / 255.0, dst[1] as f32 / 255.0, dst[2] as f32 / 255.0];
    let sa = src[3].clamp(0.0, 1.0);
    if sa <= 0.0 {
        return dst;
    }

    let (out_c, out_a) = match op {
        CompositeOp::SourceOver | CompositeOp::Multiply => {
            let mut sc = [src[0], src[1], src[2]];
            if op == CompositeOp::Multiply {
                for i in 0..3 {
                    sc[i] = (1.0 - da) * sc[i] + da * sc[i] * dc[i];
                }
            }
            let oa = sa + da * (1.0 - sa);
            let mut oc = [0.0; 3];
            if oa > 0.0 {
                for i in 0..3 {
                    oc[i] = (sc[i] * sa + dc[i] * da * (1.0 - sa)) / oa;
                }
            }
            (oc, oa)
        }
        CompositeOp::DestinationOut => (dc, da * (1.0 - sa)),
        CompositeOp::DestinationOver => {
            let oa = da + sa * (1.0 - da);
            let mut oc = [0.0; 3];
            if oa > 0.0 {
                for i in 0..3 {
                    oc[i] = (dc[i] * da + src[i] * sa * (1.0 - da)) / oa;
                }
            }
            (oc, oa)
        }
    };

    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    [to_u8(out_c[0]), to_u8(out_c[1]), to_u8(out_c[2]), to_u8(out_a)]
}

/// Per-pixel coverage over a clipped window of a surface.
struct Coverage {
    x0: u32,
    y0: u32,
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl Coverage {
    /// Window covering `rect` clipped to a `surface_width` × `surface_height`
    /// surface. `None` if nothing remains after clipping.
    fn for_rect(rect: Rect, surface_width: u32, surface_height: u32) -> Option<Self> {
        let x0 = rect.x0.floor().max(0.0) as u32;
        let y0 = rect.y0.floor().max(0.0) as u32;
        let x1 = (rect.x1.ceil().max(0.0) as u32).min(surface_width);
        let y1 = (rect.y1.ceil().max(0.0) as u32).min(surface_height);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        let width = x1 - x0;
        let height = y1 - y0;
        Some(Self {
            x0,
            y0,
            width,
            height,
            data: vec![0.0; (width * height) as usize],
        })
    }

    /// Max-combine `value` into the pixel at surface coordinates.
    fn add(&mut self, x: u32, y: u32, value: f32) {
        if x < self.x0 || y < self.y0 || x >= self.x0 + self.width || y >= self.y0 + self.height {
            return;
        }
        let idx = ((y - self.y0) * self.width + (x - self.x0)) as usize;
        if value > self.data[idx] {
            self.data[idx] = value;
        }
    }
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.hypot2();
    if len_sq < f64::EPSILON {
        return (p - a).hypot();
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).hypot()
}

/// A raster drawing surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    image: RgbaImage,
}

impl Surface {
    /// Transparent surface. Zero dimensions are bumped to 1.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width.max(1), height.max(1)),
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width() || y >= self.height() {
            return [0, 0, 0, 0];
        }
        self.image.get_pixel(x, y).0
    }

    /// True when every pixel is fully transparent.
    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(|p| p.0[3] == 0)
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    /// Overwrite every pixel with `color`.
    pub fn fill(&mut self, color: SerializableColor) {
        let value = Rgba([color.r, color.g, color.b, color.a]);
        for pixel in self.image.pixels_mut() {
            *pixel = value;
        }
    }

    /// Overwrite every pixel with `tile`, repeated from the origin.
    pub fn fill_tiled(&mut self, tile: &Surface) {
        let (tw, th) = (tile.width(), tile.height());
        for (x, y, pixel) in self.image.enumerate_pixels_mut() {
            *pixel = *tile.image.get_pixel(x % tw, y % th);
        }
    }

    fn apply(&mut self, coverage: &Coverage, color: [f32; 4], op: CompositeOp) {
        for row in 0..coverage.height {
            for col in 0..coverage.width {
                let c = coverage.data[(row * coverage.width + col) as usize];
                if c <= 0.0 {
                    continue;
                }
                let x = coverage.x0 + col;
                let y = coverage.y0 + row;
                let src = [color[0], color[1], color[2], color[3] * c];
                let dst = self.image.get_pixel(x, y).0;
                self.image.put_pixel(x, y, Rgba(blend(dst, src, op)));
            }
        }
    }

    /// Stroke a polyline with round caps and joins.
    ///
    /// A single point produces a dot of diameter `width`.
    pub fn stroke_polyline(&mut self, points: &[Point], width: f64, color: [f32; 4], op: CompositeOp) {
        let Some(first) = points.first() else {
            return;
        };
        let radius = (width / 2.0).max(0.5);
        let mut rect = Rect::from_points(*first, *first);
        for p in points {
            rect = rect.union_pt(*p);
        }
        let Some(mut coverage) = Coverage::for_rect(rect.inflate(radius + 1.0, radius + 1.0), self.width(), self.height())
        else {
            return;
        };

        let single = [*first, *first];
        let segments: &[Point] = if points.len() == 1 { &single } else { points };
        for pair in segments.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let seg = Rect::from_points(a, b).inflate(radius + 1.0, radius + 1.0);
            let x0 = seg.x0.floor().max(coverage.x0 as f64) as u32;
            let y0 = seg.y0.floor().max(coverage.y0 as f64) as u32;
            let x1 = (seg.x1.ceil() as u32).min(coverage.x0 + coverage.width);
            let y1 = (seg.y1.ceil() as u32).min(coverage.y0 + coverage.height);
            for y in y0..y1 {
                for x in x0..x1 {
                    let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                    let d = segment_distance(center, a, b);
                    let value = (radius + 0.5 - d).clamp(0.0, 1.0) as f32;
                    if value > 0.0 {
                        coverage.add(x, y, value);
                    }
                }
            }
        }
        self.apply(&coverage, color, op);
    }

    /// Fill an axis-aligned rectangle.
    pub fn fill_rect(&mut self, rect: Rect, color: [f32; 4], op: CompositeOp) {
        let Some(mut coverage) = Coverage::for_rect(rect, self.width(), self.height()) else {
            return;
        };
        for y in coverage.y0..coverage.y0 + coverage.height {
            for x in coverage.x0..coverage.x0 + coverage.width {
                let cx = (rect.x1.min(x as f64 + 1.0) - rect.x0.max(x as f64)).clamp(0.0, 1.0);
                let cy = (rect.y1.min(y as f64 + 1.0) - rect.y0.max(y as f64)).clamp(0.0, 1.0);
                coverage.add(x, y, (cx * cy) as f32);
            }
        }
        self.apply(&coverage, color, op);
    }

    /// Fill an ellipse with radii `rx`/`ry`, rotated by `rotation` radians.
    pub fn fill_ellipse(&mut self, center: Point, rx: f64, ry: f64, rotation: f64, color: [f32; 4], op: CompositeOp) {
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        let extent = rx.max(ry) + 1.0;
        let rect = Rect::new(center.x - extent, center.y - extent, center.x + extent, center.y + extent);
        let Some(mut coverage) = Coverage::for_rect(rect, self.width(), self.height()) else {
            return;
        };
        let (sin, cos) = rotation.sin_cos();
        let min_radius = rx.min(ry);
        for y in coverage.y0..coverage.y0 + coverage.height {
            for x in coverage.x0..coverage.x0 + coverage.width {
                let d = Vec2::new(x as f64 + 0.5 - center.x, y as f64 + 0.5 - center.y);
                let u = d.x * cos + d.y * sin;
                let v = -d.x * sin + d.y * cos;
                let norm = ((u / rx).powi(2) + (v / ry).powi(2)).sqrt();
                let dist = (1.0 - norm) * min_radius;
                coverage.add(x, y, (dist + 0.5).clamp(0.0, 1.0) as f32);
            }
        }
        self.apply(&coverage, color, op);
    }

    /// Draw `src` onto this surface through `transform` (source pixel
    /// space to destination pixel space), nearest-neighbour sampled.
    pub fn composite(&mut self, src: &Surface, transform: Affine, op: CompositeOp) {
        self.composite_with_opacity(src, transform, op, 1.0);
    }

    pub fn composite_with_opacity(&mut self, src: &Surface, transform: Affine, op: CompositeOp, opacity: f32) {
        if transform.determinant().abs() < f64::EPSILON {
            return;
        }
        let src_rect = Rect::new(0.0, 0.0, src.width() as f64, src.height() as f64);
        let Some(window) = Coverage::for_rect(transform.transform_rect_bbox(src_rect), self.width(), self.height())
        else {
            return;
        };
        let inverse = transform.inverse();
        for y in window.y0..window.y0 + window.height {
            for x in window.x0..window.x0 + window.width {
                let p = inverse * Point::new(x as f64 + 0.5, y as f64 + 0.5);
                if p.x < 0.0 || p.y < 0.0 || p.x >= src_rect.x1 || p.y >= src_rect.y1 {
                    continue;
                }
                let s = src.image.get_pixel(p.x as u32, p.y as u32).0;
                if s[3] == 0 {
                    continue;
                }
                let color = [
                    s[0] as f32 / 255.0,
                    s[1] as f32 / 255.0,
                    s[2] as f32 / 255.0,
                    s[3] as f32 / 255.0 * opacity,
                ];
                let dst = self.image.get_pixel(x, y).0;
                self.image.put_pixel(x, y, Rgba(blend(dst, color, op)));
            }
        }
    }

    /// Draw freehand ink with the tool's compositing rule.
    ///
    /// Eraser strokes ignore the style color and always clear fully.
    pub fn draw_ink(&mut self, points: &[Point], style: &InkStyle, tool: InkTool) {
        let color = match tool {
            InkTool::Eraser => [0.0, 0.0, 0.0, 1.0],
            InkTool::Marker | InkTool::Highlighter => {
                let [r, g, b, a] = style.color.to_f32();
                [r, g, b, a * style.opacity as f32]
            }
        };
        self.stroke_polyline(points, style.width, color, tool.into());
    }

    /// Resampled copy at a new size.
    pub fn resized(&self, width: u32, height: u32) -> Surface {
        let (width, height) = (width.max(1), height.max(1));
        if width == self.width() && height == self.height() {
            return self.clone();
        }
        Surface {
            image: image::imageops::resize(&self.image, width, height, FilterType::Triangle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

    #[test]
    fn test_source_over_paints() {
        let mut surface = Surface::new(20, 20);
        surface.stroke_polyline(&[Point::new(2.0, 10.0), Point::new(18.0, 10.0)], 4.0, RED, CompositeOp::SourceOver);
        assert_eq!(surface.pixel(10, 10), [255, 0, 0, 255]);
        assert_eq!(surface.pixel(10, 2), [0, 0, 0, 0]);
    }

    #[test]
    fn test_single_point_is_dot() {
        let mut surface = Surface::new(20, 20);
        surface.stroke_polyline(&[Point::new(10.0, 10.0)], 6.0, RED, CompositeOp::SourceOver);
        assert_eq!(surface.pixel(10, 10)[3], 255);
        assert_eq!(surface.pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_destination_out_clears() {
        let mut surface = Surface::new(20, 20);
        surface.fill_rect(Rect::new(0.0, 0.0, 20.0, 20.0), RED, CompositeOp::SourceOver);
        surface.stroke_polyline(&[Point::new(10.0, 0.0), Point::new(10.0, 20.0)], 6.0, BLUE, CompositeOp::DestinationOut);
        assert_eq!(surface.pixel(10, 10)[3], 0);
        assert_eq!(surface.pixel(1, 10), [255, 0, 0, 255]);
    }

    #[test]
    fn test_multiply_darkens() {
        let mut surface = Surface::new(10, 10);
        surface.fill(SerializableColor::new(255, 255, 0, 255));
        let cyan = [0.0, 1.0, 1.0, 1.0];
        surface.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), cyan, CompositeOp::Multiply);
        assert_eq!(surface.pixel(5, 5), [0, 255, 0, 255]);
    }

    #[test]
    fn test_highlight_overlap_does_not_saturate() {
        let mut surface = Surface::new(10, 10);
        surface.fill(SerializableColor::white());
        let yellow = [1.0, 1.0, 0.0, 0.3];
        surface.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), yellow, CompositeOp::Multiply);
        let once = surface.pixel(5, 5);
        surface.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), yellow, CompositeOp::Multiply);
        let twice = surface.pixel(5, 5);
        assert!(twice[2] < once[2]);
        assert!(twice[2] > 0);
        assert_eq!(twice[0], 255);
    }

    #[test]
    fn test_destination_over_stays_behind() {
        let mut surface = Surface::new(10, 10);
        surface.fill_rect(Rect::new(0.0, 0.0, 5.0, 10.0), RED, CompositeOp::SourceOver);
        surface.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), BLUE, CompositeOp::DestinationOver);
        assert_eq!(surface.pixel(2, 5), [255, 0, 0, 255]);
        assert_eq!(surface.pixel(8, 5), [0, 0, 255, 255]);
    }

    #[test]
    fn test_composite_translates() {
        let mut src = Surface::new(4, 4);
        src.fill(SerializableColor::new(0, 255, 0, 255));
        let mut dst = Surface::new(20, 20);
        dst.composite(&src, Affine::translate((10.0, 10.0)), CompositeOp::SourceOver);
        assert_eq!(dst.pixel(11, 11), [0, 255, 0, 255]);
        assert_eq!(dst.pixel(5, 5), [0, 0, 0, 0]);
        assert_eq!(dst.pixel(14, 14), [0, 0, 0, 0]);
    }

    #[test]
    fn test_fill_ellipse_covers_center() {
        let mut surface = Surface::new(30, 30);
        surface.fill_ellipse(Point::new(15.0, 15.0), 8.0, 4.0, 0.0, RED, CompositeOp::SourceOver);
        assert_eq!(surface.pixel(15, 15)[3], 255);
        assert_eq!(surface.pixel(15, 25)[3], 0);
        assert_eq!(surface.pixel(21, 15)[3], 255);
    }

    #[test]
    fn test_resized_dimensions() {
        let mut surface = Surface::new(10, 10);
        surface.fill(SerializableColor::black());
        let bigger = surface.resized(20, 5);
        assert_eq!((bigger.width(), bigger.height()), (20, 5));
        assert_eq!(bigger.pixel(10, 2), [0, 0, 0, 255]);
    }

    #[test]
    fn test_eraser_ink_ignores_color() {
        let mut surface = Surface::new(60, 60);
        surface.fill(SerializableColor::black());
        let style = InkStyle::for_tool(InkTool::Eraser);
        surface.draw_ink(&[Point::new(10.0, 10.0)], &style, InkTool::Eraser);
        assert_eq!(surface.pixel(10, 10)[3], 0);
        assert!(!surface.is_blank());
    }
}
