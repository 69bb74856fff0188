//! Tape texture generator.
//!
//! A tape stroke is drawn as a textured band in its own pixel space (x along
//! the tape, y across it), torn at both ends, then composited onto the
//! target at the stroke's position and angle.

use corkboard_core::{CompositeOp, SerializableColor, Surface, TapePattern, TapeStroke};
use kurbo::{Affine, Point, Rect};

/// Edge length of a pattern tile in pixels.
pub const TILE_SIZE: u32 = 8;

/// Notches torn out of each end of a band.
pub const NOTCHES_PER_END: usize = 6;

/// Deepest possible notch as a fraction of the tape width.
pub const MAX_NOTCH_DEPTH: f64 = 0.35;

/// Width of the solid core band as a fraction of the tape width.
const CORE_BAND_RATIO: f64 = 0.6;

/// Alpha of the tinted tile background.
const TILE_BASE_ALPHA: u8 = 150;

/// Simple seeded random number generator (xorshift32).
/// Used for deterministic torn edges.
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Random float in range [-1, 1]
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u32() as f64 / u32::MAX as f64) * 2.0 - 1.0
    }

    /// Random offset scaled by amount
    pub fn offset(&mut self, amount: f64) -> f64 {
        self.next_f64() * amount
    }

    /// Random float in range [lo, hi]
    pub fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (self.next_f64() + 1.0) * 0.5 * (hi - lo)
    }
}

/// A semi-elliptical bite out of one end of the band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Notch {
    /// Position across the band, in `0.0..=width`.
    pub center: f64,
    /// Half extent across the band.
    pub half_span: f64,
    /// How far the bite reaches along the band.
    pub depth: f64,
}

/// Notches for both ends of one tape stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct TornEdge {
    pub start: Vec<Notch>,
    pub end: Vec<Notch>,
}

impl TornEdge {
    /// Notch pattern for a band `width` wide. The same seed always gives the
    /// same pattern.
    pub fn generate(seed: u32, width: f64) -> Self {
        let mut rng = SimpleRng::new(seed);
        let start = Self::notches(&mut rng, width);
        let end = Self::notches(&mut rng, width);
        Self { start, end }
    }

    pub fn for_stroke(tape: &TapeStroke) -> Self {
        Self::generate(tape.seed, tape.width)
    }

    fn notches(rng: &mut SimpleRng, width: f64) -> Vec<Notch> {
        let slot = width / NOTCHES_PER_END as f64;
        let max_depth = width * MAX_NOTCH_DEPTH;
        (0..NOTCHES_PER_END)
            .map(|i| Notch {
                center: ((i as f64 + 0.5) * slot + rng.offset(slot * 0.3)).clamp(0.0, width),
                half_span: slot * rng.range(0.4, 0.6),
                depth: max_depth * rng.range(0.3, 1.0),
            })
            .collect()
    }

    /// Deepest notch at either end.
    pub fn max_depth(&self) -> f64 {
        self.start.iter().chain(&self.end).map(|n| n.depth).fold(0.0, f64::max)
    }
}

/// A small repeating tile for `pattern`, tinted toward `color`.
///
/// The tile background is translucent so the solid core band drawn behind
/// it shows through.
pub fn pattern_tile(pattern: TapePattern, color: SerializableColor) -> Surface {
    let mut tile = Surface::new(TILE_SIZE, TILE_SIZE);
    tile.fill(color.with_alpha(TILE_BASE_ALPHA));

    let mark = color.mix(SerializableColor::black(), 0.35).with_alpha(255).to_f32();
    let size = TILE_SIZE as f64;
    match pattern {
        TapePattern::Plain => {}
        TapePattern::Diagonal => {
            for y in 0..TILE_SIZE {
                for x in 0..TILE_SIZE {
                    if (x + y) % TILE_SIZE < 2 {
                        let px = Rect::new(x as f64, y as f64, x as f64 + 1.0, y as f64 + 1.0);
                        tile.fill_rect(px, mark, CompositeOp::SourceOver);
                    }
                }
            }
        }
        TapePattern::Dots => {
            let center = Point::new(size / 2.0, size / 2.0);
            tile.fill_ellipse(center, 1.5, 1.5, 0.0, mark, CompositeOp::SourceOver);
        }
        TapePattern::Grid => {
            tile.fill_rect(Rect::new(0.0, 0.0, size, 1.0), mark, CompositeOp::SourceOver);
            tile.fill_rect(Rect::new(0.0, 0.0, 1.0, size), mark, CompositeOp::SourceOver);
        }
    }
    tile
}

fn band_len(len: f64) -> u32 {
    if len.is_finite() { len.ceil().max(1.0) as u32 } else { 1 }
}

/// A pixel range `[x0, x1) × [y0, y1)` of a band. The origin sits on a
/// tile boundary so the pattern lines up with the full band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BandWindow {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

impl BandWindow {
    fn full(tape: &TapeStroke) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: band_len(tape.length()),
            y1: band_len(tape.width),
        }
    }

    /// The part of a `length` × `width` band that lands on a `target_size`
    /// surface through `placement`, or `None` if nothing does.
    fn visible(placement: Affine, target_size: (u32, u32), length: u32, width: u32) -> Option<Self> {
        let det = placement.determinant();
        if !det.is_finite() || det.abs() < f64::EPSILON {
            return None;
        }
        let target = Rect::new(0.0, 0.0, target_size.0 as f64, target_size.1 as f64);
        let local = placement.inverse().transform_rect_bbox(target);
        let clip = |lo: f64, hi: f64, extent: u32| {
            let lo = lo.floor().max(0.0) as u32 / TILE_SIZE * TILE_SIZE;
            let hi = hi.ceil().min(extent as f64) as u32;
            (hi > lo).then_some((lo, hi))
        };
        let (x0, x1) = clip(local.x0, local.x1, length)?;
        let (y0, y1) = clip(local.y0, local.y1, width)?;
        Some(Self { x0, y0, x1, y1 })
    }
}

/// The tape band in its own pixel space, torn at both ends.
pub fn tape_band(tape: &TapeStroke) -> Surface {
    band_window(tape, BandWindow::full(tape))
}

fn band_window(tape: &TapeStroke, window: BandWindow) -> Surface {
    let w = band_len(tape.length()) as f64;
    let h = band_len(tape.width) as f64;
    let (dx, dy) = (window.x0 as f64, window.y0 as f64);

    let mut band = Surface::new(window.x1 - window.x0, window.y1 - window.y0);
    band.fill_tiled(&pattern_tile(tape.pattern, tape.color));

    let inset = h * (1.0 - CORE_BAND_RATIO) / 2.0;
    let core = Rect::new(-dx, inset - dy, w - dx, h - inset - dy);
    band.fill_rect(core, tape.color.with_alpha(255).to_f32(), CompositeOp::DestinationOver);

    let edge = TornEdge::generate(tape.seed, h);
    let cut = [0.0, 0.0, 0.0, 1.0];
    for (x, notches) in [(0.0, &edge.start), (w, &edge.end)] {
        for notch in notches {
            let depth = notch.depth.min(w / 2.0);
            band.fill_ellipse(
                Point::new(x - dx, notch.center - dy),
                depth,
                notch.half_span,
                0.0,
                cut,
                CompositeOp::DestinationOut,
            );
        }
    }
    band
}

/// Draw a tape stroke onto `target`. `transform` maps board coordinates to
/// target pixels. Only the part of the band that lands on `target` is
/// rasterized.
pub fn render_tape(target: &mut Surface, tape: &TapeStroke, transform: Affine) {
    let full = BandWindow::full(tape);
    let placement = transform
        * Affine::translate(tape.start().to_vec2())
        * Affine::rotate(tape.angle())
        * Affine::translate((0.0, -(full.y1 as f64) / 2.0));
    let Some(window) = BandWindow::visible(placement, (target.width(), target.height()), full.x1, full.y1) else {
        log::trace!("Tape {} is off the target", tape.id());
        return;
    };
    let band = band_window(tape, window);
    let offset = Affine::translate((window.x0 as f64, window.y0 as f64));
    target.composite(&band, placement * offset, CompositeOp::SourceOver);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tape(start: (f64, f64), end: (f64, f64), seed: u32) -> TapeStroke {
        TapeStroke::with_seed(
            Point::new(start.0, start.1),
            Point::new(end.0, end.1),
            TapePattern::Dots,
            TapeStroke::DEFAULT_COLOR,
            TapeStroke::DEFAULT_WIDTH,
            seed,
        )
    }

    #[test]
    fn test_rng_is_deterministic() {
        let mut a = SimpleRng::new(42);
        let mut b = SimpleRng::new(42);
        for _ in 0..10 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
        let mut zero = SimpleRng::new(0);
        assert_ne!(zero.next_u32(), 0);
    }

    #[test]
    fn test_rng_range_bounds() {
        let mut rng = SimpleRng::new(7);
        for _ in 0..1000 {
            let v = rng.range(0.3, 1.0);
            assert!((0.3..=1.0).contains(&v));
            let f = rng.next_f64();
            assert!((-1.0..=1.0).contains(&f));
        }
    }

    #[test]
    fn test_notch_count() {
        let edge = TornEdge::generate(1234, 24.0);
        assert_eq!(edge.start.len(), NOTCHES_PER_END);
        assert_eq!(edge.end.len(), NOTCHES_PER_END);
    }

    #[test]
    fn test_notch_depth_bounded_by_width() {
        for seed in 1..200 {
            let edge = TornEdge::generate(seed, 24.0);
            assert!(edge.max_depth() <= 24.0 * MAX_NOTCH_DEPTH + 1e-9);
            assert!(edge.max_depth() > 0.0);
            for notch in edge.start.iter().chain(&edge.end) {
                assert!(notch.center >= 0.0 && notch.center <= 24.0);
            }
        }
    }

    #[test]
    fn test_same_seed_same_edge() {
        assert_eq!(TornEdge::generate(99, 24.0), TornEdge::generate(99, 24.0));
        assert_ne!(TornEdge::generate(99, 24.0), TornEdge::generate(100, 24.0));
    }

    #[test]
    fn test_plain_tile_is_uniform() {
        let tile = pattern_tile(TapePattern::Plain, TapeStroke::DEFAULT_COLOR);
        let first = tile.pixel(0, 0);
        assert_eq!(first[3], TILE_BASE_ALPHA);
        for y in 0..TILE_SIZE {
            for x in 0..TILE_SIZE {
                assert_eq!(tile.pixel(x, y), first);
            }
        }
    }

    #[test]
    fn test_pattern_tiles_carry_marks() {
        let color = TapeStroke::DEFAULT_COLOR;
        let dots = pattern_tile(TapePattern::Dots, color);
        assert_eq!(dots.pixel(4, 4)[3], 255);
        assert_eq!(dots.pixel(0, 0)[3], TILE_BASE_ALPHA);

        let grid = pattern_tile(TapePattern::Grid, color);
        assert_eq!(grid.pixel(0, 5)[3], 255);
        assert_eq!(grid.pixel(5, 0)[3], 255);
        assert_eq!(grid.pixel(4, 4)[3], TILE_BASE_ALPHA);

        let diagonal = pattern_tile(TapePattern::Diagonal, color);
        assert_eq!(diagonal.pixel(0, 0)[3], 255);
        assert_eq!(diagonal.pixel(3, 4)[3], TILE_BASE_ALPHA);
    }

    #[test]
    fn test_band_core_is_opaque_and_ends_are_torn() {
        let stroke = tape((0.0, 0.0), (100.0, 0.0), 5);
        let band = tape_band(&stroke);
        assert_eq!((band.width(), band.height()), (100, 24));
        assert_eq!(band.pixel(50, 12)[3], 255);

        let edge = TornEdge::generate(5, 24.0);
        let notch = edge.start[2];
        assert_eq!(band.pixel(0, notch.center.floor() as u32)[3], 0);
        let notch = edge.end[3];
        assert_eq!(band.pixel(99, notch.center.floor().min(23.0) as u32)[3], 0);
    }

    #[test]
    fn test_render_tape_horizontal() {
        let mut surface = Surface::new(100, 60);
        render_tape(&mut surface, &tape((10.0, 30.0), (90.0, 30.0), 8), Affine::IDENTITY);
        assert_eq!(surface.pixel(50, 30)[3], 255);
        assert_eq!(surface.pixel(50, 5)[3], 0);
        assert_eq!(surface.pixel(95, 30)[3], 0);
    }

    #[test]
    fn test_render_tape_rotated() {
        let mut surface = Surface::new(100, 100);
        render_tape(&mut surface, &tape((50.0, 10.0), (50.0, 90.0), 8), Affine::IDENTITY);
        assert_eq!(surface.pixel(50, 50)[3], 255);
        assert_eq!(surface.pixel(20, 50)[3], 0);
    }

    #[test]
    fn test_partly_visible_tape_matches_full_band() {
        let stroke = tape((-140.0, 30.0), (230.0, 30.0), 31);
        let mut clipped = Surface::new(100, 60);
        render_tape(&mut clipped, &stroke, Affine::IDENTITY);

        let band = tape_band(&stroke);
        let placement = Affine::translate(stroke.start().to_vec2())
            * Affine::rotate(stroke.angle())
            * Affine::translate((0.0, -(band.height() as f64) / 2.0));
        let mut full = Surface::new(100, 60);
        full.composite(&band, placement, CompositeOp::SourceOver);

        assert_eq!(clipped, full);
        assert_eq!(clipped.pixel(50, 30)[3], 255);
    }

    #[test]
    fn test_far_reaching_tape_renders_visible_part() {
        let stroke = tape((10.0, 10.0), (1e10, 10.0), 3);
        let mut surface = Surface::new(100, 60);
        render_tape(&mut surface, &stroke, Affine::IDENTITY);
        assert_eq!(surface.pixel(50, 10)[3], 255);
        assert_eq!(surface.pixel(95, 10)[3], 255);
        assert_eq!(surface.pixel(5, 10)[3], 0);
        assert_eq!(surface.pixel(50, 40)[3], 0);
    }

    #[test]
    fn test_off_target_tape_draws_nothing() {
        let mut surface = Surface::new(100, 60);
        render_tape(&mut surface, &tape((500.0, 500.0), (900.0, 500.0), 3), Affine::IDENTITY);
        assert_eq!(surface, Surface::new(100, 60));
    }

    #[test]
    fn test_render_tape_is_repeatable() {
        let stroke = tape((5.0, 20.0), (80.0, 45.0), 77);
        let mut first = Surface::new(100, 60);
        let mut second = Surface::new(100, 60);
        render_tape(&mut first, &stroke, Affine::IDENTITY);
        render_tape(&mut second, &stroke, Affine::IDENTITY);
        assert_eq!(first, second);
    }
}
