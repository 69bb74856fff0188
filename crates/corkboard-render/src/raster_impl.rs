//! Software raster implementation of the Renderer trait.

use crate::renderer::{RenderContext, RenderResult, Renderer, RendererError, pixel_size};
use crate::scene::{Chrome, DrawItem, NoteCard, Scene};
use crate::tape::render_tape;
use corkboard_core::{CompositeOp, SerializableColor, Stroke, Surface};
use kurbo::{Affine, Point, Rect, Vec2};

/// Result of rendering to PNG.
pub struct PngRenderResult {
    /// RGBA pixel data (4 bytes per pixel).
    pub rgba_data: Vec<u8>,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl PngRenderResult {
    /// Encode as a PNG file.
    pub fn encode(&self) -> RenderResult<Vec<u8>> {
        let mut png_data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut png_data, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.rgba_data)?;
        }
        Ok(png_data)
    }
}

/// Rasterises the board on the CPU into a [`Surface`].
pub struct RasterRenderer {
    /// The scene built for the current frame.
    scene: Scene,
    /// Board region the scene covers.
    region: Rect,
    background_color: SerializableColor,
    selection_color: SerializableColor,
}

impl Default for RasterRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterRenderer {
    /// Create a new renderer.
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            region: Rect::ZERO,
            background_color: SerializableColor::white(),
            selection_color: SerializableColor::new(59, 130, 246, 255),
        }
    }

    /// Get the current scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene, leaving an empty one.
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    /// Clear a fresh transparent layer over `region` and draw `strokes` on
    /// it: ink in z-order with each tool's compositing rule, then tape on
    /// top. Erasers only remove pixels from strokes drawn before them.
    pub fn render_all(strokes: &[Stroke], region: Rect) -> Surface {
        Self::render_items(&Scene::stroke_items(strokes), region)
    }

    fn render_items(items: &[DrawItem], region: Rect) -> Surface {
        let (width, height) = pixel_size(region);
        let mut layer = Surface::new(width, height);
        let offset = region.origin().to_vec2();
        for item in items {
            match item {
                DrawItem::Ink(ink) => {
                    let points: Vec<Point> = ink.points().iter().map(|p| *p - offset).collect();
                    layer.draw_ink(&points, &ink.style(), ink.tool);
                }
                DrawItem::Tape(tape) => render_tape(&mut layer, tape, Affine::translate(-offset)),
            }
        }
        layer
    }

    /// Draw the most recently built scene.
    pub fn render(&self) -> Surface {
        let (width, height) = pixel_size(self.region);
        let mut surface = Surface::new(width, height);
        surface.fill(self.background_color);

        let layer = Self::render_items(&self.scene.strokes, self.region);
        surface.composite(&layer, Affine::IDENTITY, CompositeOp::SourceOver);

        let to_target = Affine::translate(-self.region.origin().to_vec2());
        for card in &self.scene.notes {
            self.render_note(&mut surface, card, to_target);
        }
        for chrome in &self.scene.chrome {
            self.render_chrome(&mut surface, chrome, to_target);
        }
        surface
    }

    /// Build and draw a frame in one step.
    pub fn render_board(&mut self, ctx: &RenderContext) -> Surface {
        self.build_scene(ctx);
        self.render()
    }

    /// Render a frame to raw RGBA, ready for [`PngRenderResult::encode`].
    pub fn export_png(&mut self, ctx: &RenderContext) -> RenderResult<PngRenderResult> {
        let surface = self.render_board(ctx);
        let (width, height) = (surface.width(), surface.height());
        let rgba_data = surface.into_image().into_raw();
        if rgba_data.len() != (width as usize) * (height as usize) * 4 {
            return Err(RendererError::Surface(format!(
                "Unexpected buffer length {} for {}x{}",
                rgba_data.len(),
                width,
                height
            )));
        }
        log::debug!("Exported {}x{} board image", width, height);
        Ok(PngRenderResult {
            rgba_data,
            width,
            height,
        })
    }

    fn render_note(&self, surface: &mut Surface, card: &NoteCard, to_target: Affine) {
        let rect = to_target.transform_rect_bbox(card.rect);
        let shadow = SerializableColor::black().with_alpha(30).to_f32();
        surface.fill_rect(rect + Vec2::new(2.0, 3.0), shadow, CompositeOp::SourceOver);
        surface.fill_rect(rect, card.fill.to_f32(), CompositeOp::SourceOver);

        let (dw, dh) = (card.drawing.width() as f64, card.drawing.height() as f64);
        let stretch = Affine::translate(rect.origin().to_vec2())
            * Affine::scale_non_uniform(rect.width() / dw, rect.height() / dh);
        surface.composite(&card.drawing, stretch, CompositeOp::SourceOver);

        let border = card.fill.mix(SerializableColor::black(), 0.2).to_f32();
        surface.stroke_polyline(&outline(rect), 1.0, border, CompositeOp::SourceOver);
    }

    fn render_chrome(&self, surface: &mut Surface, chrome: &Chrome, to_target: Affine) {
        let accent = self.selection_color.to_f32();
        match *chrome {
            Chrome::Outline(rect) => {
                let rect = to_target.transform_rect_bbox(rect);
                surface.stroke_polyline(&outline(rect), 2.0, accent, CompositeOp::SourceOver);
            }
            Chrome::Handle(rect) => {
                let rect = to_target.transform_rect_bbox(rect);
                surface.fill_rect(rect, SerializableColor::white().to_f32(), CompositeOp::SourceOver);
                surface.stroke_polyline(&outline(rect), 1.0, accent, CompositeOp::SourceOver);
            }
            Chrome::Toolbar(rect) => {
                let rect = to_target.transform_rect_bbox(rect);
                let panel = SerializableColor::white().with_alpha(245).to_f32();
                let edge = SerializableColor::new(210, 210, 210, 255).to_f32();
                surface.fill_rect(rect, panel, CompositeOp::SourceOver);
                surface.stroke_polyline(&outline(rect), 1.0, edge, CompositeOp::SourceOver);
            }
        }
    }
}

impl Renderer for RasterRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.region = ctx.region;
        self.background_color = ctx.background_color.into();
        self.selection_color = ctx.selection_color.into();
        self.scene = Scene::build(ctx);
    }
}

/// Closed polyline around `rect`, half a pixel inside its edges.
fn outline(rect: Rect) -> [Point; 5] {
    let r = Rect::new(rect.x0 + 0.5, rect.y0 + 0.5, rect.x1 - 0.5, rect.y1 - 0.5);
    [
        Point::new(r.x0, r.y0),
        Point::new(r.x1, r.y0),
        Point::new(r.x1, r.y1),
        Point::new(r.x0, r.y1),
        Point::new(r.x0, r.y0),
    ]
}
