//! Corkboard Render Library
//!
//! Turns a board into pixels. [`Scene`] is a retained snapshot of what to
//! draw; [`RasterRenderer`] draws it in software and exports PNGs.

mod raster_impl;
mod renderer;
pub mod scene;
pub mod tape;

pub use raster_impl::{PngRenderResult, RasterRenderer};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};
pub use scene::{Chrome, DrawItem, NoteCard, Scene};
pub use tape::{MAX_NOTCH_DEPTH, NOTCHES_PER_END, SimpleRng, TornEdge, pattern_tile, render_tape, tape_band};
