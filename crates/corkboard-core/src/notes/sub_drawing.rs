//! The private raster layer carried by each note.

use crate::raster::Surface;
use crate::strokes::InkStroke;
use base64::{Engine, engine::general_purpose::STANDARD};
use image::ImageFormat;
use std::io::Cursor;
use thiserror::Error;

const DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Errors from encoding or decoding a sub-drawing.
#[derive(Debug, Error)]
pub enum SubDrawingError {
    #[error("not a PNG data URL")]
    InvalidDataUrl,
    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Ink drawn directly on a note, in the note's own pixel space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubDrawing {
    surface: Surface,
}

impl SubDrawing {
    /// Blank drawing covering a `width` × `height` note.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surface: Surface::new(width, height),
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    pub fn is_blank(&self) -> bool {
        self.surface.is_blank()
    }

    /// Rasterise a finished stroke. Points are note-local.
    pub fn draw_stroke(&mut self, stroke: &InkStroke) {
        self.surface.draw_ink(stroke.points(), &stroke.style(), stroke.tool);
    }

    pub fn clear(&mut self) {
        self.surface.clear();
    }

    /// Resampled copy stretched to a new note size.
    pub fn resized(&self, width: u32, height: u32) -> Self {
        Self {
            surface: self.surface.resized(width, height),
        }
    }

    /// Encode as a PNG data URL. A blank drawing encodes to `None`.
    pub fn to_data_url(&self) -> Result<Option<String>, SubDrawingError> {
        if self.is_blank() {
            return Ok(None);
        }
        let mut bytes = Vec::new();
        self.surface
            .image()
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(Some(format!("{}{}", DATA_URL_PREFIX, STANDARD.encode(&bytes))))
    }

    /// Decode a PNG data URL, stretching it to `width` × `height` if the
    /// stored image has a different size.
    pub fn from_data_url(url: &str, width: u32, height: u32) -> Result<Self, SubDrawingError> {
        let encoded = url
            .strip_prefix(DATA_URL_PREFIX)
            .ok_or(SubDrawingError::InvalidDataUrl)?;
        let bytes = STANDARD.decode(encoded.trim())?;
        let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png)?.to_rgba8();
        let drawing = Self {
            surface: Surface::from_image(image),
        };
        Ok(drawing.resized(width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strokes::{InkStyle, InkTool};
    use kurbo::Point;

    fn scribble(drawing: &mut SubDrawing) {
        let style = InkStyle::for_tool(InkTool::Marker);
        let mut stroke = InkStroke::begin(InkTool::Marker, Point::new(10.0, 10.0), &style);
        stroke.extend(Point::new(60.0, 40.0));
        drawing.draw_stroke(&stroke);
    }

    #[test]
    fn test_blank_encodes_to_none() {
        let drawing = SubDrawing::new(50, 50);
        assert_eq!(drawing.to_data_url().unwrap(), None);
    }

    #[test]
    fn test_data_url_roundtrip() {
        let mut drawing = SubDrawing::new(80, 60);
        scribble(&mut drawing);
        let url = drawing.to_data_url().unwrap().unwrap();
        assert!(url.starts_with(DATA_URL_PREFIX));
        let back = SubDrawing::from_data_url(&url, 80, 60).unwrap();
        assert_eq!(back, drawing);
    }

    #[test]
    fn test_decode_stretches_to_size() {
        let mut drawing = SubDrawing::new(80, 60);
        scribble(&mut drawing);
        let url = drawing.to_data_url().unwrap().unwrap();
        let back = SubDrawing::from_data_url(&url, 160, 120).unwrap();
        assert_eq!((back.width(), back.height()), (160, 120));
        assert!(!back.is_blank());
    }

    #[test]
    fn test_corrupt_data_is_error() {
        assert!(matches!(
            SubDrawing::from_data_url("nonsense", 10, 10),
            Err(SubDrawingError::InvalidDataUrl)
        ));
        assert!(SubDrawing::from_data_url("data:image/png;base64,@@@", 10, 10).is_err());
        assert!(SubDrawing::from_data_url("data:image/png;base64,AAAA", 10, 10).is_err());
    }

    #[test]
    fn test_resize_keeps_ink() {
        let mut drawing = SubDrawing::new(100, 100);
        scribble(&mut drawing);
        let smaller = drawing.resized(50, 50);
        assert!(!smaller.is_blank());
        assert_eq!(smaller.width(), 50);
    }
}
