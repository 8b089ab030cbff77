//! Testing utilities for saycheese
//!
//! A simulated capture framework that records every call the controller
//! makes and delivers hardware completions only when a test asks for them,
//! plus synthetic photo data and a render surface.

pub mod simulated;

pub use simulated::{SessionRecord, SimulatedDevice, SimulatedFramework, SimulatedFrameworkBuilder};

use crate::errors::CameraError;
use crate::platform::{PreviewLayer, RecordingDelegate, RenderSurface};
use crate::types::Rect;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::Path;

/// Encode a `width` x `height` gradient as JPEG, the way a photo sink
/// hands back its buffer.
pub fn synthetic_jpeg(width: u32, height: u32) -> Bytes {
    let image = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buffer = Vec::new();
    if let Err(e) =
        DynamicImage::ImageRgb8(image).write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
    {
        log::warn!("Failed to encode synthetic JPEG: {}", e);
    }
    Bytes::from(buffer)
}

/// A render surface that keeps its layer stack in memory.
#[derive(Debug, Default)]
pub struct SyntheticSurface {
    bounds: Rect,
    layers: Vec<PreviewLayer>,
}

impl SyntheticSurface {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            layers: Vec::new(),
        }
    }

    /// Layers from bottom to top
    pub fn layers(&self) -> &[PreviewLayer] {
        &self.layers
    }
}

impl RenderSurface for SyntheticSurface {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn insert_layer(&mut self, layer: PreviewLayer, index: usize) {
        let index = index.min(self.layers.len());
        self.layers.insert(index, layer);
    }
}

/// Ignores recording callbacks.
pub struct NullRecordingDelegate;

impl RecordingDelegate for NullRecordingDelegate {
    fn did_start_recording(&self, _path: &Path) {}

    fn did_finish_recording(&self, _path: &Path, _error: Option<CameraError>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_synthetic_jpeg_decodes() {
        let data = synthetic_jpeg(64, 48);
        let image = image::load_from_memory(&data).unwrap();
        assert_eq!((image.width(), image.height()), (64, 48));
    }

    #[test]
    fn test_surface_insert_clamps_index() {
        let mut surface = SyntheticSurface::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let first = PreviewLayer::new(Uuid::new_v4());
        let second = PreviewLayer::new(Uuid::new_v4());
        surface.insert_layer(first.clone(), 5);
        surface.insert_layer(second.clone(), 0);
        assert_eq!(surface.layers(), &[second, first]);
    }
}
