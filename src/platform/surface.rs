//! Rendering surface the live preview is inserted into.

use crate::types::{Rect, VideoGravity, VideoOrientation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Description of a live preview layer bound to one capture session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewLayer {
    pub session_id: Uuid,
    pub gravity: VideoGravity,
    pub orientation: VideoOrientation,
    pub frame: Rect,
}

impl PreviewLayer {
    pub fn new(session_id: Uuid) -> Self {
        Self {
            session_id,
            gravity: VideoGravity::ResizeAspectFill,
            orientation: VideoOrientation::Portrait,
            frame: Rect::default(),
        }
    }

    pub fn with_frame(mut self, frame: Rect) -> Self {
        self.frame = frame;
        self
    }
}

/// An opaque drawable owned by the UI layer.
pub trait RenderSurface {
    fn bounds(&self) -> Rect;

    /// Insert `layer` at `index` in the surface's layer stack; 0 is beneath
    /// all existing content.
    fn insert_layer(&mut self, layer: PreviewLayer, index: usize);
}
