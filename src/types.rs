//! Core value types shared by the controller and the platform capability traits.

use chrono::{DateTime, Utc};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Camera position tracked by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Front,
    Rear,
}

impl Position {
    /// The opposite position, used by the input switcher.
    pub fn flipped(self) -> Self {
        match self {
            Position::Front => Position::Rear,
            Position::Rear => Position::Front,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Front => "front",
            Position::Rear => "rear",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position as reported by the hardware. External cameras report `Unspecified`
/// and are never classified by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DevicePosition {
    Front,
    Back,
    Unspecified,
}

impl DevicePosition {
    pub fn classify(self) -> Option<Position> {
        match self {
            DevicePosition::Front => Some(Position::Front),
            DevicePosition::Back => Some(Position::Rear),
            DevicePosition::Unspecified => None,
        }
    }
}

/// Kind of physical device to enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    BuiltInWideAngleCamera,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Video,
}

/// Flash mode attached to each photo request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    #[default]
    Off,
    On,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusMode {
    Locked,
    AutoFocus,
    ContinuousAutoFocus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StabilizationMode {
    Off,
    Standard,
    Cinematic,
    Auto,
}

/// How the preview layer scales video into its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoGravity {
    ResizeAspect,
    ResizeAspectFill,
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoOrientation {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Identifier of one photo request, echoed back by the hardware on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PhotoRequestId(pub u64);

impl fmt::Display for PhotoRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "photo#{}", self.0)
    }
}

/// Per-request capture settings handed to the photo sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoSettings {
    pub request_id: PhotoRequestId,
    pub flash_mode: FlashMode,
}

/// A decoded still photo.
#[derive(Debug, Clone)]
pub struct CapturedPhoto {
    pub request_id: PhotoRequestId,
    pub image: DynamicImage,
    pub flash_mode: FlashMode,
    pub captured_at: DateTime<Utc>,
}

impl CapturedPhoto {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// A finished recording handed off to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedVideo {
    pub path: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RecordedVideo {
    pub fn duration_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Outcome of a successful `prepare()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub position: Position,
    pub photo_output: bool,
    pub movie_output: bool,
}

/// What `start_recording` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingAction {
    Started(PathBuf),
    Stopping(PathBuf),
}
