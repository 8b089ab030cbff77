//! saycheese: capture-session controller for device cameras
//!
//! This crate drives a device camera through an abstract hardware capture
//! framework: it builds one capture session, binds the front or rear camera,
//! attaches a live preview, switches cameras transactionally, captures still
//! photos and records video to temporary files.
//!
//! # Features
//! - One-shot session preparation on a background worker
//! - Front/rear switching that never leaves the session without a camera
//! - Single-slot still photo requests with decoded results
//! - Toggle-style video recording with start/finish events
//! - An in-memory simulated framework for offline testing
//!
//! # Usage
//! ```rust,ignore
//! use std::sync::Arc;
//! use saycheese::{CameraController, ControllerEvent};
//!
//! let controller = CameraController::new(Arc::new(my_framework));
//! let summary = controller.prepare().await?;
//! controller.attach_preview(&mut view)?;
//!
//! controller.capture_image(|result| match result {
//!     Ok(photo) => println!("{}x{}", photo.width(), photo.height()),
//!     Err(e) => eprintln!("capture failed: {}", e),
//! });
//!
//! controller.start_recording()?;
//! // ...
//! controller.start_recording()?; // toggles off
//! if let Some(ControllerEvent::RecordingFinished(video)) = controller.wait_for_event().await {
//!     println!("saved {:?}", video.path);
//! }
//! ```
pub mod camera;
pub mod config;
pub mod errors;
pub mod invariant_ppt;
pub mod platform;
pub mod recording;
pub mod types;

// Testing utilities - simulated hardware for offline testing
pub mod testing;

// Re-exports for convenience
pub use camera::{CameraController, ControllerEvent};
pub use config::ControllerConfig;
pub use errors::{CameraError, Result};
pub use platform::{
    CaptureDevice, CaptureFramework, DeviceInput, MovieOutput, OutputKind, OutputSink,
    PhotoCaptureDelegate, PhotoOutput, PreviewLayer, RecordingDelegate, RenderSurface,
    SessionBackend, SystemTempFiles, TempFileProvider,
};
pub use recording::RecordingState;
pub use types::{
    CapturedPhoto, FlashMode, PhotoRequestId, Position, RecordedVideo, RecordingAction,
    SessionSummary,
};

/// Initialize logging for the capture controller
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "saycheese=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}

#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn test_crate_info() {
        let info = get_info();
        assert_eq!(info.name, "saycheese");
        assert!(!info.version.is_empty());
        assert!(!info.description.is_empty());
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging();
        init_logging();
        assert!(std::env::var("RUST_LOG").is_ok());
    }
}
