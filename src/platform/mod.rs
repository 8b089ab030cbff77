//! Capability surface of the hardware capture framework
//!
//! The controller never talks to a driver directly. A backend implements
//! [`CaptureFramework`] and hands out devices, sessions and output sinks;
//! completions come back through [`PhotoCaptureDelegate`] and
//! [`RecordingDelegate`].
//!
//! # Callback contract
//! Delegates must be invoked on the framework's own callback context. A
//! backend must never call a delegate re-entrantly from inside
//! `capture_photo`, `start_recording` or `stop_recording`.

pub mod surface;
pub mod temp_files;

pub use surface::{PreviewLayer, RenderSurface};
pub use temp_files::{SystemTempFiles, TempFileProvider};

use crate::errors::CameraError;
use crate::types::{
    DevicePosition, DeviceType, FocusMode, MediaType, PhotoRequestId, PhotoSettings,
    StabilizationMode,
};
use bytes::Bytes;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// One physical camera.
pub trait CaptureDevice: Send + Sync + fmt::Debug {
    fn unique_id(&self) -> &str;

    fn localized_name(&self) -> &str;

    fn position(&self) -> DevicePosition;

    /// Acquire exclusive access to the device settings.
    fn lock_for_configuration(&self) -> Result<(), CameraError>;

    fn unlock_for_configuration(&self);

    fn is_focus_mode_supported(&self, mode: FocusMode) -> bool;

    /// Only valid while the configuration lock is held.
    fn set_focus_mode(&self, mode: FocusMode);

    fn is_smooth_autofocus_supported(&self) -> bool;

    /// Only valid while the configuration lock is held.
    fn set_smooth_autofocus_enabled(&self, enabled: bool);
}

/// Binding of a device into a capture session.
#[derive(Clone)]
pub struct DeviceInput {
    id: Uuid,
    device: Arc<dyn CaptureDevice>,
}

impl DeviceInput {
    pub fn new(device: Arc<dyn CaptureDevice>) -> Self {
        Self {
            id: Uuid::new_v4(),
            device,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn device(&self) -> &Arc<dyn CaptureDevice> {
        &self.device
    }
}

impl PartialEq for DeviceInput {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DeviceInput {}

impl fmt::Debug for DeviceInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceInput")
            .field("id", &self.id)
            .field("device", &self.device.unique_id())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Photo,
    Movie,
}

impl OutputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputKind::Photo => "photo",
            OutputKind::Movie => "movie",
        }
    }
}

/// A consumer of the session's stream.
#[derive(Clone)]
pub enum OutputSink {
    Photo(Arc<dyn PhotoOutput>),
    Movie(Arc<dyn MovieOutput>),
}

impl OutputSink {
    pub fn kind(&self) -> OutputKind {
        match self {
            OutputSink::Photo(_) => OutputKind::Photo,
            OutputSink::Movie(_) => OutputKind::Movie,
        }
    }
}

impl fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutputSink({})", self.kind().as_str())
    }
}

/// The live pipeline owned by the controller.
///
/// The hardware accepts at most one device input; a new input can only be
/// added after the previous one was removed.
pub trait SessionBackend: Send {
    fn begin_configuration(&mut self);

    fn commit_configuration(&mut self);

    fn can_add_input(&self, input: &DeviceInput) -> bool;

    fn add_input(&mut self, input: &DeviceInput);

    fn remove_input(&mut self, input: &DeviceInput);

    /// Ids of the inputs currently bound.
    fn inputs(&self) -> Vec<Uuid>;

    fn can_add_output(&self, output: &OutputSink) -> bool;

    fn add_output(&mut self, output: &OutputSink);

    fn start_running(&mut self);

    fn stop_running(&mut self);

    fn is_running(&self) -> bool;
}

/// Still-photo sink.
pub trait PhotoOutput: Send + Sync {
    /// Issue one capture. The delegate receives exactly one resolution for
    /// `settings.request_id`, unless the hardware fails silently.
    fn capture_photo(&self, settings: PhotoSettings, delegate: Arc<dyn PhotoCaptureDelegate>);
}

pub trait PhotoCaptureDelegate: Send + Sync {
    /// `Ok(Some(data))` carries the encoded photo, `Ok(None)` means the
    /// hardware produced no buffer.
    fn did_finish_processing_photo(
        &self,
        request_id: PhotoRequestId,
        result: Result<Option<Bytes>, CameraError>,
    );
}

/// Movie file sink.
pub trait MovieOutput: Send + Sync {
    fn is_video_stabilization_supported(&self) -> bool;

    fn set_preferred_video_stabilization(&self, mode: StabilizationMode);

    fn start_recording(&self, path: &Path, delegate: Arc<dyn RecordingDelegate>);

    fn stop_recording(&self);

    fn is_recording(&self) -> bool;
}

pub trait RecordingDelegate: Send + Sync {
    fn did_start_recording(&self, path: &Path);

    /// Called once per recording, whether it succeeded or not.
    fn did_finish_recording(&self, path: &Path, error: Option<CameraError>);
}

/// Entry point of a hardware backend.
pub trait CaptureFramework: Send + Sync {
    /// Enumerate devices of the given types regardless of position, in the
    /// hardware catalog's order.
    fn discover_devices(
        &self,
        device_types: &[DeviceType],
        media_type: MediaType,
    ) -> Vec<Arc<dyn CaptureDevice>>;

    fn create_input(&self, device: &Arc<dyn CaptureDevice>) -> Result<DeviceInput, CameraError> {
        Ok(DeviceInput::new(device.clone()))
    }

    fn create_session(&self) -> Box<dyn SessionBackend>;

    fn create_photo_output(&self) -> Arc<dyn PhotoOutput>;

    fn create_movie_output(&self) -> Arc<dyn MovieOutput>;
}
