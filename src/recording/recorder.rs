//! Start-of-recording procedure against the movie sink

use std::path::PathBuf;
use std::sync::Arc;

use crate::camera::catalog::DeviceConfigLock;
use crate::errors::CameraError;
use crate::platform::{CaptureDevice, MovieOutput, RecordingDelegate, TempFileProvider};
use crate::types::StabilizationMode;

/// Prepares the active connection and device, allocates a scratch file and
/// starts the movie sink writing to it.
pub struct MovieRecorder<'a> {
    output: &'a dyn MovieOutput,
    temp_files: &'a dyn TempFileProvider,
    extension: &'a str,
}

impl<'a> MovieRecorder<'a> {
    pub fn new(
        output: &'a dyn MovieOutput,
        temp_files: &'a dyn TempFileProvider,
        extension: &'a str,
    ) -> Self {
        Self {
            output,
            temp_files,
            extension,
        }
    }

    /// Start writing a new recording. `device` is the camera bound to the
    /// session's active input.
    pub fn start(
        &self,
        device: Option<&dyn CaptureDevice>,
        delegate: Arc<dyn RecordingDelegate>,
    ) -> Result<PathBuf, CameraError> {
        if self.output.is_video_stabilization_supported() {
            self.output
                .set_preferred_video_stabilization(StabilizationMode::Auto);
        }

        if let Some(device) = device {
            disable_smooth_autofocus(device);
        }

        let path = self.temp_files.allocate(self.extension)?;
        self.output.start_recording(&path, delegate);
        log::info!("Recording started: {:?}", path);
        Ok(path)
    }
}

fn disable_smooth_autofocus(device: &dyn CaptureDevice) {
    if !device.is_smooth_autofocus_supported() {
        return;
    }
    match DeviceConfigLock::acquire(device) {
        Ok(lock) => lock.device().set_smooth_autofocus_enabled(false),
        Err(e) => log::warn!(
            "Failed to configure camera {} for recording: {}",
            device.unique_id(),
            e
        ),
    }
}
