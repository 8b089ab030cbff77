use thiserror::Error;

/// Failure kinds shared by every part of the capture controller.
///
/// Errors are `Clone` so a single failure can be delivered through both a
/// completion callback and the controller event channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    /// Reserved. Only raised when `prepare()` is called on a controller whose
    /// session is already running.
    #[error("Capture session is already running")]
    CaptureSessionAlreadyRunning,
    #[error("Capture session is missing or not running")]
    CaptureSessionIsMissing,
    #[error("No device input could be added to the capture session")]
    InputsAreInvalid,
    #[error("Invalid camera operation")]
    InvalidOperation,
    #[error("No cameras available")]
    NoCamerasAvailable,
    /// The hardware reported success but produced nothing usable.
    #[error("Unknown capture error")]
    Unknown,
    #[error("Device configuration error: {0}")]
    DeviceConfiguration(String),
    #[error("Device input error: {0}")]
    InputCreation(String),
    #[error("Capture error: {0}")]
    Capture(String),
    #[error("Recording error: {0}")]
    Recording(String),
    #[error("Output unavailable: {0} output is not attached to the session")]
    OutputUnavailable(&'static str),
    #[error("Timed out: {0}")]
    Timeout(String),
    #[error("Photo request was superseded by a newer request")]
    PhotoRequestSuperseded,
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CameraError>;
