//! Front/rear swap of the bound device input on a running session.

use super::catalog::DeviceCatalog;
use super::session::CaptureSession;
use crate::errors::CameraError;
use crate::platform::CaptureFramework;
use crate::types::Position;

/// Swap the bound input for the camera on the opposite side.
///
/// The whole swap runs inside one configuration transaction. If the hardware
/// refuses the new input, the previous input is bound again so the session is
/// never left without one. Should the hardware refuse that as well, the
/// session keeps running with no input and later switches fail with
/// `InvalidOperation`.
pub fn switch_camera(
    session: &mut CaptureSession,
    catalog: &DeviceCatalog,
    framework: &dyn CaptureFramework,
) -> Result<Position, CameraError> {
    if !session.is_running() {
        return Err(CameraError::CaptureSessionIsMissing);
    }
    let current = session.position().ok_or_else(|| {
        log::warn!("Running session has no bound input to switch from");
        CameraError::InvalidOperation
    })?;
    let target = current.flipped();

    session.configure(|session| {
        if !session.is_bound_input_present() {
            log::warn!("Bound {} input is no longer attached to the session", current);
            return Err(CameraError::InvalidOperation);
        }
        let device = catalog
            .device(target)
            .ok_or(CameraError::InvalidOperation)?;
        let input = framework.create_input(device)?;

        let previous = session.unbind().ok_or(CameraError::InvalidOperation)?;
        if session.try_bind(&input, target) {
            log::info!("Switched camera from {} to {}", current, target);
            return Ok(target);
        }

        log::warn!(
            "Session refused {} input, restoring {} input",
            target,
            previous.position
        );
        if !session.try_bind(&previous.input, previous.position) {
            log::error!(
                "Failed to restore {} input; session has no input",
                previous.position
            );
        }
        Err(CameraError::InvalidOperation)
    })
}
