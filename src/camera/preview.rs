use super::session::CaptureSession;
use crate::errors::CameraError;
use crate::platform::{PreviewLayer, RenderSurface};

/// Insert a live preview of `session` beneath the surface's existing content,
/// sized to the surface's current bounds. Later bounds changes are not tracked.
pub fn attach_preview(
    session: &CaptureSession,
    surface: &mut dyn RenderSurface,
) -> Result<PreviewLayer, CameraError> {
    if !session.is_running() {
        return Err(CameraError::CaptureSessionIsMissing);
    }

    let layer = PreviewLayer::new(session.id()).with_frame(surface.bounds());
    surface.insert_layer(layer.clone(), 0);
    log::debug!("Attached preview for session {} at {:?}", session.id(), layer.frame);
    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::session::build_session;
    use crate::config::ControllerConfig;
    use crate::testing::{SimulatedDevice, SimulatedFramework, SyntheticSurface};
    use crate::types::{Rect, VideoGravity, VideoOrientation};

    #[test]
    fn test_preview_goes_beneath_existing_layers() {
        let framework = SimulatedFramework::builder()
            .device(SimulatedDevice::back("back"))
            .build();
        let (session, _) = build_session(&framework, &ControllerConfig::default()).unwrap();

        let bounds = Rect::new(0.0, 0.0, 390.0, 844.0);
        let mut surface = SyntheticSurface::new(bounds);
        let overlay = crate::platform::PreviewLayer::new(uuid::Uuid::nil());
        surface.insert_layer(overlay.clone(), 0);

        let layer = attach_preview(&session, &mut surface).unwrap();

        assert_eq!(layer.frame, bounds);
        assert_eq!(layer.gravity, VideoGravity::ResizeAspectFill);
        assert_eq!(layer.orientation, VideoOrientation::Portrait);
        assert_eq!(surface.layers(), &[layer, overlay]);
    }
}
