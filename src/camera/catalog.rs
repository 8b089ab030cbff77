//! Device discovery and per-device configuration.

use crate::errors::CameraError;
use crate::platform::{CaptureDevice, CaptureFramework};
use crate::types::{DeviceType, FocusMode, MediaType, Position};
use std::fmt;
use std::sync::Arc;

/// Scoped configuration lock on a device; released on drop.
pub struct DeviceConfigLock<'a> {
    device: &'a dyn CaptureDevice,
}

impl<'a> DeviceConfigLock<'a> {
    pub fn acquire(device: &'a dyn CaptureDevice) -> Result<Self, CameraError> {
        device.lock_for_configuration()?;
        Ok(Self { device })
    }

    pub fn device(&self) -> &dyn CaptureDevice {
        self.device
    }
}

impl Drop for DeviceConfigLock<'_> {
    fn drop(&mut self) {
        self.device.unlock_for_configuration();
    }
}

/// The cameras the controller tracks, at most one per position.
#[derive(Clone, Default)]
pub struct DeviceCatalog {
    front: Option<Arc<dyn CaptureDevice>>,
    rear: Option<Arc<dyn CaptureDevice>>,
}

impl DeviceCatalog {
    /// Enumerate wide-angle video cameras and classify them by position.
    ///
    /// The first device found for a position wins. The rear camera is switched
    /// to continuous autofocus; failing to lock it aborts discovery.
    pub fn discover(framework: &dyn CaptureFramework) -> Result<Self, CameraError> {
        let devices =
            framework.discover_devices(&[DeviceType::BuiltInWideAngleCamera], MediaType::Video);
        if devices.is_empty() {
            return Err(CameraError::NoCamerasAvailable);
        }

        let mut catalog = Self::default();
        for device in devices {
            match device.position().classify() {
                Some(Position::Front) if catalog.front.is_none() => {
                    catalog.front = Some(device);
                }
                Some(Position::Rear) if catalog.rear.is_none() => {
                    configure_continuous_autofocus(&*device)?;
                    catalog.rear = Some(device);
                }
                Some(position) => {
                    log::debug!(
                        "Ignoring additional {} camera {}",
                        position,
                        device.unique_id()
                    );
                }
                None => {
                    log::debug!(
                        "Ignoring camera {} with unspecified position",
                        device.unique_id()
                    );
                }
            }
        }

        log::info!(
            "Discovered cameras: front={:?} rear={:?}",
            catalog.front.as_ref().map(|d| d.unique_id()),
            catalog.rear.as_ref().map(|d| d.unique_id())
        );
        Ok(catalog)
    }

    pub fn device(&self, position: Position) -> Option<&Arc<dyn CaptureDevice>> {
        match position {
            Position::Front => self.front.as_ref(),
            Position::Rear => self.rear.as_ref(),
        }
    }

    pub fn positions(&self) -> Vec<Position> {
        [Position::Front, Position::Rear]
            .into_iter()
            .filter(|p| self.device(*p).is_some())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.front.is_none() && self.rear.is_none()
    }
}

impl fmt::Debug for DeviceCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceCatalog")
            .field("front", &self.front.as_ref().map(|d| d.unique_id()))
            .field("rear", &self.rear.as_ref().map(|d| d.unique_id()))
            .finish()
    }
}

fn configure_continuous_autofocus(device: &dyn CaptureDevice) -> Result<(), CameraError> {
    let lock = DeviceConfigLock::acquire(device)?;
    if lock.device().is_focus_mode_supported(FocusMode::ContinuousAutoFocus) {
        lock.device().set_focus_mode(FocusMode::ContinuousAutoFocus);
    } else {
        log::debug!(
            "Camera {} does not support continuous autofocus",
            device.unique_id()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{SimulatedDevice, SimulatedFramework};

    #[test]
    fn test_empty_discovery_fails() {
        let framework = SimulatedFramework::builder().build();
        let result = DeviceCatalog::discover(&framework);
        assert_eq!(result.unwrap_err(), CameraError::NoCamerasAvailable);
    }

    #[test]
    fn test_first_device_per_position_wins() {
        let framework = SimulatedFramework::builder()
            .device(SimulatedDevice::front("front-a"))
            .device(SimulatedDevice::back("back-a"))
            .device(SimulatedDevice::front("front-b"))
            .device(SimulatedDevice::back("back-b"))
            .build();

        let catalog = DeviceCatalog::discover(&framework).unwrap();
        assert_eq!(catalog.device(Position::Front).unwrap().unique_id(), "front-a");
        assert_eq!(catalog.device(Position::Rear).unwrap().unique_id(), "back-a");

        // Only the retained rear camera is reconfigured.
        let skipped = framework.device("back-b").unwrap();
        assert_eq!(skipped.focus_mode(), FocusMode::AutoFocus);
    }

    #[test]
    fn test_rear_camera_gets_continuous_autofocus() {
        let framework = SimulatedFramework::builder()
            .device(SimulatedDevice::front("front"))
            .device(SimulatedDevice::back("back"))
            .build();

        DeviceCatalog::discover(&framework).unwrap();

        let rear = framework.device("back").unwrap();
        assert_eq!(rear.focus_mode(), FocusMode::ContinuousAutoFocus);
        assert!(!rear.is_locked());
        let front = framework.device("front").unwrap();
        assert_eq!(front.focus_mode(), FocusMode::AutoFocus);
    }

    #[test]
    fn test_rear_lock_failure_aborts_discovery() {
        let framework = SimulatedFramework::builder()
            .device(SimulatedDevice::back("back").with_lock_failure())
            .build();

        let result = DeviceCatalog::discover(&framework);
        assert!(matches!(result, Err(CameraError::DeviceConfiguration(_))));
    }

    #[test]
    fn test_unspecified_devices_are_not_classified() {
        let framework = SimulatedFramework::builder()
            .device(SimulatedDevice::external("usb"))
            .build();

        let catalog = DeviceCatalog::discover(&framework).unwrap();
        assert!(catalog.is_empty());
        assert!(catalog.positions().is_empty());
    }
}
