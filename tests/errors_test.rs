#[cfg(test)]
mod error_tests {
    use saycheese::errors::CameraError;
    use std::error::Error;

    #[test]
    fn test_session_kinds_display() {
        assert_eq!(
            CameraError::CaptureSessionIsMissing.to_string(),
            "Capture session is missing or not running"
        );
        assert_eq!(
            CameraError::NoCamerasAvailable.to_string(),
            "No cameras available"
        );
        assert!(CameraError::InputsAreInvalid
            .to_string()
            .contains("device input"));
    }

    #[test]
    fn test_detail_is_included_in_message() {
        let error = CameraError::DeviceConfiguration("busy".to_string());
        assert_eq!(error.to_string(), "Device configuration error: busy");

        let error = CameraError::OutputUnavailable("movie");
        assert!(error.to_string().contains("movie output"));
    }

    #[test]
    fn test_camera_error_debug_format() {
        let error = CameraError::Recording("disk full".to_string());
        let debug_str = format!("{:?}", error);
        assert!(debug_str.contains("Recording"));
        assert!(debug_str.contains("disk full"));
    }

    #[test]
    fn test_camera_error_implements_error_trait() {
        let error = CameraError::Timeout("photo#1 did not resolve".to_string());
        let _error_trait: &dyn Error = &error;
        assert!(error.source().is_none());
    }

    #[test]
    fn test_errors_are_cloneable_and_comparable() {
        let error = CameraError::Capture("sensor fault".to_string());
        assert_eq!(error.clone(), error);
        assert_ne!(error, CameraError::Capture("other".to_string()));
        assert_ne!(CameraError::Unknown, CameraError::InvalidOperation);
    }

    #[test]
    fn test_all_error_variants_have_messages() {
        let errors = vec![
            CameraError::CaptureSessionAlreadyRunning,
            CameraError::CaptureSessionIsMissing,
            CameraError::InputsAreInvalid,
            CameraError::InvalidOperation,
            CameraError::NoCamerasAvailable,
            CameraError::Unknown,
            CameraError::DeviceConfiguration("a".to_string()),
            CameraError::InputCreation("b".to_string()),
            CameraError::Capture("c".to_string()),
            CameraError::Recording("d".to_string()),
            CameraError::OutputUnavailable("photo"),
            CameraError::Timeout("e".to_string()),
            CameraError::PhotoRequestSuperseded,
            CameraError::Config("f".to_string()),
        ];

        for error in errors {
            assert!(!error.to_string().is_empty(), "{:?} has no message", error);
        }
    }
}
