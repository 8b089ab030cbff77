//! Tests for the recording module

#[cfg(test)]
mod recording_tests {
    use crate::platform::{CaptureDevice, MovieOutput, SystemTempFiles};
    use crate::recording::{MovieRecorder, RecordingMachine, RecordingState};
    use crate::testing::{NullRecordingDelegate, SimulatedDevice, SimulatedFramework};
    use crate::types::StabilizationMode;
    use crate::CaptureFramework;
    use std::path::PathBuf;
    use std::sync::Arc;

    #[test]
    fn test_machine_starts_idle() {
        let machine = RecordingMachine::default();
        assert_eq!(machine.state(), &RecordingState::Idle);
        assert!(machine.state().output_path().is_none());
    }

    #[test]
    fn test_stop_is_requested_once() {
        let mut machine = RecordingMachine::default();
        let path = PathBuf::from("/tmp/a.mp4");
        machine.begin(path.clone());

        assert_eq!(machine.request_stop(), Some(path.clone()));
        assert_eq!(machine.request_stop(), None);
        assert!(machine.state().is_recording());
        assert_eq!(machine.state().output_path(), Some(path.as_path()));
    }

    #[test]
    fn test_stop_while_idle_is_noop() {
        let mut machine = RecordingMachine::default();
        assert_eq!(machine.request_stop(), None);
        assert_eq!(machine.state(), &RecordingState::Idle);
    }

    #[test]
    fn test_finish_ignores_foreign_path() {
        let mut machine = RecordingMachine::default();
        machine.begin(PathBuf::from("/tmp/current.mp4"));

        assert!(machine.finish(&PathBuf::from("/tmp/stale.mp4")).is_none());
        assert!(machine.state().is_recording());

        assert!(machine.finish(&PathBuf::from("/tmp/current.mp4")).is_some());
        assert_eq!(machine.state(), &RecordingState::Idle);
    }

    #[test]
    fn test_expired_recording_can_be_claimed_once() {
        let mut machine = RecordingMachine::default();
        let path = PathBuf::from("/tmp/slow.mp4");
        machine.begin(path.clone());
        machine.request_stop();

        assert!(machine.expire(&path));
        assert_eq!(machine.state(), &RecordingState::Idle);
        assert!(machine.finish(&path).is_none());

        assert!(machine.take_expired(&PathBuf::from("/tmp/other.mp4")).is_none());
        assert!(machine.take_expired(&path).is_some());
        assert!(machine.take_expired(&path).is_none());
    }

    #[test]
    fn test_expire_ignores_inactive_recording() {
        let mut machine = RecordingMachine::default();
        let path = PathBuf::from("/tmp/done.mp4");
        machine.begin(path.clone());
        machine.finish(&path);

        assert!(!machine.expire(&path));
        assert!(machine.take_expired(&path).is_none());
    }

    #[test]
    fn test_recorder_prepares_connection_and_device() {
        let framework = SimulatedFramework::builder()
            .device(SimulatedDevice::back("back"))
            .build();
        let device = framework.device("back").unwrap();
        let movie = framework.create_movie_output();
        let temp = tempfile::tempdir().unwrap();
        let temp_files = SystemTempFiles::in_directory(temp.path());

        let recorder = MovieRecorder::new(&*movie, &temp_files, "mov");
        let path = recorder
            .start(Some(&*device as &dyn CaptureDevice), Arc::new(NullRecordingDelegate))
            .unwrap();

        assert!(path.starts_with(temp.path()));
        assert_eq!(path.extension().unwrap(), "mov");
        assert!(movie.is_recording());
        assert_eq!(framework.stabilization(), Some(StabilizationMode::Auto));
        assert!(!device.smooth_autofocus_enabled());
        assert!(!device.is_locked());
    }

    #[test]
    fn test_smooth_autofocus_lock_failure_is_not_fatal() {
        let framework = SimulatedFramework::builder()
            .device(SimulatedDevice::back("back"))
            .build();
        let device = framework.device("back").unwrap();
        device.set_lock_failure(true);
        let movie = framework.create_movie_output();
        let temp_files = SystemTempFiles::new();

        let recorder = MovieRecorder::new(&*movie, &temp_files, "mp4");
        let result = recorder.start(Some(&*device as &dyn CaptureDevice), Arc::new(NullRecordingDelegate));

        assert!(result.is_ok());
        assert!(device.smooth_autofocus_enabled());
    }
}
