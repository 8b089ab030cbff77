//! Tests for saycheese core types

use saycheese::types::{
    DevicePosition, FlashMode, PhotoRequestId, Position, Rect, RecordedVideo, SessionSummary,
};

#[cfg(test)]
mod position_tests {
    use super::*;

    #[test]
    fn test_flip_is_an_involution() {
        for position in [Position::Front, Position::Rear] {
            assert_ne!(position.flipped(), position);
            assert_eq!(position.flipped().flipped(), position);
        }
    }

    #[test]
    fn test_position_display() {
        assert_eq!(Position::Front.to_string(), "front");
        assert_eq!(Position::Rear.to_string(), "rear");
    }

    #[test]
    fn test_device_position_classification() {
        assert_eq!(DevicePosition::Front.classify(), Some(Position::Front));
        assert_eq!(DevicePosition::Back.classify(), Some(Position::Rear));
        assert_eq!(DevicePosition::Unspecified.classify(), None);
    }

    #[test]
    fn test_position_serialization() {
        let json = serde_json::to_string(&Position::Rear).unwrap();
        assert_eq!(json, "\"rear\"");

        let deserialized: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, Position::Rear);
    }
}

#[cfg(test)]
mod capture_type_tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::path::PathBuf;
    use uuid::Uuid;

    #[test]
    fn test_flash_defaults_off() {
        assert_eq!(FlashMode::default(), FlashMode::Off);
        assert_eq!(serde_json::to_string(&FlashMode::Auto).unwrap(), "\"auto\"");
    }

    #[test]
    fn test_photo_request_ids_order_and_display() {
        assert!(PhotoRequestId(2) > PhotoRequestId(1));
        assert_eq!(PhotoRequestId(7).to_string(), "photo#7");
    }

    #[test]
    fn test_recorded_video_duration() {
        let started_at = Utc::now();
        let video = RecordedVideo {
            path: PathBuf::from("/tmp/clip.mp4"),
            started_at,
            finished_at: started_at + Duration::milliseconds(2500),
        };
        assert!((video.duration_secs() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_session_summary_serialization() {
        let summary = SessionSummary {
            session_id: Uuid::new_v4(),
            position: Position::Front,
            photo_output: true,
            movie_output: false,
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"position\":\"front\""));

        let deserialized: SessionSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, summary);
    }

    #[test]
    fn test_rect_default_is_empty() {
        let rect = Rect::default();
        assert_eq!(rect, Rect::new(0.0, 0.0, 0.0, 0.0));
    }
}
