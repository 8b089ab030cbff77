//! Configuration management for the capture controller
//!
//! Provides loading, saving and validation of the controller's runtime
//! options: flash mode, input preference, callback deadlines and where
//! recording files are written.

use crate::errors::CameraError;
use crate::types::{FlashMode, Position};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAX_TIMEOUT_MS: u64 = 60 * 60 * 1000;

/// Controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Flash mode attached to every photo request
    pub flash_mode: FlashMode,
    /// Position bound first by `prepare()` when both cameras exist
    pub preferred_position: Position,
    /// Deadline for a pending photo request in milliseconds (0 disables)
    pub photo_timeout_ms: u64,
    /// Deadline for the recording finish callback after a stop (0 disables)
    pub recording_finish_timeout_ms: u64,
    /// Directory for recording files; the system temp directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_directory: Option<PathBuf>,
    /// Extension of generated recording files, without the dot
    pub video_extension: String,
    /// Attach a photo sink during `prepare()`
    pub attach_photo_output: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            flash_mode: FlashMode::Off,
            preferred_position: Position::Front,
            photo_timeout_ms: 10_000,
            recording_finish_timeout_ms: 15_000,
            temp_directory: None,
            video_extension: "mp4".to_string(),
            attach_photo_output: true,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CameraError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| CameraError::Config(format!("Failed to read config file: {}", e)))?;

        let config: ControllerConfig = toml::from_str(&contents)
            .map_err(|e| CameraError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CameraError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CameraError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| CameraError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| CameraError::Config(format!("Failed to write config file: {}", e)))?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), CameraError> {
        if self.video_extension.is_empty() || self.video_extension.contains('.') {
            return Err(CameraError::Config(
                "Video extension must be non-empty and must not contain '.'".to_string(),
            ));
        }
        if self.photo_timeout_ms > MAX_TIMEOUT_MS {
            return Err(CameraError::Config(
                "Photo timeout must not exceed one hour".to_string(),
            ));
        }
        if self.recording_finish_timeout_ms > MAX_TIMEOUT_MS {
            return Err(CameraError::Config(
                "Recording finish timeout must not exceed one hour".to_string(),
            ));
        }
        Ok(())
    }

    pub fn photo_timeout(&self) -> Option<Duration> {
        (self.photo_timeout_ms > 0).then(|| Duration::from_millis(self.photo_timeout_ms))
    }

    pub fn recording_finish_timeout(&self) -> Option<Duration> {
        (self.recording_finish_timeout_ms > 0)
            .then(|| Duration::from_millis(self.recording_finish_timeout_ms))
    }

    pub fn with_flash_mode(mut self, flash_mode: FlashMode) -> Self {
        self.flash_mode = flash_mode;
        self
    }

    pub fn with_temp_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_directory = Some(dir.into());
        self
    }

    pub fn with_photo_timeout_ms(mut self, ms: u64) -> Self {
        self.photo_timeout_ms = ms;
        self
    }

    pub fn with_recording_finish_timeout_ms(mut self, ms: u64) -> Self {
        self.recording_finish_timeout_ms = ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ControllerConfig::default();
        assert_eq!(config.flash_mode, FlashMode::Off);
        assert_eq!(config.preferred_position, Position::Front);
        assert_eq!(config.video_extension, "mp4");
        assert!(config.attach_photo_output);
    }

    #[test]
    fn test_config_validation() {
        let config = ControllerConfig::default();
        assert!(config.validate().is_ok());

        let mut bad_ext = config.clone();
        bad_ext.video_extension = ".mov".to_string();
        assert!(bad_ext.validate().is_err());

        let bad_timeout = ControllerConfig::default().with_photo_timeout_ms(MAX_TIMEOUT_MS + 1);
        assert!(matches!(bad_timeout.validate(), Err(CameraError::Config(_))));
    }

    #[test]
    fn test_zero_timeout_disables_deadline() {
        let config = ControllerConfig::default()
            .with_photo_timeout_ms(0)
            .with_recording_finish_timeout_ms(0);
        assert!(config.photo_timeout().is_none());
        assert!(config.recording_finish_timeout().is_none());
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("nested").join("saycheese.toml");

        let config = ControllerConfig::default().with_flash_mode(FlashMode::Auto);
        assert!(config.save_to_file(&config_path).is_ok());

        let loaded = ControllerConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ControllerConfig = toml::from_str("flash_mode = \"on\"").unwrap();
        assert_eq!(config.flash_mode, FlashMode::On);
        assert_eq!(config.photo_timeout_ms, 10_000);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ControllerConfig::load_from_file("nonexistent_saycheese.toml");
        assert_eq!(result.unwrap(), ControllerConfig::default());
    }
}
