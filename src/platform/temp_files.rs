//! Scratch file allocation for recordings.

use crate::errors::CameraError;
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

pub trait TempFileProvider: Send + Sync {
    /// Allocate a unique, not yet existing path with the given extension.
    /// The path stays valid until the recording that uses it completes.
    fn allocate(&self, extension: &str) -> Result<PathBuf, CameraError>;
}

/// Allocates `<uuid>.<ext>` names in the system temp directory, or in a
/// configured directory which is created on demand.
#[derive(Debug, Clone, Default)]
pub struct SystemTempFiles {
    directory: Option<PathBuf>,
}

impl SystemTempFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: Some(directory.into()),
        }
    }

    fn directory(&self) -> Result<PathBuf, CameraError> {
        match &self.directory {
            Some(dir) => {
                fs::create_dir_all(dir).map_err(|e| {
                    CameraError::Recording(format!(
                        "Failed to create temp directory {:?}: {}",
                        dir, e
                    ))
                })?;
                Ok(dir.clone())
            }
            None => {
                let dir = std::env::temp_dir();
                if dir.as_os_str().is_empty() {
                    return Err(CameraError::Recording(
                        "System temp directory is unavailable".to_string(),
                    ));
                }
                Ok(dir)
            }
        }
    }
}

impl TempFileProvider for SystemTempFiles {
    fn allocate(&self, extension: &str) -> Result<PathBuf, CameraError> {
        let path = self
            .directory()?
            .join(format!("{}.{}", Uuid::new_v4(), extension));
        log::debug!("Allocated recording path {:?}", path);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_in_system_temp() {
        let path = SystemTempFiles::new().allocate("mp4").unwrap();
        assert_eq!(path.parent().unwrap(), std::env::temp_dir().as_path());
        assert_eq!(path.extension().unwrap(), "mp4");
        assert!(!path.exists());
    }

    #[test]
    fn test_allocated_paths_are_unique() {
        let provider = SystemTempFiles::new();
        let first = provider.allocate("mov").unwrap();
        let second = provider.allocate("mov").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_configured_directory_is_created() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("recordings");
        let path = SystemTempFiles::in_directory(&dir).allocate("mp4").unwrap();
        assert!(dir.is_dir());
        assert!(path.starts_with(&dir));
    }
}
