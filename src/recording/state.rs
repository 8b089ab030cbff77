//! Idle/Recording state machine

use crate::assert_invariant;
use crate::invariant_ppt::RECORDING_HAS_PATH;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Recording state as seen by callers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording {
        /// Temporary file the sink is writing to
        path: PathBuf,
        started_at: DateTime<Utc>,
        /// A stop was issued and the finish callback is outstanding
        stop_requested: bool,
    },
}

impl RecordingState {
    pub fn is_recording(&self) -> bool {
        matches!(self, RecordingState::Recording { .. })
    }

    pub fn output_path(&self) -> Option<&Path> {
        match self {
            RecordingState::Recording { path, .. } => Some(path),
            RecordingState::Idle => None,
        }
    }
}

/// Owns the recording state; the only place it is mutated.
#[derive(Debug, Default)]
pub struct RecordingMachine {
    state: RecordingState,
    /// Last recording given up on after its finish deadline, with its start
    /// time. The sink may still report it finished.
    expired: Option<(PathBuf, DateTime<Utc>)>,
}

impl RecordingMachine {
    pub fn state(&self) -> &RecordingState {
        &self.state
    }

    pub fn begin(&mut self, path: PathBuf) {
        assert_invariant!(
            !self.state.is_recording(),
            RECORDING_HAS_PATH,
            "recording"
        );
        self.state = RecordingState::Recording {
            path,
            started_at: Utc::now(),
            stop_requested: false,
        };
    }

    /// Mark the active recording as stopping. Returns the path when the sink
    /// still has to be told to stop; `None` when idle or already stopping.
    pub fn request_stop(&mut self) -> Option<PathBuf> {
        match &mut self.state {
            RecordingState::Recording {
                path,
                stop_requested,
                ..
            } if !*stop_requested => {
                *stop_requested = true;
                Some(path.clone())
            }
            _ => None,
        }
    }

    /// Return to Idle if `path` is the active recording. Yields the start
    /// time of the finished recording.
    pub fn finish(&mut self, path: &Path) -> Option<DateTime<Utc>> {
        match &self.state {
            RecordingState::Recording {
                path: active,
                started_at,
                ..
            } if active == path => {
                let started_at = *started_at;
                self.state = RecordingState::Idle;
                Some(started_at)
            }
            _ => None,
        }
    }

    /// Give up on the active recording at `path` and return to Idle. The
    /// path is remembered so a late completion can still be handed off.
    pub fn expire(&mut self, path: &Path) -> bool {
        match self.finish(path) {
            Some(started_at) => {
                self.expired = Some((path.to_path_buf(), started_at));
                true
            }
            None => false,
        }
    }

    /// Claim a late completion for an expired recording. Yields its start
    /// time once.
    pub fn take_expired(&mut self, path: &Path) -> Option<DateTime<Utc>> {
        match &self.expired {
            Some((expired, started_at)) if expired == path => {
                let started_at = *started_at;
                self.expired = None;
                Some(started_at)
            }
            _ => None,
        }
    }
}
