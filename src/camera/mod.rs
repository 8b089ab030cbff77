//! Capture-session controller
//!
//! [`CameraController`] owns one capture session and serializes every
//! operation on it behind a single lock: preparation, preview attachment,
//! camera switching, photo capture and recording. Hardware completions
//! arrive on the framework's own callback context and take the same lock.
//! Caller-supplied completions are always invoked after the lock is released.

pub mod catalog;
pub mod deadline;
pub mod events;
pub mod photo;
pub mod preview;
pub mod session;
pub mod switcher;

pub use catalog::{DeviceCatalog, DeviceConfigLock};
pub use events::ControllerEvent;
pub use photo::PhotoCompletion;
pub use session::{BoundInput, CaptureSession};

use crate::config::ControllerConfig;
use crate::errors::CameraError;
use crate::platform::{
    CaptureFramework, PhotoCaptureDelegate, PreviewLayer, RecordingDelegate, RenderSurface,
    SystemTempFiles, TempFileProvider,
};
use crate::recording::{MovieRecorder, RecordingMachine, RecordingState};
use crate::types::{
    CapturedPhoto, FlashMode, PhotoRequestId, PhotoSettings, Position, RecordedVideo,
    RecordingAction, SessionSummary,
};
use bytes::Bytes;
use deadline::{Deadline, DeadlineTimer};
use events::EventChannel;
use photo::PendingPhotoRequest;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::oneshot;

struct ControllerState {
    config: ControllerConfig,
    session: Option<CaptureSession>,
    catalog: DeviceCatalog,
    photo: PendingPhotoRequest,
    recording: RecordingMachine,
    recording_deadline: Option<Deadline>,
    preview: Option<PreviewLayer>,
}

impl ControllerState {
    fn running_session(&self) -> Result<&CaptureSession, CameraError> {
        self.session
            .as_ref()
            .filter(|s| s.is_running())
            .ok_or(CameraError::CaptureSessionIsMissing)
    }
}

struct Shared {
    framework: Arc<dyn CaptureFramework>,
    temp_files: Arc<dyn TempFileProvider>,
    state: Mutex<ControllerState>,
    events: EventChannel,
    /// Started on first use; `None` if the worker could not be started.
    timer: OnceLock<Option<DeadlineTimer>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn delegate(self: &Arc<Self>) -> Arc<ControllerDelegate> {
        Arc::new(ControllerDelegate {
            shared: Arc::downgrade(self),
        })
    }

    fn prepare(&self) -> Result<SessionSummary, CameraError> {
        let outcome = {
            let mut state = self.lock();
            if state.session.as_ref().is_some_and(|s| s.is_running()) {
                Err(CameraError::CaptureSessionAlreadyRunning)
            } else {
                session::build_session(&*self.framework, &state.config).and_then(
                    |(session, catalog)| {
                        let summary = session.summary().ok_or(CameraError::InputsAreInvalid)?;
                        state.session = Some(session);
                        state.catalog = catalog;
                        Ok(summary)
                    },
                )
            }
        };

        match &outcome {
            Ok(summary) => self.events.emit(ControllerEvent::Prepared(summary.clone())),
            Err(e) => {
                log::error!("Failed to prepare capture session: {}", e);
                self.events.emit(ControllerEvent::PrepareFailed(e.clone()));
            }
        }
        outcome
    }

    /// Ask the movie sink to finish the active recording, once.
    fn request_stop(self: &Arc<Self>, state: &mut ControllerState) -> Option<PathBuf> {
        let path = state.recording.request_stop()?;
        match state.session.as_ref().and_then(|s| s.movie_output()) {
            Some(output) => output.stop_recording(),
            None => log::warn!("Recording {:?} has no movie output to stop", path),
        }
        if let Some(timeout) = state.config.recording_finish_timeout() {
            let expired = path.clone();
            state.recording_deadline =
                self.deadline(timeout, move |shared| shared.expire_recording(expired));
        }
        log::info!("Stopping recording {:?}", path);
        Some(path)
    }

    fn resolve_photo(&self, request_id: PhotoRequestId, result: Result<Option<Bytes>, CameraError>) {
        let pending = self.lock().photo.take(request_id);
        let Some(pending) = pending else {
            log::warn!("Discarding result for superseded {}", request_id);
            return;
        };
        log::debug!("{} resolved after {:?}", request_id, pending.issued_at.elapsed());
        let (completion, outcome) = pending.resolve(result);
        if let Err(e) = &outcome {
            log::warn!("{} failed: {}", request_id, e);
        }
        completion(outcome);
    }

    /// Run `task` after `delay` unless the returned deadline is dropped or
    /// the controller is gone by then.
    fn deadline(
        self: &Arc<Self>,
        delay: Duration,
        task: impl FnOnce(&Shared) + Send + 'static,
    ) -> Option<Deadline> {
        let timer = self
            .timer
            .get_or_init(|| {
                DeadlineTimer::start()
                    .map_err(|e| log::warn!("Failed to start deadline worker: {}", e))
                    .ok()
            })
            .as_ref()?;
        let weak = Arc::downgrade(self);
        Some(timer.after(delay, move || {
            if let Some(shared) = weak.upgrade() {
                task(&shared);
            }
        }))
    }

    fn expire_photo(&self, request_id: PhotoRequestId) {
        let pending = self.lock().photo.take(request_id);
        if let Some(pending) = pending {
            log::warn!("{} timed out", request_id);
            let (completion, outcome) =
                pending.fail(CameraError::Timeout(format!("{} did not resolve", request_id)));
            completion(outcome);
        }
    }

    fn recording_finished(&self, path: &Path, error: Option<CameraError>) {
        let (started_at, late) = {
            let mut state = self.lock();
            match state.recording.finish(path) {
                Some(started_at) => {
                    state.recording_deadline = None;
                    (started_at, false)
                }
                None => match state.recording.take_expired(path) {
                    Some(started_at) => (started_at, true),
                    None => {
                        log::warn!("Ignoring completion for inactive recording {:?}", path);
                        return;
                    }
                },
            }
        };
        if late {
            if let Some(error) = &error {
                // Already reported as timed out.
                log::warn!("Expired recording {:?} failed late: {}", path, error);
                return;
            }
            log::info!("Expired recording {:?} finished late", path);
        }

        match error {
            Some(error) => {
                log::error!("Error recording movie {:?}: {}", path, error);
                self.events.emit(ControllerEvent::RecordingFailed {
                    path: path.to_path_buf(),
                    error,
                });
            }
            None => {
                log::info!("Recording finished: {:?}", path);
                self.events
                    .emit(ControllerEvent::RecordingFinished(RecordedVideo {
                        path: path.to_path_buf(),
                        started_at,
                        finished_at: chrono::Utc::now(),
                    }));
            }
        }
    }

    fn expire_recording(&self, path: PathBuf) {
        let expired = {
            let mut state = self.lock();
            state.recording_deadline = None;
            state.recording.expire(&path)
        };
        if expired {
            log::warn!("Recording {:?} did not report completion in time", path);
            self.events.emit(ControllerEvent::RecordingFailed {
                path,
                error: CameraError::Timeout("recording did not finish".to_string()),
            });
        }
    }
}


/// Receives hardware completions. Holds only a weak reference so an
/// outstanding callback never keeps a dropped controller alive.
struct ControllerDelegate {
    shared: Weak<Shared>,
}

impl PhotoCaptureDelegate for ControllerDelegate {
    fn did_finish_processing_photo(
        &self,
        request_id: PhotoRequestId,
        result: Result<Option<Bytes>, CameraError>,
    ) {
        if let Some(shared) = self.shared.upgrade() {
            shared.resolve_photo(request_id, result);
        }
    }
}

impl RecordingDelegate for ControllerDelegate {
    fn did_start_recording(&self, path: &Path) {
        if let Some(shared) = self.shared.upgrade() {
            shared
                .events
                .emit(ControllerEvent::RecordingStarted(path.to_path_buf()));
        }
    }

    fn did_finish_recording(&self, path: &Path, error: Option<CameraError>) {
        if let Some(shared) = self.shared.upgrade() {
            shared.recording_finished(path, error);
        }
    }
}

/// Controller for one device capture session.
///
/// Cloning yields another handle to the same controller.
#[derive(Clone)]
pub struct CameraController {
    shared: Arc<Shared>,
}

impl CameraController {
    pub fn new(framework: Arc<dyn CaptureFramework>) -> Self {
        Self::from_parts(
            framework,
            ControllerConfig::default(),
            Arc::new(SystemTempFiles::new()),
        )
    }

    /// Create a controller with a validated configuration. Recordings go to
    /// `config.temp_directory` when set.
    pub fn with_config(
        framework: Arc<dyn CaptureFramework>,
        config: ControllerConfig,
    ) -> Result<Self, CameraError> {
        let temp_files = match &config.temp_directory {
            Some(dir) => SystemTempFiles::in_directory(dir),
            None => SystemTempFiles::new(),
        };
        Self::with_temp_files(framework, config, Arc::new(temp_files))
    }

    pub fn with_temp_files(
        framework: Arc<dyn CaptureFramework>,
        config: ControllerConfig,
        temp_files: Arc<dyn TempFileProvider>,
    ) -> Result<Self, CameraError> {
        config.validate()?;
        Ok(Self::from_parts(framework, config, temp_files))
    }

    fn from_parts(
        framework: Arc<dyn CaptureFramework>,
        config: ControllerConfig,
        temp_files: Arc<dyn TempFileProvider>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                framework,
                temp_files,
                state: Mutex::new(ControllerState {
                    config,
                    session: None,
                    catalog: DeviceCatalog::default(),
                    photo: PendingPhotoRequest::default(),
                    recording: RecordingMachine::default(),
                    recording_deadline: None,
                    preview: None,
                }),
                events: EventChannel::new(),
                timer: OnceLock::new(),
            }),
        }
    }

    /// Build and start the capture session on a blocking worker.
    ///
    /// The outcome is returned and also emitted as
    /// [`ControllerEvent::Prepared`] or [`ControllerEvent::PrepareFailed`].
    /// Other operations wait for an in-flight preparation to finish.
    pub async fn prepare(&self) -> Result<SessionSummary, CameraError> {
        let shared = self.shared.clone();
        tokio::task::spawn_blocking(move || shared.prepare())
            .await
            .map_err(|e| {
                log::error!("Session preparation task failed: {}", e);
                CameraError::Unknown
            })?
    }

    /// [`prepare`](Self::prepare) on the calling thread.
    pub fn prepare_blocking(&self) -> Result<SessionSummary, CameraError> {
        self.shared.prepare()
    }

    pub fn attach_preview(
        &self,
        surface: &mut dyn RenderSurface,
    ) -> Result<PreviewLayer, CameraError> {
        let mut state = self.shared.lock();
        let layer = preview::attach_preview(state.running_session()?, surface)?;
        state.preview = Some(layer.clone());
        Ok(layer)
    }

    /// Toggle the bound camera between front and rear.
    pub fn switch_camera(&self) -> Result<Position, CameraError> {
        let position = {
            let mut guard = self.shared.lock();
            let state = &mut *guard;
            let session = state
                .session
                .as_mut()
                .ok_or(CameraError::CaptureSessionIsMissing)?;
            switcher::switch_camera(session, &state.catalog, &*self.shared.framework)?
        };
        self.shared
            .events
            .emit(ControllerEvent::CameraSwitched(position));
        Ok(position)
    }

    /// Capture one still photo.
    ///
    /// `completion` is invoked at most once. Without a running session it is
    /// invoked immediately on this thread with `CaptureSessionIsMissing` and
    /// no hardware request is made. A request superseded by a newer
    /// `capture_image` call is dropped without its completion being invoked.
    pub fn capture_image<F>(&self, completion: F)
    where
        F: FnOnce(Result<CapturedPhoto, CameraError>) + Send + 'static,
    {
        let completion: PhotoCompletion = Box::new(completion);
        let rejected = {
            let mut guard = self.shared.lock();
            let state = &mut *guard;
            match state.running_session() {
                Err(e) => Some((completion, e)),
                Ok(session) => match session.photo_output().cloned() {
                    None => Some((completion, CameraError::OutputUnavailable("photo"))),
                    Some(output) => {
                        let flash_mode = state.config.flash_mode;
                        let (request_id, _) = state.photo.issue(flash_mode, completion);
                        log::debug!("Issuing {} with flash {:?}", request_id, flash_mode);
                        output.capture_photo(
                            PhotoSettings {
                                request_id,
                                flash_mode,
                            },
                            self.shared.delegate(),
                        );
                        if let Some(timeout) = state.config.photo_timeout() {
                            if let Some(deadline) = self
                                .shared
                                .deadline(timeout, move |shared| shared.expire_photo(request_id))
                            {
                                state.photo.arm(request_id, deadline);
                            }
                        }
                        None
                    }
                },
            }
        };

        if let Some((completion, error)) = rejected {
            log::warn!("Photo capture rejected: {}", error);
            completion(Err(error));
        }
    }

    /// Future-based [`capture_image`](Self::capture_image). A superseded
    /// request resolves with [`CameraError::PhotoRequestSuperseded`].
    pub async fn capture_image_async(&self) -> Result<CapturedPhoto, CameraError> {
        let (sender, receiver) = oneshot::channel();
        self.capture_image(move |result| {
            let _ = sender.send(result);
        });
        receiver
            .await
            .unwrap_or(Err(CameraError::PhotoRequestSuperseded))
    }

    /// Start recording to a fresh temporary file, or stop the active
    /// recording when one is in progress.
    pub fn start_recording(&self) -> Result<RecordingAction, CameraError> {
        let mut guard = self.shared.lock();
        let state = &mut *guard;

        if let Some(path) = state.recording.state().output_path().map(Path::to_path_buf) {
            self.shared.request_stop(state);
            return Ok(RecordingAction::Stopping(path));
        }

        let session = state.running_session()?;
        let output = session
            .movie_output()
            .ok_or(CameraError::OutputUnavailable("movie"))?;
        let device = session.bound_input().map(|b| b.input.device().clone());

        let recorder = MovieRecorder::new(
            &**output,
            &*self.shared.temp_files,
            &state.config.video_extension,
        );
        let path = recorder.start(device.as_deref(), self.shared.delegate())?;
        state.recording.begin(path.clone());
        Ok(RecordingAction::Started(path))
    }

    /// Ask the movie sink to finish the active recording. Returns the path
    /// being finalized, or `None` when idle or already stopping.
    pub fn stop_recording(&self) -> Option<PathBuf> {
        let mut guard = self.shared.lock();
        self.shared.request_stop(&mut guard)
    }

    pub fn current_position(&self) -> Option<Position> {
        self.shared
            .lock()
            .session
            .as_ref()
            .and_then(|s| s.position())
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().running_session().is_ok()
    }

    pub fn session_summary(&self) -> Option<SessionSummary> {
        self.shared.lock().session.as_ref().and_then(|s| s.summary())
    }

    pub fn available_positions(&self) -> Vec<Position> {
        self.shared.lock().catalog.positions()
    }

    pub fn recording_state(&self) -> RecordingState {
        self.shared.lock().recording.state().clone()
    }

    pub fn pending_photo_request(&self) -> Option<PhotoRequestId> {
        self.shared.lock().photo.pending_id()
    }

    pub fn preview_layer(&self) -> Option<PreviewLayer> {
        self.shared.lock().preview.clone()
    }

    pub fn flash_mode(&self) -> FlashMode {
        self.shared.lock().config.flash_mode
    }

    /// Applies to photo requests issued after this call.
    pub fn set_flash_mode(&self, flash_mode: FlashMode) {
        self.shared.lock().config.flash_mode = flash_mode;
    }

    pub fn config(&self) -> ControllerConfig {
        self.shared.lock().config.clone()
    }

    /// Photo and recording deadlines still armed
    pub fn armed_deadlines(&self) -> usize {
        self.shared
            .timer
            .get()
            .and_then(Option::as_ref)
            .map_or(0, DeadlineTimer::armed)
    }

    /// Next controller event without waiting.
    ///
    /// Events are kept until read, up to
    /// [`EVENT_BACKLOG`](events::EVENT_BACKLOG); beyond that the oldest
    /// unread event is dropped.
    pub fn poll_event(&self) -> Option<ControllerEvent> {
        self.shared.events.poll()
    }

    /// Wait for the next controller event
    pub async fn wait_for_event(&self) -> Option<ControllerEvent> {
        self.shared.events.wait().await
    }
}
