//! In-memory capture framework
//!
//! Behaves like the hardware as far as the controller can observe: one
//! session at a time, at most one input per session, and completions that
//! are delivered only when the test asks for them. Every call the
//! controller makes is recorded for later assertions.

use crate::errors::CameraError;
use crate::platform::{
    CaptureDevice, CaptureFramework, DeviceInput, MovieOutput, OutputKind, OutputSink,
    PhotoCaptureDelegate, PhotoOutput, RecordingDelegate, SessionBackend,
};
use crate::types::{
    DevicePosition, DeviceType, FocusMode, MediaType, PhotoRequestId, PhotoSettings,
    StabilizationMode,
};
use bytes::Bytes;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// A camera with observable configuration state.
pub struct SimulatedDevice {
    id: String,
    name: String,
    position: DevicePosition,
    lock_failure: AtomicBool,
    locked: AtomicBool,
    focus_mode: Mutex<FocusMode>,
    smooth_autofocus_supported: bool,
    smooth_autofocus: AtomicBool,
}

impl SimulatedDevice {
    fn new(id: &str, position: DevicePosition) -> Self {
        Self {
            id: id.to_string(),
            name: format!("Simulated {} camera", id),
            position,
            lock_failure: AtomicBool::new(false),
            locked: AtomicBool::new(false),
            focus_mode: Mutex::new(FocusMode::AutoFocus),
            smooth_autofocus_supported: true,
            smooth_autofocus: AtomicBool::new(true),
        }
    }

    pub fn front(id: &str) -> Self {
        Self::new(id, DevicePosition::Front)
    }

    pub fn back(id: &str) -> Self {
        Self::new(id, DevicePosition::Back)
    }

    /// A device that reports no position, like a USB webcam.
    pub fn external(id: &str) -> Self {
        Self::new(id, DevicePosition::Unspecified)
    }

    pub fn with_lock_failure(self) -> Self {
        self.set_lock_failure(true);
        self
    }

    pub fn without_smooth_autofocus(mut self) -> Self {
        self.smooth_autofocus_supported = false;
        self.smooth_autofocus.store(false, Ordering::SeqCst);
        self
    }

    pub fn set_lock_failure(&self, fail: bool) {
        self.lock_failure.store(fail, Ordering::SeqCst);
    }

    pub fn focus_mode(&self) -> FocusMode {
        *self.focus_mode.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::SeqCst)
    }

    pub fn smooth_autofocus_enabled(&self) -> bool {
        self.smooth_autofocus.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for SimulatedDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedDevice")
            .field("id", &self.id)
            .field("position", &self.position)
            .finish()
    }
}

impl CaptureDevice for SimulatedDevice {
    fn unique_id(&self) -> &str {
        &self.id
    }

    fn localized_name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> DevicePosition {
        self.position
    }

    fn lock_for_configuration(&self) -> Result<(), CameraError> {
        if self.lock_failure.load(Ordering::SeqCst) {
            return Err(CameraError::DeviceConfiguration(format!(
                "{} is locked by another client",
                self.id
            )));
        }
        self.locked.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn unlock_for_configuration(&self) {
        self.locked.store(false, Ordering::SeqCst);
    }

    fn is_focus_mode_supported(&self, _mode: FocusMode) -> bool {
        true
    }

    fn set_focus_mode(&self, mode: FocusMode) {
        debug_assert!(self.is_locked(), "focus mode set without configuration lock");
        *self.focus_mode.lock().unwrap_or_else(PoisonError::into_inner) = mode;
    }

    fn is_smooth_autofocus_supported(&self) -> bool {
        self.smooth_autofocus_supported
    }

    fn set_smooth_autofocus_enabled(&self, enabled: bool) {
        debug_assert!(self.is_locked(), "smooth autofocus set without configuration lock");
        self.smooth_autofocus.store(enabled, Ordering::SeqCst);
    }
}

/// Snapshot of what the most recently created session went through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRecord {
    /// Unique ids of the devices whose inputs are bound, in binding order
    pub input_devices: Vec<String>,
    pub outputs: Vec<OutputKind>,
    pub running: bool,
    pub commits: usize,
    pub open_transactions: usize,
}

struct PendingCapture {
    settings: PhotoSettings,
    delegate: Arc<dyn PhotoCaptureDelegate>,
}

struct ActiveRecording {
    path: PathBuf,
    delegate: Arc<dyn RecordingDelegate>,
}

#[derive(Default)]
struct SimState {
    devices: Vec<Arc<SimulatedDevice>>,
    refused_inputs: HashSet<String>,
    failed_inputs: HashSet<String>,
    refused_outputs: HashSet<OutputKind>,
    session: SessionRecord,
    sessions_created: usize,
    photo_requests: Vec<PhotoSettings>,
    pending_captures: VecDeque<PendingCapture>,
    stabilization: Option<StabilizationMode>,
    recording: Option<ActiveRecording>,
    recording_paths: Vec<PathBuf>,
    stop_calls: usize,
}

/// Shared handle to the simulated hardware. Clones observe the same state.
#[derive(Clone, Default)]
pub struct SimulatedFramework {
    state: Arc<Mutex<SimState>>,
}

pub struct SimulatedFrameworkBuilder {
    devices: Vec<Arc<SimulatedDevice>>,
}

impl SimulatedFrameworkBuilder {
    /// Add a device; discovery reports devices in the order they were added.
    pub fn device(mut self, device: SimulatedDevice) -> Self {
        self.devices.push(Arc::new(device));
        self
    }

    pub fn build(self) -> SimulatedFramework {
        let framework = SimulatedFramework::default();
        framework.lock().devices = self.devices;
        framework
    }
}

impl SimulatedFramework {
    pub fn builder() -> SimulatedFrameworkBuilder {
        SimulatedFrameworkBuilder {
            devices: Vec::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn device(&self, id: &str) -> Option<Arc<SimulatedDevice>> {
        self.lock().devices.iter().find(|d| d.id == id).cloned()
    }

    pub fn session_record(&self) -> SessionRecord {
        self.lock().session.clone()
    }

    pub fn sessions_created(&self) -> usize {
        self.lock().sessions_created
    }

    /// Make sessions refuse inputs for `device_id`.
    pub fn refuse_input(&self, device_id: &str) {
        self.lock().refused_inputs.insert(device_id.to_string());
    }

    pub fn allow_input(&self, device_id: &str) {
        self.lock().refused_inputs.remove(device_id);
    }

    /// Make input creation for `device_id` fail.
    pub fn fail_input_creation(&self, device_id: &str) {
        self.lock().failed_inputs.insert(device_id.to_string());
    }

    pub fn refuse_output(&self, kind: OutputKind) {
        self.lock().refused_outputs.insert(kind);
    }

    /// Every photo request issued so far, oldest first.
    pub fn photo_requests(&self) -> Vec<PhotoSettings> {
        self.lock().photo_requests.clone()
    }

    /// Requests the hardware has not answered yet, oldest first.
    pub fn pending_photo_requests(&self) -> Vec<PhotoRequestId> {
        self.lock()
            .pending_captures
            .iter()
            .map(|c| c.settings.request_id)
            .collect()
    }

    /// Answer the oldest outstanding photo request. Returns its id, or
    /// `None` when nothing was outstanding.
    pub fn complete_photo(&self, result: Result<Option<Bytes>, CameraError>) -> Option<PhotoRequestId> {
        let capture = self.lock().pending_captures.pop_front()?;
        let id = capture.settings.request_id;
        capture.delegate.did_finish_processing_photo(id, result);
        Some(id)
    }

    /// Answer a specific outstanding photo request.
    pub fn complete_photo_request(
        &self,
        request_id: PhotoRequestId,
        result: Result<Option<Bytes>, CameraError>,
    ) -> bool {
        let capture = {
            let mut state = self.lock();
            let index = state
                .pending_captures
                .iter()
                .position(|c| c.settings.request_id == request_id);
            index.and_then(|i| state.pending_captures.remove(i))
        };
        match capture {
            Some(capture) => {
                capture.delegate.did_finish_processing_photo(request_id, result);
                true
            }
            None => false,
        }
    }

    pub fn stabilization(&self) -> Option<StabilizationMode> {
        self.lock().stabilization
    }

    /// Paths handed to `start_recording`, oldest first.
    pub fn recording_paths(&self) -> Vec<PathBuf> {
        self.lock().recording_paths.clone()
    }

    pub fn stop_calls(&self) -> usize {
        self.lock().stop_calls
    }

    pub fn is_recording(&self) -> bool {
        self.lock().recording.is_some()
    }

    /// Report that the active recording began writing.
    pub fn announce_recording_started(&self) -> Option<PathBuf> {
        let (path, delegate) = {
            let state = self.lock();
            let active = state.recording.as_ref()?;
            (active.path.clone(), active.delegate.clone())
        };
        delegate.did_start_recording(&path);
        Some(path)
    }

    /// Finish the active recording, successfully when `error` is `None`.
    pub fn finish_recording(&self, error: Option<CameraError>) -> Option<PathBuf> {
        let active = self.lock().recording.take()?;
        active.delegate.did_finish_recording(&active.path, error);
        Some(active.path)
    }
}

impl CaptureFramework for SimulatedFramework {
    fn discover_devices(
        &self,
        _device_types: &[DeviceType],
        _media_type: MediaType,
    ) -> Vec<Arc<dyn CaptureDevice>> {
        self.lock()
            .devices
            .iter()
            .map(|d| d.clone() as Arc<dyn CaptureDevice>)
            .collect()
    }

    fn create_input(&self, device: &Arc<dyn CaptureDevice>) -> Result<DeviceInput, CameraError> {
        if self.lock().failed_inputs.contains(device.unique_id()) {
            return Err(CameraError::InputCreation(format!(
                "{} is unavailable",
                device.unique_id()
            )));
        }
        Ok(DeviceInput::new(device.clone()))
    }

    fn create_session(&self) -> Box<dyn SessionBackend> {
        let mut state = self.lock();
        state.session = SessionRecord::default();
        state.sessions_created += 1;
        Box::new(SimulatedSession {
            framework: self.clone(),
            inputs: Vec::new(),
            running: false,
        })
    }

    fn create_photo_output(&self) -> Arc<dyn PhotoOutput> {
        Arc::new(SimulatedPhotoOutput {
            framework: self.clone(),
        })
    }

    fn create_movie_output(&self) -> Arc<dyn MovieOutput> {
        Arc::new(SimulatedMovieOutput {
            framework: self.clone(),
        })
    }
}

struct SimulatedSession {
    framework: SimulatedFramework,
    inputs: Vec<DeviceInput>,
    running: bool,
}

impl SimulatedSession {
    fn sync_inputs(&self) {
        self.framework.lock().session.input_devices = self
            .inputs
            .iter()
            .map(|i| i.device().unique_id().to_string())
            .collect();
    }
}

impl SessionBackend for SimulatedSession {
    fn begin_configuration(&mut self) {
        self.framework.lock().session.open_transactions += 1;
    }

    fn commit_configuration(&mut self) {
        let mut state = self.framework.lock();
        state.session.open_transactions = state.session.open_transactions.saturating_sub(1);
        state.session.commits += 1;
    }

    fn can_add_input(&self, input: &DeviceInput) -> bool {
        self.inputs.is_empty()
            && !self
                .framework
                .lock()
                .refused_inputs
                .contains(input.device().unique_id())
    }

    fn add_input(&mut self, input: &DeviceInput) {
        self.inputs.push(input.clone());
        self.sync_inputs();
    }

    fn remove_input(&mut self, input: &DeviceInput) {
        self.inputs.retain(|i| i != input);
        self.sync_inputs();
    }

    fn inputs(&self) -> Vec<Uuid> {
        self.inputs.iter().map(DeviceInput::id).collect()
    }

    fn can_add_output(&self, output: &OutputSink) -> bool {
        let state = self.framework.lock();
        !state.refused_outputs.contains(&output.kind())
            && !state.session.outputs.contains(&output.kind())
    }

    fn add_output(&mut self, output: &OutputSink) {
        self.framework.lock().session.outputs.push(output.kind());
    }

    fn start_running(&mut self) {
        self.running = true;
        self.framework.lock().session.running = true;
    }

    fn stop_running(&mut self) {
        self.running = false;
        self.framework.lock().session.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

struct SimulatedPhotoOutput {
    framework: SimulatedFramework,
}

impl PhotoOutput for SimulatedPhotoOutput {
    fn capture_photo(&self, settings: PhotoSettings, delegate: Arc<dyn PhotoCaptureDelegate>) {
        let mut state = self.framework.lock();
        state.photo_requests.push(settings);
        state
            .pending_captures
            .push_back(PendingCapture { settings, delegate });
    }
}

struct SimulatedMovieOutput {
    framework: SimulatedFramework,
}

impl MovieOutput for SimulatedMovieOutput {
    fn is_video_stabilization_supported(&self) -> bool {
        true
    }

    fn set_preferred_video_stabilization(&self, mode: StabilizationMode) {
        self.framework.lock().stabilization = Some(mode);
    }

    fn start_recording(&self, path: &Path, delegate: Arc<dyn RecordingDelegate>) {
        let mut state = self.framework.lock();
        state.recording_paths.push(path.to_path_buf());
        state.recording = Some(ActiveRecording {
            path: path.to_path_buf(),
            delegate,
        });
    }

    fn stop_recording(&self) {
        self.framework.lock().stop_calls += 1;
    }

    fn is_recording(&self) -> bool {
        self.framework.is_recording()
    }
}
