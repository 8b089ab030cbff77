//! The capture session aggregate and the one-shot session builder.

use super::catalog::DeviceCatalog;
use crate::assert_invariant;
use crate::config::ControllerConfig;
use crate::errors::CameraError;
use crate::invariant_ppt::{AT_MOST_ONE_INPUT, POSITION_MATCHES_INPUT};
use crate::platform::{
    CaptureFramework, DeviceInput, MovieOutput, OutputSink, PhotoOutput, SessionBackend,
};
use crate::types::{Position, SessionSummary};
use std::sync::Arc;
use uuid::Uuid;

/// The device input currently bound, tagged with the role it was bound for.
#[derive(Debug, Clone)]
pub struct BoundInput {
    pub input: DeviceInput,
    pub position: Position,
}

/// Owns the hardware session, its single bound input and its output sinks.
///
/// The current position is derived from `bound`; there is no separately
/// tracked position that could drift from the hardware.
pub struct CaptureSession {
    id: Uuid,
    backend: Box<dyn SessionBackend>,
    bound: Option<BoundInput>,
    photo_output: Option<Arc<dyn PhotoOutput>>,
    movie_output: Option<Arc<dyn MovieOutput>>,
}

impl CaptureSession {
    pub fn new(backend: Box<dyn SessionBackend>) -> Self {
        Self {
            id: Uuid::new_v4(),
            backend,
            bound: None,
            photo_output: None,
            movie_output: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_running(&self) -> bool {
        self.backend.is_running()
    }

    pub fn position(&self) -> Option<Position> {
        self.bound.as_ref().map(|b| b.position)
    }

    pub fn bound_input(&self) -> Option<&BoundInput> {
        self.bound.as_ref()
    }

    pub fn photo_output(&self) -> Option<&Arc<dyn PhotoOutput>> {
        self.photo_output.as_ref()
    }

    pub fn movie_output(&self) -> Option<&Arc<dyn MovieOutput>> {
        self.movie_output.as_ref()
    }

    /// Whether the hardware still lists our bound input.
    pub fn is_bound_input_present(&self) -> bool {
        match &self.bound {
            Some(bound) => self.backend.inputs().contains(&bound.input.id()),
            None => false,
        }
    }

    /// Run `f` inside a configuration transaction. The transaction is
    /// committed whatever `f` returns.
    pub fn configure<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, CameraError>,
    ) -> Result<T, CameraError> {
        self.backend.begin_configuration();
        let result = f(self);
        self.backend.commit_configuration();
        self.check_invariants();
        result
    }

    /// Add `input` if the hardware accepts it. Requires that no input is bound.
    pub fn try_bind(&mut self, input: &DeviceInput, position: Position) -> bool {
        if self.bound.is_some() || !self.backend.can_add_input(input) {
            return false;
        }
        self.backend.add_input(input);
        self.bound = Some(BoundInput {
            input: input.clone(),
            position,
        });
        self.check_invariants();
        true
    }

    pub fn unbind(&mut self) -> Option<BoundInput> {
        let bound = self.bound.take()?;
        self.backend.remove_input(&bound.input);
        self.check_invariants();
        Some(bound)
    }

    /// Attach an output sink; returns false when the hardware refuses it.
    pub fn attach_output(&mut self, sink: OutputSink) -> bool {
        if !self.backend.can_add_output(&sink) {
            return false;
        }
        self.backend.add_output(&sink);
        match sink {
            OutputSink::Photo(output) => self.photo_output = Some(output),
            OutputSink::Movie(output) => self.movie_output = Some(output),
        }
        true
    }

    pub fn start_running(&mut self) {
        self.backend.start_running();
    }

    pub fn summary(&self) -> Option<SessionSummary> {
        Some(SessionSummary {
            session_id: self.id,
            position: self.position()?,
            photo_output: self.photo_output.is_some(),
            movie_output: self.movie_output.is_some(),
        })
    }

    fn check_invariants(&self) {
        let inputs = self.backend.inputs();
        assert_invariant!(inputs.len() <= 1, AT_MOST_ONE_INPUT, "session");
        let mirrored = match &self.bound {
            Some(bound) => inputs == [bound.input.id()],
            None => inputs.is_empty(),
        };
        assert_invariant!(mirrored, POSITION_MATCHES_INPUT, "session");
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if self.backend.is_running() {
            self.backend.stop_running();
        }
    }
}

/// Build and start a session: discover devices, bind one input, attach the
/// sinks, start running. Each step requires the previous one to succeed.
pub fn build_session(
    framework: &dyn CaptureFramework,
    config: &ControllerConfig,
) -> Result<(CaptureSession, DeviceCatalog), CameraError> {
    let mut session = CaptureSession::new(framework.create_session());
    let catalog = DeviceCatalog::discover(framework)?;

    let preferred = config.preferred_position;
    let (position, device) = [preferred, preferred.flipped()]
        .into_iter()
        .find_map(|p| catalog.device(p).map(|d| (p, d.clone())))
        .ok_or(CameraError::NoCamerasAvailable)?;

    let input = framework.create_input(&device)?;

    session.configure(|session| {
        if !session.try_bind(&input, position) {
            return Err(CameraError::InputsAreInvalid);
        }

        if config.attach_photo_output
            && !session.attach_output(OutputSink::Photo(framework.create_photo_output()))
        {
            log::warn!("Photo output could not be added; still capture is unavailable");
        }

        if !session.attach_output(OutputSink::Movie(framework.create_movie_output())) {
            log::warn!("Movie output could not be added; recording is unavailable");
        }
        Ok(())
    })?;

    session.start_running();
    log::info!(
        "Capture session {} running with {} camera {}",
        session.id(),
        position,
        device.unique_id()
    );
    Ok((session, catalog))
}
