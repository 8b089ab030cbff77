//! Single-slot still photo requests.
//!
//! Only the most recently issued request is tracked. Issuing a new request
//! while one is pending supersedes it: the earlier completion is dropped
//! without ever being invoked, and a late hardware result for it is
//! discarded. Dropping a request also cancels its deadline.

use super::deadline::Deadline;
use crate::errors::CameraError;
use crate::types::{CapturedPhoto, FlashMode, PhotoRequestId};
use bytes::Bytes;
use image::DynamicImage;
use std::time::Instant;

pub type PhotoCompletion = Box<dyn FnOnce(Result<CapturedPhoto, CameraError>) + Send + 'static>;

pub struct PendingPhoto {
    pub id: PhotoRequestId,
    pub flash_mode: FlashMode,
    pub issued_at: Instant,
    completion: PhotoCompletion,
    deadline: Option<Deadline>,
}

impl PendingPhoto {
    /// Resolve with a hardware result and hand back the completion to call.
    pub fn resolve(
        self,
        result: Result<Option<Bytes>, CameraError>,
    ) -> (PhotoCompletion, Result<CapturedPhoto, CameraError>) {
        let outcome = result.and_then(|buffer| {
            let image = decode(buffer)?;
            Ok(CapturedPhoto {
                request_id: self.id,
                image,
                flash_mode: self.flash_mode,
                captured_at: chrono::Utc::now(),
            })
        });
        (self.completion, outcome)
    }

    pub fn fail(self, error: CameraError) -> (PhotoCompletion, Result<CapturedPhoto, CameraError>) {
        (self.completion, Err(error))
    }
}

#[derive(Default)]
pub struct PendingPhotoRequest {
    last_id: u64,
    pending: Option<PendingPhoto>,
}

impl PendingPhotoRequest {
    /// Store a new request, superseding any pending one. Returns the
    /// superseded id.
    pub fn issue(
        &mut self,
        flash_mode: FlashMode,
        completion: PhotoCompletion,
    ) -> (PhotoRequestId, Option<PhotoRequestId>) {
        self.last_id += 1;
        let id = PhotoRequestId(self.last_id);
        let superseded = self
            .pending
            .replace(PendingPhoto {
                id,
                flash_mode,
                issued_at: Instant::now(),
                completion,
                deadline: None,
            })
            .map(|old| old.id);
        if let Some(old) = superseded {
            log::warn!("{} superseded {} before it resolved", id, old);
        }
        (id, superseded)
    }

    /// Attach the timeout for request `id`. Discarded if `id` is no longer
    /// pending.
    pub fn arm(&mut self, id: PhotoRequestId, deadline: Deadline) {
        if let Some(pending) = self.pending.as_mut().filter(|p| p.id == id) {
            pending.deadline = Some(deadline);
        }
    }

    /// Take the pending request if it is `id`.
    pub fn take(&mut self, id: PhotoRequestId) -> Option<PendingPhoto> {
        if self.pending_id() == Some(id) {
            self.pending.take()
        } else {
            None
        }
    }

    pub fn pending_id(&self) -> Option<PhotoRequestId> {
        self.pending.as_ref().map(|p| p.id)
    }
}

fn decode(buffer: Option<Bytes>) -> Result<DynamicImage, CameraError> {
    let Some(data) = buffer else {
        log::warn!("Photo capture produced no buffer");
        return Err(CameraError::Unknown);
    };
    image::load_from_memory(&data).map_err(|e| {
        log::warn!("Failed to decode captured photo ({} bytes): {}", data.len(), e);
        CameraError::Unknown
    })
}
