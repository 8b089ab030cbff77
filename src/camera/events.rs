//! Controller event channel
//!
//! Events queue up until the application reads them with `poll_event` or
//! `wait_for_event`. At most [`EVENT_BACKLOG`] undelivered events are kept;
//! past that the oldest one is dropped.

use crate::errors::CameraError;
use crate::types::{Position, RecordedVideo, SessionSummary};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{mpsc, Mutex};

/// Undelivered events kept before the oldest is discarded
pub const EVENT_BACKLOG: usize = 256;

/// Notifications the controller emits for asynchronous outcomes
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    Prepared(SessionSummary),
    PrepareFailed(CameraError),
    CameraSwitched(Position),
    RecordingStarted(PathBuf),
    /// The finished file is handed off to the application. May follow a
    /// timeout failure for the same path when the sink finishes late.
    RecordingFinished(RecordedVideo),
    RecordingFailed { path: PathBuf, error: CameraError },
}

pub(crate) struct EventChannel {
    sender: mpsc::UnboundedSender<ControllerEvent>,
    receiver: Mutex<mpsc::UnboundedReceiver<ControllerEvent>>,
    queued: AtomicUsize,
    capacity: usize,
}

impl EventChannel {
    pub(crate) fn new() -> Self {
        Self::with_capacity(EVENT_BACKLOG)
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(receiver),
            queued: AtomicUsize::new(0),
            capacity: capacity.max(1),
        }
    }

    pub(crate) fn emit(&self, event: ControllerEvent) {
        log::debug!("Controller event: {:?}", event);
        // Counted before sending so a concurrent reader never sees it negative.
        let queued = self.queued.fetch_add(1, Ordering::SeqCst);
        // The receiver lives as long as the sender; send only fails during teardown.
        if self.sender.send(event).is_err() {
            self.queued.fetch_sub(1, Ordering::SeqCst);
            return;
        }
        if queued < self.capacity {
            return;
        }
        // A reader holding the receiver is draining already.
        if let Ok(mut receiver) = self.receiver.try_lock() {
            if let Ok(dropped) = receiver.try_recv() {
                self.queued.fetch_sub(1, Ordering::SeqCst);
                log::warn!("Event backlog full, dropping {:?}", dropped);
            }
        }
    }

    /// Next event without waiting. Returns `None` while another task is
    /// waiting on the channel.
    pub(crate) fn poll(&self) -> Option<ControllerEvent> {
        let mut receiver = self.receiver.try_lock().ok()?;
        let event = receiver.try_recv().ok()?;
        self.queued.fetch_sub(1, Ordering::SeqCst);
        Some(event)
    }

    pub(crate) async fn wait(&self) -> Option<ControllerEvent> {
        let mut receiver = self.receiver.lock().await;
        let event = receiver.recv().await?;
        self.queued.fetch_sub(1, Ordering::SeqCst);
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn switched(n: usize) -> ControllerEvent {
        let position = if n % 2 == 0 {
            Position::Front
        } else {
            Position::Rear
        };
        ControllerEvent::CameraSwitched(position)
    }

    fn drain(channel: &EventChannel) -> Vec<ControllerEvent> {
        std::iter::from_fn(|| channel.poll()).collect()
    }

    #[test]
    fn test_backlog_drops_oldest() {
        let channel = EventChannel::with_capacity(3);
        channel.emit(ControllerEvent::PrepareFailed(CameraError::NoCamerasAvailable));
        for n in 0..3 {
            channel.emit(switched(n));
        }

        assert_eq!(drain(&channel), vec![switched(0), switched(1), switched(2)]);
    }

    #[test]
    fn test_backlog_stays_bounded_without_reader() {
        let channel = EventChannel::with_capacity(8);
        for n in 0..10_000 {
            channel.emit(switched(n));
        }
        assert_eq!(drain(&channel).len(), 8);
    }

    #[test]
    fn test_draining_makes_room_again() {
        let channel = EventChannel::with_capacity(2);
        channel.emit(switched(0));
        channel.emit(switched(1));
        assert_eq!(channel.poll(), Some(switched(0)));

        channel.emit(switched(2));
        assert_eq!(drain(&channel), vec![switched(1), switched(2)]);
    }

    #[tokio::test]
    async fn test_wait_receives_queued_event() {
        let channel = EventChannel::with_capacity(4);
        channel.emit(switched(1));
        assert_eq!(channel.wait().await, Some(switched(1)));
        assert_eq!(channel.poll(), None);
    }
}
