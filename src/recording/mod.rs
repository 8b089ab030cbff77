//! Video recording state machine and recording-file lifecycle
//!
//! A recording moves Idle -> Recording when the movie sink starts writing a
//! fresh temporary file, and back to Idle when the sink reports completion,
//! whether it succeeded or not. Calling start while recording toggles the
//! recording off.
//!
//! # Example
//! ```rust,ignore
//! use saycheese::RecordingAction;
//!
//! match controller.start_recording()? {
//!     RecordingAction::Started(path) => println!("writing {:?}", path),
//!     RecordingAction::Stopping(path) => println!("finalizing {:?}", path),
//! }
//!
//! // Later, on the event channel:
//! // ControllerEvent::RecordingFinished(video) => hand video.path to the app
//! ```

mod recorder;
mod state;

pub use recorder::MovieRecorder;
pub use state::{RecordingMachine, RecordingState};

#[cfg(test)]
mod tests;
