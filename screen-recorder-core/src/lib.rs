//! # screen-recorder-core
//!
//! Platform-agnostic screen recording core library.
//!
//! Provides the recording state machine, the capture worker, pixel format
//! conversion and an MJPEG AVI writer. Platform-specific backends implement
//! the `ScreenCaptureSource` trait and plug into the generic `ScreenRecorder`.
//!
//! ## Architecture
//!
//! ```text
//! screen-recorder-core (this crate)
//! ├── traits/       ← ScreenCaptureSource, VideoEncoder, VideoStream, RecorderObserver
//! ├── models/       ← RecorderError, RecorderState, RecorderConfiguration, Frame, events
//! ├── processing/   ← pixel layout conversion, frame pacing clock
//! ├── session/      ← ScreenRecorder (controller) + frame loop (worker)
//! └── storage/      ← AVI container layout, MJPEG AVI writer
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

#[cfg(test)]
mod testing;

// Re-export key types at crate root for convenience.
pub use models::config::{FramePacing, RecorderConfiguration};
pub use models::error::RecorderError;
pub use models::event::RecorderEvent;
pub use models::frame::{Frame, PixelLayout};
pub use models::recording_result::{RecordingResult, StreamSummary};
pub use models::state::RecorderState;
pub use session::recorder::ScreenRecorder;
pub use storage::mjpeg_writer::{MjpegAviEncoder, MjpegAviWriter, OutputFile};
pub use traits::capture_source::ScreenCaptureSource;
pub use traits::observer::RecorderObserver;
pub use traits::video_encoder::{EncoderSettings, VideoEncoder, VideoStream};
