use std::path::PathBuf;

use crate::models::error::RecorderError;
use crate::models::frame::{Frame, PixelLayout};
use crate::models::recording_result::StreamSummary;

/// Parameters a stream is opened with. Fixed for the stream's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSettings {
    pub path: PathBuf,
    pub frame_rate: u32,
    pub width: u32,
    pub height: u32,
    /// Lossy compression quality, 1-100. Encoders without a quality knob
    /// ignore it.
    pub quality: u8,
}

/// Factory for video output streams.
///
/// Implemented by `MjpegAviEncoder`.
pub trait VideoEncoder: Send + Sync {
    type Stream: VideoStream + 'static;

    /// Pixel layout `write_frame` expects. The recorder converts captured
    /// frames to this layout before handing them over.
    fn pixel_layout(&self) -> PixelLayout;

    /// Create the output file and prepare it for appending frames.
    ///
    /// Fails with `OutputUnwritable` if the destination cannot be created.
    fn open(&self, settings: &EncoderSettings) -> Result<Self::Stream, RecorderError>;
}

/// An open video file accepting frames in sequence.
pub trait VideoStream: Send {
    /// Append one frame. Fails with `EncodeFailure`.
    fn write_frame(&mut self, frame: &Frame) -> Result<(), RecorderError>;

    /// Number of frames appended so far.
    fn frames_written(&self) -> u64;

    /// Finalize the container so the file is valid for playback.
    ///
    /// Idempotent: calling it again after a successful close returns the
    /// same summary without touching the file.
    fn close(&mut self) -> Result<StreamSummary, RecorderError>;
}
