use crate::models::error::RecorderError;
use crate::models::frame::Frame;

/// Interface for platform-specific screen capture.
///
/// Implemented by:
/// - `XcapScreenSource` (desktop crate, primary monitor via `xcap`)
///
/// The recorder calls both methods synchronously: `dimensions` once from
/// `start()` on the controller's thread, `capture` once per frame on the
/// worker thread. Calls never overlap.
pub trait ScreenCaptureSource: Send {
    /// Size in pixels of the frames `capture` returns, sampled once per
    /// session. The output stream is opened at exactly this size.
    ///
    /// The provided implementation grabs one frame and reports its size,
    /// which stays correct on scaled displays where the OS reports the
    /// screen in logical points. Override it only when the pixel size is
    /// known without capturing.
    fn dimensions(&mut self) -> Result<(u32, u32), RecorderError> {
        let frame = self.capture()?;
        Ok((frame.width(), frame.height()))
    }

    /// Grab the current screen contents.
    ///
    /// Fails with `CaptureUnavailable` if the display cannot be sampled.
    fn capture(&mut self) -> Result<Frame, RecorderError>;
}
