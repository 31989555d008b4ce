//! Full-screen capture using the `xcap` crate.
//!
//! Captures the primary monitor, or the first monitor when none reports as
//! primary. Frames come out as RGBA.

use screen_recorder_core::models::error::RecorderError;
use screen_recorder_core::models::frame::{Frame, PixelLayout};
use screen_recorder_core::traits::capture_source::ScreenCaptureSource;
use xcap::Monitor;

/// Screen capture backed by an `xcap::Monitor`.
///
/// The monitor is looked up on first use, so constructing the source never
/// fails; a machine without a display reports `CaptureUnavailable` when a
/// session is started.
pub struct XcapScreenSource {
    monitor: Option<Monitor>,
}

// SAFETY: The monitor handle is only touched through `&mut self`, and the
// recorder serializes every call behind its source mutex.
unsafe impl Send for XcapScreenSource {}

impl XcapScreenSource {
    pub fn primary() -> Self {
        Self { monitor: None }
    }

    fn monitor(&mut self) -> Result<&Monitor, RecorderError> {
        if self.monitor.is_none() {
            self.monitor = Some(find_primary_monitor()?);
        }
        self.monitor
            .as_ref()
            .ok_or_else(|| RecorderError::CaptureUnavailable("no monitor selected".into()))
    }
}

impl Default for XcapScreenSource {
    fn default() -> Self {
        Self::primary()
    }
}

// `dimensions` stays on the provided capture-based implementation:
// `Monitor::width`/`height` are logical points on scaled displays, while
// `capture_image` returns physical pixels.
impl ScreenCaptureSource for XcapScreenSource {
    fn capture(&mut self) -> Result<Frame, RecorderError> {
        let image = self.monitor()?.capture_image().map_err(unavailable)?;
        let (width, height) = (image.width(), image.height());
        Frame::new(width, height, PixelLayout::Rgba8, image.into_raw())
    }
}

fn find_primary_monitor() -> Result<Monitor, RecorderError> {
    let monitors = Monitor::all().map_err(unavailable)?;

    let mut first = None;
    for monitor in monitors {
        if monitor.is_primary().unwrap_or(false) {
            return Ok(monitor);
        }
        if first.is_none() {
            first = Some(monitor);
        }
    }

    // No monitor reported as primary: fall back to the first one.
    first.ok_or_else(|| RecorderError::CaptureUnavailable("no monitors found".into()))
}

fn unavailable(e: xcap::XCapError) -> RecorderError {
    RecorderError::CaptureUnavailable(e.to_string())
}
