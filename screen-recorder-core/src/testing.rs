//! Test doubles for the capture and encoder seams.

use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::error::RecorderError;
use crate::models::event::RecorderEvent;
use crate::models::frame::{Frame, PixelLayout};
use crate::models::recording_result::{RecordingResult, StreamSummary};
use crate::traits::capture_source::ScreenCaptureSource;
use crate::traits::video_encoder::{EncoderSettings, VideoEncoder, VideoStream};

/// Synthetic screen producing a moving RGBA gradient.
pub struct PatternSource {
    width: u32,
    height: u32,
    captures: u64,
    delay: Duration,
    fail_after: Option<u64>,
    panic_after: Option<u64>,
    display_present: bool,
}

impl PatternSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            captures: 0,
            delay: Duration::ZERO,
            fail_after: None,
            panic_after: None,
            display_present: true,
        }
    }

    pub fn with_capture_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing_after(mut self, captures: u64) -> Self {
        self.fail_after = Some(captures);
        self
    }

    pub fn panicking_after(mut self, captures: u64) -> Self {
        self.panic_after = Some(captures);
        self
    }

    pub fn without_display(mut self) -> Self {
        self.display_present = false;
        self
    }
}

impl ScreenCaptureSource for PatternSource {
    fn dimensions(&mut self) -> Result<(u32, u32), RecorderError> {
        if !self.display_present {
            return Err(RecorderError::CaptureUnavailable("no display attached".into()));
        }
        Ok((self.width, self.height))
    }

    fn capture(&mut self) -> Result<Frame, RecorderError> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        if self.fail_after.is_some_and(|n| self.captures >= n) {
            return Err(RecorderError::CaptureUnavailable("display went away".into()));
        }
        if self.panic_after.is_some_and(|n| self.captures >= n) {
            panic!("capture backend crashed");
        }

        let shift = self.captures as u8;
        self.captures += 1;
        let pixels = (self.width * self.height) as usize;
        let data = (0..pixels)
            .flat_map(|i| [i as u8, shift, (i as u8).wrapping_add(shift), u8::MAX])
            .collect();
        Frame::new(self.width, self.height, PixelLayout::Rgba8, data)
    }
}

/// Screen whose reported size is in logical points while captured frames
/// are in physical pixels, as on a scaled monitor. Leaves `dimensions` to
/// the trait's capture-based default.
pub struct ScaledSource {
    logical: (u32, u32),
    inner: PatternSource,
}

impl ScaledSource {
    pub fn new(logical_width: u32, logical_height: u32, scale: u32) -> Self {
        Self {
            logical: (logical_width, logical_height),
            inner: PatternSource::new(logical_width * scale, logical_height * scale),
        }
    }

    pub fn logical_size(&self) -> (u32, u32) {
        self.logical
    }
}

impl ScreenCaptureSource for ScaledSource {
    fn capture(&mut self) -> Result<Frame, RecorderError> {
        self.inner.capture()
    }
}

#[derive(Default)]
struct EncoderLog {
    opened: Vec<EncoderSettings>,
    frames: u64,
    closes: u64,
}

/// In-memory encoder that records what the recorder asks of it.
///
/// Clones share one log, so a test can keep a handle after moving the
/// encoder into a recorder.
#[derive(Clone)]
pub struct CountingEncoder {
    log: Arc<Mutex<EncoderLog>>,
    layout: PixelLayout,
    fail_open: bool,
    fail_writes_after: Option<u64>,
}

impl CountingEncoder {
    pub fn new() -> Self {
        Self::with_layout(PixelLayout::Rgb8)
    }

    pub fn with_layout(layout: PixelLayout) -> Self {
        Self {
            log: Arc::new(Mutex::new(EncoderLog::default())),
            layout,
            fail_open: false,
            fail_writes_after: None,
        }
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn failing_writes_after(mut self, frames: u64) -> Self {
        self.fail_writes_after = Some(frames);
        self
    }

    /// Frames accepted across all streams.
    pub fn frames(&self) -> u64 {
        self.log.lock().frames
    }

    /// Streams finalized so far.
    pub fn closes(&self) -> u64 {
        self.log.lock().closes
    }

    pub fn opened(&self) -> Vec<EncoderSettings> {
        self.log.lock().opened.clone()
    }
}

impl VideoEncoder for CountingEncoder {
    type Stream = CountingStream;

    fn pixel_layout(&self) -> PixelLayout {
        self.layout
    }

    fn open(&self, settings: &EncoderSettings) -> Result<CountingStream, RecorderError> {
        if self.fail_open {
            return Err(RecorderError::OutputUnwritable(format!(
                "{}: read-only file system",
                settings.path.display()
            )));
        }
        self.log.lock().opened.push(settings.clone());
        Ok(CountingStream {
            log: Arc::clone(&self.log),
            layout: self.layout,
            fail_writes_after: self.fail_writes_after,
            frames_written: 0,
            summary: None,
        })
    }
}

pub struct CountingStream {
    log: Arc<Mutex<EncoderLog>>,
    layout: PixelLayout,
    fail_writes_after: Option<u64>,
    frames_written: u64,
    summary: Option<StreamSummary>,
}

impl VideoStream for CountingStream {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), RecorderError> {
        if self.summary.is_some() {
            return Err(RecorderError::EncodeFailure("stream is closed".into()));
        }
        if frame.layout() != self.layout {
            return Err(RecorderError::EncodeFailure(format!(
                "expected {:?} frame, got {:?}",
                self.layout,
                frame.layout()
            )));
        }
        if self.fail_writes_after.is_some_and(|n| self.frames_written >= n) {
            return Err(RecorderError::EncodeFailure("disk full".into()));
        }
        self.frames_written += 1;
        self.log.lock().frames += 1;
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn close(&mut self) -> Result<StreamSummary, RecorderError> {
        if let Some(ref summary) = self.summary {
            return Ok(summary.clone());
        }
        self.log.lock().closes += 1;
        let summary = StreamSummary {
            frames_written: self.frames_written,
            bytes_written: self.frames_written * 16,
            checksum: String::new(),
        };
        self.summary = Some(summary.clone());
        Ok(summary)
    }
}

/// Next event on `events`, failing the test if none arrives in time.
pub fn next_event(events: &Receiver<RecorderEvent>, timeout: Duration) -> RecorderEvent {
    events
        .recv_timeout(timeout)
        .unwrap_or_else(|e| panic!("no recorder event within {:?}: {}", timeout, e))
}

/// Skip ahead to the next `Stopped` event and return its result.
pub fn wait_for_stopped(events: &Receiver<RecorderEvent>, timeout: Duration) -> Option<RecordingResult> {
    loop {
        if let RecorderEvent::Stopped { result } = next_event(events, timeout) {
            return result.map(|r| *r);
        }
    }
}
