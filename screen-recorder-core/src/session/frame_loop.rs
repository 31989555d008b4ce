use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::models::config::{FramePacing, RecorderConfiguration};
use crate::models::error::RecorderError;
use crate::models::event::RecorderEvent;
use crate::models::frame::PixelLayout;
use crate::models::state::RecorderState;
use crate::processing::color;
use crate::processing::pacing::FrameClock;
use crate::session::control::Shared;
use crate::traits::capture_source::ScreenCaptureSource;
use crate::traits::video_encoder::VideoStream;

/// The worker side of a session: capture → convert → write until stopped,
/// then finalize the stream and hand control back to `Idle`.
pub(crate) struct FrameLoop<C: ScreenCaptureSource, S: VideoStream> {
    source: Arc<Mutex<C>>,
    stream: S,
    target_layout: PixelLayout,
    shared: Arc<Shared>,
    pacing: FramePacing,
    pause_poll_interval: Duration,
    clock: FrameClock,
}

impl<C: ScreenCaptureSource, S: VideoStream> FrameLoop<C, S> {
    pub fn new(
        source: Arc<Mutex<C>>,
        stream: S,
        target_layout: PixelLayout,
        shared: Arc<Shared>,
        config: &RecorderConfiguration,
    ) -> Self {
        Self {
            source,
            stream,
            target_layout,
            shared,
            pacing: config.pacing,
            pause_poll_interval: config.pause_poll_interval,
            clock: FrameClock::new(config.frame_interval()),
        }
    }

    /// Worker thread entry point. Always finalizes the stream, even when
    /// capture or encoding fails or panics.
    pub fn run(mut self) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.capture_until_stopped()));
        let failure = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e),
            Err(payload) => Some(RecorderError::Worker(format!(
                "panicked: {}",
                panic_message(payload.as_ref())
            ))),
        };
        self.finish(failure);
    }

    fn capture_until_stopped(&mut self) -> Result<(), RecorderError> {
        while self.wait_while_paused() {
            self.capture_one()?;
            self.pace();
        }
        Ok(())
    }

    /// Block while paused. Returns `true` once recording, `false` when the
    /// session is stopping.
    fn wait_while_paused(&mut self) -> bool {
        let mut control = self.shared.control.lock();
        let mut was_paused = false;
        loop {
            match control.state {
                RecorderState::Recording => {
                    if was_paused {
                        self.clock.reset(Instant::now());
                    }
                    return true;
                }
                RecorderState::Paused => {
                    was_paused = true;
                    self.shared.wake.wait_for(&mut control, self.pause_poll_interval);
                }
                RecorderState::Stopping | RecorderState::Idle => return false,
            }
        }
    }

    fn capture_one(&mut self) -> Result<(), RecorderError> {
        let frame = self.source.lock().capture()?;
        let frame = color::convert(frame, self.target_layout)?;
        self.stream.write_frame(&frame)
    }

    fn pace(&mut self) {
        match self.pacing {
            FramePacing::BestEffort => thread::yield_now(),
            FramePacing::Fixed => {
                let deadline = self.clock.tick(Instant::now());
                let mut control = self.shared.control.lock();
                while control.state == RecorderState::Recording && Instant::now() < deadline {
                    self.shared.wake.wait_until(&mut control, deadline);
                }
            }
        }
    }

    fn finish(mut self, failure: Option<RecorderError>) {
        let closed = self.stream.close();
        let mut failure = failure;
        if let Some(ref e) = failure {
            log::error!("Recording failed: {}", e);
        }

        let mut control = self.shared.control.lock();
        let session = control.session.take();
        let result = match closed {
            Ok(summary) => session.map(|s| s.into_result(summary, Instant::now())),
            Err(e) => {
                log::error!("Failed to finalize recording: {}", e);
                if failure.is_none() {
                    failure = Some(e);
                }
                None
            }
        };

        if let Some(ref r) = result {
            log::info!(
                "Recording stopped: {} frames ({:.1}s active) written to {}",
                r.frame_count,
                r.active_duration_secs,
                r.file_path.display()
            );
        }

        control.state = RecorderState::Idle;
        control.last_result = result.clone();
        if let Some(error) = failure {
            control.emit(RecorderEvent::Failed { error });
        }
        control.emit(RecorderEvent::Stopped {
            result: result.map(Box::new),
        });
        self.shared.wake.notify_all();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
