use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use uuid::Uuid;

use crate::models::config::RecorderConfiguration;
use crate::models::error::RecorderError;
use crate::models::event::RecorderEvent;
use crate::models::recording_result::RecordingResult;
use crate::models::state::RecorderState;
use crate::session::control::{ActiveSession, Shared};
use crate::session::frame_loop::FrameLoop;
use crate::traits::capture_source::ScreenCaptureSource;
use crate::traits::observer::RecorderObserver;
use crate::traits::video_encoder::{EncoderSettings, VideoEncoder};

/// Screen recording engine.
///
/// Generic over the capture backend and the video encoder. Owns one
/// background worker per session and the control state machine the
/// controller drives:
/// ```text
/// [ScreenCaptureSource] → [color convert] → [VideoStream]   (worker thread)
///          ↑ start / pause / resume / stop / reconfigure     (controller)
/// ```
///
/// All commands take `&self`, so the recorder can be shared behind an `Arc`
/// and commanded from any thread. Commands never wait for the worker:
/// completion of `stop()` is reported by the `Stopped` event.
pub struct ScreenRecorder<C: ScreenCaptureSource + 'static, E: VideoEncoder + 'static> {
    source: Arc<Mutex<C>>,
    encoder: Arc<E>,
    shared: Arc<Shared>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
}

impl<C: ScreenCaptureSource + 'static, E: VideoEncoder + 'static> ScreenRecorder<C, E> {
    pub fn new(source: C, encoder: E, config: RecorderConfiguration) -> Self {
        Self {
            source: Arc::new(Mutex::new(source)),
            encoder: Arc::new(encoder),
            shared: Arc::new(Shared::new(config)),
            worker: Mutex::new(None),
        }
    }

    /// Register an observer for all future events.
    pub fn add_observer<O: RecorderObserver + 'static>(&self, observer: O) {
        self.shared.control.lock().add_observer(Box::new(observer));
    }

    /// Subscribe to events through a channel.
    pub fn subscribe(&self) -> Receiver<RecorderEvent> {
        let (tx, rx) = mpsc::channel();
        self.add_observer(tx);
        rx
    }

    pub fn state(&self) -> RecorderState {
        self.shared.control.lock().state
    }

    pub fn configuration(&self) -> RecorderConfiguration {
        self.shared.control.lock().config.clone()
    }

    /// Result of the most recent session that finalized cleanly.
    pub fn last_result(&self) -> Option<RecordingResult> {
        self.shared.control.lock().last_result.clone()
    }

    /// Un-paused time of the session in flight, if any.
    pub fn active_duration(&self) -> Option<Duration> {
        let control = self.shared.control.lock();
        control.session.as_ref().map(|s| s.active_duration(Instant::now()))
    }

    /// Start a session. Transitions: idle → recording.
    ///
    /// Samples the screen size, opens the output stream at the configured
    /// path and spawns the worker. Every failure here is reported to the
    /// caller and leaves the recorder idle.
    pub fn start(&self) -> Result<Uuid, RecorderError> {
        let mut control = self.shared.control.lock();
        control.require("start", &[RecorderState::Idle])?;
        control
            .config
            .validate()
            .map_err(RecorderError::InvalidConfiguration)?;

        // A previous worker has already finalized by the time the state
        // reads idle; it only needs reaping.
        if let Some(handle) = self.worker.lock().take() {
            if handle.join().is_err() {
                log::warn!("Previous recording worker exited abnormally");
            }
        }

        let config = control.config.clone();
        let (width, height) = self.source.lock().dimensions()?;
        let settings = EncoderSettings {
            path: config.output_path.clone(),
            frame_rate: config.frame_rate,
            width,
            height,
            quality: config.jpeg_quality,
        };
        let stream = self.encoder.open(&settings)?;

        let frame_loop = FrameLoop::new(
            Arc::clone(&self.source),
            stream,
            self.encoder.pixel_layout(),
            Arc::clone(&self.shared),
            &config,
        );
        let handle = thread::Builder::new()
            .name("screen-recorder".into())
            .spawn(move || frame_loop.run())
            .map_err(|e| RecorderError::Worker(format!("failed to spawn: {}", e)))?;
        *self.worker.lock() = Some(handle);

        let session = ActiveSession::new(settings.path.clone(), config.frame_rate, width, height);
        let session_id = session.id;
        control.session = Some(session);
        control.state = RecorderState::Recording;
        control.emit(RecorderEvent::Started {
            session_id,
            file_path: settings.path.clone(),
            width,
            height,
        });

        log::info!(
            "Recording started: {} ({}x{} @ {} fps)",
            settings.path.display(),
            width,
            height,
            config.frame_rate
        );
        Ok(session_id)
    }

    /// Pause capture. Transitions: recording → paused.
    pub fn pause(&self) -> Result<(), RecorderError> {
        let mut control = self.shared.control.lock();
        control.require("pause", &[RecorderState::Recording])?;

        control.state = RecorderState::Paused;
        if let Some(session) = control.session.as_mut() {
            session.mark_paused(Instant::now());
        }
        control.emit(RecorderEvent::Paused);
        self.shared.wake.notify_all();

        log::info!("Recording paused");
        Ok(())
    }

    /// Resume capture. Transitions: paused → recording.
    pub fn resume(&self) -> Result<(), RecorderError> {
        let mut control = self.shared.control.lock();
        control.require("resume", &[RecorderState::Paused])?;

        control.state = RecorderState::Recording;
        if let Some(session) = control.session.as_mut() {
            session.mark_resumed(Instant::now());
        }
        control.emit(RecorderEvent::Resumed);
        self.shared.wake.notify_all();

        log::info!("Recording resumed");
        Ok(())
    }

    /// Request the session to end. Transitions: recording/paused → stopping.
    ///
    /// Returns immediately; the worker finalizes the file, moves to idle
    /// and emits `Stopped`.
    pub fn stop(&self) -> Result<(), RecorderError> {
        let mut control = self.shared.control.lock();
        control.require("stop", &[RecorderState::Recording, RecorderState::Paused])?;

        control.state = RecorderState::Stopping;
        self.shared.wake.notify_all();

        log::info!("Stopping recording");
        Ok(())
    }

    /// Change the output path used by the next `start()`. Idle only.
    pub fn reconfigure(&self, output_path: impl Into<PathBuf>) -> Result<(), RecorderError> {
        let mut control = self.shared.control.lock();
        control.require("reconfigure", &[RecorderState::Idle])?;

        let output_path = output_path.into();
        log::info!("Output path set to {}", output_path.display());
        control.config.output_path = output_path;
        Ok(())
    }

    /// Block until the recorder is idle or `timeout` elapses. Returns
    /// whether it is idle.
    pub fn wait_until_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut control = self.shared.control.lock();
        while !control.state.is_idle() {
            if self.shared.wake.wait_until(&mut control, deadline).timed_out() {
                return control.state.is_idle();
            }
        }
        true
    }
}

impl<C: ScreenCaptureSource + 'static, E: VideoEncoder + 'static> Drop for ScreenRecorder<C, E> {
    fn drop(&mut self) {
        if self.stop().is_ok() {
            log::warn!("Recorder dropped mid-session; finalizing");
        }
        if let Some(handle) = self.worker.get_mut().take() {
            let _ = handle.join();
        }
    }
}
