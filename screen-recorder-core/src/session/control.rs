use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::{Condvar, Mutex};
use uuid::Uuid;

use crate::models::config::RecorderConfiguration;
use crate::models::error::RecorderError;
use crate::models::event::RecorderEvent;
use crate::models::recording_result::{RecordingResult, StreamSummary};
use crate::models::state::RecorderState;
use crate::traits::observer::RecorderObserver;

/// Bookkeeping for the session currently in flight.
pub(crate) struct ActiveSession {
    pub id: Uuid,
    pub file_path: PathBuf,
    pub frame_rate: u32,
    pub width: u32,
    pub height: u32,
    created_at: DateTime<Utc>,
    started: Instant,
    paused_duration: Duration,
    last_pause_time: Option<Instant>,
}

impl ActiveSession {
    pub fn new(file_path: PathBuf, frame_rate: u32, width: u32, height: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_path,
            frame_rate,
            width,
            height,
            created_at: Utc::now(),
            started: Instant::now(),
            paused_duration: Duration::ZERO,
            last_pause_time: None,
        }
    }

    pub fn mark_paused(&mut self, now: Instant) {
        self.last_pause_time.get_or_insert(now);
    }

    pub fn mark_resumed(&mut self, now: Instant) {
        if let Some(pause_start) = self.last_pause_time.take() {
            self.paused_duration += now.saturating_duration_since(pause_start);
        }
    }

    /// Time spent recording so far, excluding pauses (including one in progress).
    pub fn active_duration(&self, now: Instant) -> Duration {
        let ongoing_pause = self
            .last_pause_time
            .map(|p| now.saturating_duration_since(p))
            .unwrap_or_default();
        now.saturating_duration_since(self.started)
            .saturating_sub(self.paused_duration + ongoing_pause)
    }

    pub fn into_result(self, summary: StreamSummary, now: Instant) -> RecordingResult {
        RecordingResult {
            session_id: self.id,
            active_duration_secs: self.active_duration(now).as_secs_f64(),
            file_path: self.file_path,
            frame_count: summary.frames_written,
            frame_rate: self.frame_rate,
            width: self.width,
            height: self.height,
            bytes_written: summary.bytes_written,
            checksum: summary.checksum,
            created_at: self.created_at.to_rfc3339(),
        }
    }
}

/// Everything the controller and the worker both touch, guarded by one lock.
pub(crate) struct Control {
    pub state: RecorderState,
    pub config: RecorderConfiguration,
    pub session: Option<ActiveSession>,
    pub last_result: Option<RecordingResult>,
    observers: Vec<Box<dyn RecorderObserver>>,
}

impl Control {
    pub fn new(config: RecorderConfiguration) -> Self {
        Self {
            state: RecorderState::Idle,
            config,
            session: None,
            last_result: None,
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn RecorderObserver>) {
        self.observers.push(observer);
    }

    /// Reject `command` unless the current state is one of `allowed`.
    pub fn require(&self, command: &'static str, allowed: &[RecorderState]) -> Result<(), RecorderError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(RecorderError::InvalidTransition {
                command,
                state: self.state,
            })
        }
    }

    /// Deliver `event` to every observer, dropping the ones that hung up.
    ///
    /// Called with the control lock held so events go out in the same order
    /// as the transitions that caused them.
    pub fn emit(&mut self, event: RecorderEvent) {
        log::debug!("Recorder event: {}", event.name());
        self.observers.retain(|observer| observer.on_event(&event));
    }
}

/// Control state shared between the recorder handle and its worker.
pub(crate) struct Shared {
    pub control: Mutex<Control>,
    /// Signalled on every transition: wakes a paused or pacing worker, and
    /// callers blocked in `wait_until_idle`.
    pub wake: Condvar,
}

impl Shared {
    pub fn new(config: RecorderConfiguration) -> Self {
        Self {
            control: Mutex::new(Control::new(config)),
            wake: Condvar::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::sync::mpsc;

    #[test]
    fn active_duration_excludes_pauses() {
        let mut session = ActiveSession::new(PathBuf::from("a.avi"), 20, 4, 4);
        let t0 = session.started;

        session.mark_paused(t0 + Duration::from_secs(1));
        session.mark_resumed(t0 + Duration::from_secs(3));

        let active = session.active_duration(t0 + Duration::from_secs(4));
        assert_abs_diff_eq!(active.as_secs_f64(), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn ongoing_pause_is_excluded() {
        let mut session = ActiveSession::new(PathBuf::from("a.avi"), 20, 4, 4);
        let t0 = session.started;

        session.mark_paused(t0 + Duration::from_secs(1));
        let active = session.active_duration(t0 + Duration::from_secs(5));
        assert_abs_diff_eq!(active.as_secs_f64(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn require_reports_current_state() {
        let control = Control::new(RecorderConfiguration::default());
        assert!(control.require("start", &[RecorderState::Idle]).is_ok());
        assert_eq!(
            control.require("pause", &[RecorderState::Recording]),
            Err(RecorderError::InvalidTransition {
                command: "pause",
                state: RecorderState::Idle,
            })
        );
    }

    #[test]
    fn disconnected_observers_are_dropped() {
        let mut control = Control::new(RecorderConfiguration::default());
        let (kept_tx, kept_rx) = mpsc::channel();
        let (gone_tx, gone_rx) = mpsc::channel::<RecorderEvent>();
        control.add_observer(Box::new(kept_tx));
        control.add_observer(Box::new(gone_tx));
        drop(gone_rx);

        control.emit(RecorderEvent::Paused);
        assert_eq!(control.observers.len(), 1);
        assert_eq!(kept_rx.try_recv().unwrap(), RecorderEvent::Paused);
    }
}
