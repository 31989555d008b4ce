use thiserror::Error;

use super::state::RecorderState;

/// Errors that can occur while recording the screen.
///
/// Payloads are plain strings so the error can be cloned into
/// [`RecorderEvent::Failed`](super::event::RecorderEvent::Failed) and
/// compared in tests.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecorderError {
    #[error("capture unavailable: {0}")]
    CaptureUnavailable(String),

    #[error("output unwritable: {0}")]
    OutputUnwritable(String),

    #[error("encode failure: {0}")]
    EncodeFailure(String),

    #[error("cannot {command} while {state}")]
    InvalidTransition {
        command: &'static str,
        state: RecorderState,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The worker thread could not be spawned or panicked mid-session.
    #[error("recording worker failed: {0}")]
    Worker(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_message_names_command_and_state() {
        let err = RecorderError::InvalidTransition {
            command: "pause",
            state: RecorderState::Idle,
        };
        assert_eq!(err.to_string(), "cannot pause while idle");
    }
}
