use std::path::PathBuf;

use uuid::Uuid;

use super::error::RecorderError;
use super::recording_result::RecordingResult;

/// Notification emitted by the recorder, one per state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum RecorderEvent {
    /// The stream is open and the worker is capturing.
    Started {
        session_id: Uuid,
        file_path: PathBuf,
        width: u32,
        height: u32,
    },
    Paused,
    Resumed,
    /// The session ended in error. Always followed by `Stopped`.
    Failed { error: RecorderError },
    /// The stream has been finalized and the recorder is idle again.
    /// `result` is `None` when finalization itself failed.
    Stopped { result: Option<Box<RecordingResult>> },
}

impl RecorderEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::Paused => "paused",
            Self::Resumed => "resumed",
            Self::Failed { .. } => "failed",
            Self::Stopped { .. } => "stopped",
        }
    }
}
