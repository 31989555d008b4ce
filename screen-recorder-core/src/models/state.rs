use std::fmt;

use serde::Serialize;

/// Recorder control state machine.
///
/// State transitions:
/// ```text
/// idle → recording ⇄ paused
///            ↓         ↓
///            stopping ──→ idle
/// ```
///
/// A single enum in place of separate `running`/`paused` flags, so a
/// paused-but-not-running recorder cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderState {
    Idle,
    Recording,
    Paused,
    Stopping,
}

impl RecorderState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Paused => "paused",
            Self::Stopping => "stopping",
        }
    }
}

impl fmt::Display for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
