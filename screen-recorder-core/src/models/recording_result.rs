use std::path::PathBuf;

use serde::Serialize;
use uuid::Uuid;

/// What the encoder stream reports once it has been finalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSummary {
    pub frames_written: u64,
    pub bytes_written: u64,
    pub checksum: String,
}

/// Result of one completed recording session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordingResult {
    pub session_id: Uuid,
    pub file_path: PathBuf,
    pub frame_count: u64,
    pub frame_rate: u32,
    pub width: u32,
    pub height: u32,
    /// Wall-clock time spent recording, excluding pauses.
    pub active_duration_secs: f64,
    pub bytes_written: u64,
    pub checksum: String,
    pub created_at: String,
}

impl RecordingResult {
    /// Playback length of the file at its declared frame rate.
    pub fn playback_duration_secs(&self) -> f64 {
        if self.frame_rate == 0 {
            return 0.0;
        }
        self.frame_count as f64 / self.frame_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn playback_duration_follows_declared_rate() {
        let result = RecordingResult {
            session_id: Uuid::new_v4(),
            file_path: PathBuf::from("out.avi"),
            frame_count: 50,
            frame_rate: 20,
            width: 640,
            height: 480,
            active_duration_secs: 0.4,
            bytes_written: 1024,
            checksum: String::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        assert_abs_diff_eq!(result.playback_duration_secs(), 2.5, epsilon = 1e-9);
    }
}
