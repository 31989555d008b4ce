use std::path::PathBuf;
use std::time::Duration;

/// How the frame loop paces itself against the declared frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramePacing {
    /// Capture as fast as capture + convert + encode allow, yielding once
    /// per frame. The stream still declares `frame_rate` for playback.
    #[default]
    BestEffort,
    /// Wait for the next `1 / frame_rate` deadline between frames.
    Fixed,
}

/// Configuration for a recording session.
///
/// The output path is the only field that may change between sessions via
/// `ScreenRecorder::reconfigure`; everything else is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RecorderConfiguration {
    /// Destination video file (default: `output.avi`).
    pub output_path: PathBuf,

    /// Frame rate declared to the encoder (default: 20).
    pub frame_rate: u32,

    /// Compression quality handed to the encoder, 1-100 (default: 80).
    pub jpeg_quality: u8,

    /// Frame pacing policy (default: best effort).
    pub pacing: FramePacing,

    /// How long the worker blocks per wait while paused (default: 50ms).
    /// `resume` and `stop` wake it early.
    pub pause_poll_interval: Duration,
}

impl RecorderConfiguration {
    pub const MAX_FRAME_RATE: u32 = 120;

    pub fn validate(&self) -> Result<(), String> {
        if self.output_path.as_os_str().is_empty() {
            return Err("output path is empty".into());
        }
        if self.frame_rate == 0 || self.frame_rate > Self::MAX_FRAME_RATE {
            return Err(format!("unsupported frame rate: {}", self.frame_rate));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(format!("unsupported jpeg quality: {}", self.jpeg_quality));
        }
        if self.pause_poll_interval.is_zero() {
            return Err("pause poll interval must be non-zero".into());
        }
        Ok(())
    }

    /// Wall-clock spacing between frames at the declared rate.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }
}

impl Default for RecorderConfiguration {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("output.avi"),
            frame_rate: 20,
            jpeg_quality: 80,
            pacing: FramePacing::BestEffort,
            pause_poll_interval: Duration::from_millis(50),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = RecorderConfiguration::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.frame_rate, 20);
        assert_eq!(config.frame_interval(), Duration::from_millis(50));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let zero_rate = RecorderConfiguration {
            frame_rate: 0,
            ..Default::default()
        };
        assert!(zero_rate.validate().is_err());

        let bad_quality = RecorderConfiguration {
            jpeg_quality: 0,
            ..Default::default()
        };
        assert!(bad_quality.validate().is_err());

        let empty_path = RecorderConfiguration {
            output_path: PathBuf::new(),
            ..Default::default()
        };
        assert_eq!(empty_path.validate(), Err("output path is empty".to_string()));

        let no_poll = RecorderConfiguration {
            pause_poll_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(no_poll.validate().is_err());
    }
}
