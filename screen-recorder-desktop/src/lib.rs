//! # screen-recorder-desktop
//!
//! Desktop backend and terminal controller for screen-recorder.
//!
//! Provides:
//! - `XcapScreenSource`: primary monitor capture via `xcap`
//! - `commands`: the line-based controller driving a `ScreenRecorder`
//!
//! ## Usage
//! ```ignore
//! use screen_recorder_core::{MjpegAviEncoder, RecorderConfiguration, ScreenRecorder};
//! use screen_recorder_desktop::XcapScreenSource;
//!
//! let recorder = ScreenRecorder::new(
//!     XcapScreenSource::primary(),
//!     MjpegAviEncoder,
//!     RecorderConfiguration::default(),
//! );
//! recorder.start()?;
//! ```

pub mod commands;
pub mod xcap_source;

pub use commands::{execute, parse_command, Command, CommandError, Flow};
pub use xcap_source::XcapScreenSource;
