//! Terminal commands and how they drive the recorder.

use std::path::PathBuf;

use screen_recorder_core::models::error::RecorderError;
use screen_recorder_core::models::state::RecorderState;
use screen_recorder_core::session::recorder::ScreenRecorder;
use screen_recorder_core::traits::capture_source::ScreenCaptureSource;
use screen_recorder_core::traits::video_encoder::VideoEncoder;

pub const HELP: &str = "commands: start | pause | resume | toggle | stop | path <file> | status | quit";

/// One line of controller input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Resume,
    /// Pause when recording, resume when paused.
    Toggle,
    Stop,
    SetPath(PathBuf),
    Status,
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),

    #[error("`{0}` takes no arguments")]
    UnexpectedArgument(&'static str),
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let (name, command) = match word.to_ascii_lowercase().as_str() {
        "path" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("path"));
            }
            return Ok(Some(Command::SetPath(PathBuf::from(rest))));
        }
        "start" => ("start", Command::Start),
        "pause" => ("pause", Command::Pause),
        "resume" => ("resume", Command::Resume),
        "toggle" => ("toggle", Command::Toggle),
        "stop" => ("stop", Command::Stop),
        "status" => ("status", Command::Status),
        "help" | "?" => ("help", Command::Help),
        "quit" | "exit" => ("quit", Command::Quit),
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    if !rest.is_empty() {
        return Err(CommandError::UnexpectedArgument(name));
    }
    Ok(Some(command))
}

/// What the input loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Apply a command to the recorder.
pub fn execute<C, E>(recorder: &ScreenRecorder<C, E>, command: Command) -> Result<Flow, RecorderError>
where
    C: ScreenCaptureSource + 'static,
    E: VideoEncoder + 'static,
{
    match command {
        Command::Start => {
            let session_id = recorder.start()?;
            log::debug!("Session {} started", session_id);
        }
        Command::Pause => recorder.pause()?,
        Command::Resume => recorder.resume()?,
        Command::Toggle => match recorder.state() {
            RecorderState::Recording => recorder.pause()?,
            RecorderState::Paused => recorder.resume()?,
            state => {
                return Err(RecorderError::InvalidTransition {
                    command: "toggle",
                    state,
                })
            }
        },
        Command::Stop => recorder.stop()?,
        Command::SetPath(path) => recorder.reconfigure(path)?,
        Command::Status => println!("{}", status_line(recorder)),
        Command::Help => println!("{}", HELP),
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

fn status_line<C, E>(recorder: &ScreenRecorder<C, E>) -> String
where
    C: ScreenCaptureSource + 'static,
    E: VideoEncoder + 'static,
{
    let config = recorder.configuration();
    let mut line = format!("{} | output {}", recorder.state(), config.output_path.display());
    if let Some(active) = recorder.active_duration() {
        line.push_str(&format!(" | {:.1}s recorded", active.as_secs_f64()));
    }
    line
}
