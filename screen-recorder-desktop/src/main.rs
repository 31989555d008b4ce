use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::Receiver;
use std::thread;
use std::time::Duration;

use screen_recorder_core::{MjpegAviEncoder, RecorderConfiguration, RecorderError, RecorderEvent, ScreenRecorder};
use screen_recorder_desktop::commands::{self, Flow, HELP};
use screen_recorder_desktop::XcapScreenSource;

/// How long `quit` waits for an active session to finalize.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Recorder(#[from] RecorderError),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    let mut config = RecorderConfiguration::default();
    if let Some(path) = std::env::args_os().nth(1) {
        config.output_path = PathBuf::from(path);
    }
    config.validate().map_err(RecorderError::InvalidConfiguration)?;

    let recorder = ScreenRecorder::new(XcapScreenSource::primary(), MjpegAviEncoder, config);
    let printer = {
        let events = recorder.subscribe();
        thread::Builder::new()
            .name("event-printer".into())
            .spawn(move || print_events(events))?
    };

    println!("{}", HELP);
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let command = match commands::parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        match commands::execute(&recorder, command) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => println!("error: {}", e),
        }
        io::stdout().flush()?;
    }

    // Input closed or quit: finish the session in flight before exiting.
    if recorder.stop().is_ok() || !recorder.state().is_idle() {
        println!("finalizing recording...");
        if !recorder.wait_until_idle(SHUTDOWN_TIMEOUT) {
            log::warn!("Recording did not finalize within {:?}", SHUTDOWN_TIMEOUT);
        }
    }

    drop(recorder);
    if printer.join().is_err() {
        log::warn!("Event printer exited abnormally");
    }
    Ok(())
}

fn print_events(events: Receiver<RecorderEvent>) {
    for event in events {
        match event {
            RecorderEvent::Started {
                session_id,
                file_path,
                width,
                height,
            } => println!(
                "started: {} ({}x{}) session {}",
                file_path.display(),
                width,
                height,
                session_id
            ),
            RecorderEvent::Paused => println!("paused"),
            RecorderEvent::Resumed => println!("resumed"),
            RecorderEvent::Failed { error } => println!("failed: {}", error),
            RecorderEvent::Stopped { result: Some(result) } => match serde_json::to_string_pretty(&result) {
                Ok(json) => println!("stopped:\n{}", json),
                Err(e) => println!("stopped: {} ({})", result.file_path.display(), e),
            },
            RecorderEvent::Stopped { result: None } => println!("stopped: output could not be finalized"),
        }
    }
}
