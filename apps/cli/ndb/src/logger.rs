//! Logging for the `ndb` binary.
//!
//! Standard output belongs to the prompt, so records go to a log file and,
//! with `--verbose`, to a colored stderr sink.

use crate::error::NdbError;

use common::ErrorLocation;

use std::io::stderr;
use std::panic::Location;
use std::path::Path;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use humantime::format_rfc3339;
use log::{LevelFilter, info, warn};

static INIT_LOGGER_ONCE: Once = Once::new();

static LOGGER_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

pub const LOG_FILE_NAME: &str = "ndb.log";

const LOGGER_INITIALIZED_MESSAGE_PREFIX: &str = "Logger initialized with level: ";

const LOGGER_ALREADY_INITIALIZED_MESSAGE: &str = "Logger already initialized";

/// Initialize the global logger.
///
/// Safe to call more than once: later calls log a warning and return `Ok`.
///
/// # Arguments
///
/// * `log_dir` - Directory where `ndb.log` is created (must exist)
/// * `level` - Maximum level recorded
/// * `echo_stderr` - Also write colored records to stderr
///
/// # Errors
///
/// Returns [`NdbError::Logger`] if the log file cannot be opened or a
/// global logger is already installed by someone else.
pub fn initialize(log_dir: &Path, level: LevelFilter, echo_stderr: bool) -> Result<(), NdbError> {
    if LOGGER_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        warn!("{LOGGER_ALREADY_INITIALIZED_MESSAGE}");
        return Ok(());
    }

    let mut result = Ok(());

    INIT_LOGGER_ONCE.call_once(|| {
        result = initialize_internal(log_dir, level, echo_stderr);
        if result.is_ok() {
            info!("{LOGGER_INITIALIZED_MESSAGE_PREFIX}{level:?}");
        }
    });

    result
}

#[track_caller]
fn initialize_internal(log_dir: &Path, level: LevelFilter, echo_stderr: bool) -> Result<(), NdbError> {
    let log_file_path = log_dir.join(LOG_FILE_NAME);

    let file_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} [{file}:{line}]",
                date = format_rfc3339(SystemTime::now()),
                level = record.level(),
                message = message,
                file = record.file().unwrap_or("unknown"),
                line = record.line().unwrap_or(0)
            ))
        })
        .chain(fern::log_file(&log_file_path).map_err(|e| NdbError::Logger {
            message: format!("Failed to create log file {}: {e}", log_file_path.display()),
            location: ErrorLocation::from(Location::caller()),
        })?);

    let mut dispatch = Dispatch::new().level(level).chain(file_dispatch);

    if echo_stderr {
        let colors = ColoredLevelConfig::new()
            .debug(Blue)
            .info(Green)
            .warn(Yellow)
            .error(Red)
            .trace(Magenta);

        dispatch = dispatch.chain(
            Dispatch::new()
                .format(move |out, message, record| {
                    out.finish(format_args!(
                        "[{date} - {level}] {message}",
                        date = format_rfc3339(SystemTime::now()),
                        level = colors.color(record.level()),
                        message = message,
                    ))
                })
                .chain(stderr()),
        );
    }

    dispatch.apply().map_err(|e| NdbError::Logger {
        message: format!("Failed to initialize logger: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok(())
}
