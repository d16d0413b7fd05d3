//! Startup sequence: config, logger, discovery, channel, session.

use crate::cli::Args;
use crate::error::NdbError;
use crate::logger;

use ndb_core::channel;
use ndb_core::config::NdbConfig;
use ndb_core::discovery::TargetLocator;
use ndb_core::error::CoreError;
use ndb_core::session::{self, LineReader, SessionState, Termination};

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;

use log::info;

/// Load the config file and apply command line overrides.
///
/// # Errors
///
/// Returns [`NdbError::Config`] if the file is unreadable or the final
/// values do not validate.
pub fn prepare_config(args: &Args) -> Result<NdbConfig, NdbError> {
    let mut config = NdbConfig::load(&args.config_dir())?;
    args.apply_to(&mut config);
    config.validate()?;
    Ok(config)
}

/// Create the log directory and install the logger at the configured level.
pub fn start_logging(args: &Args, config: &NdbConfig) -> Result<(), NdbError> {
    let log_dir = args.log_dir();

    create_dir_all(&log_dir).map_err(|e| NdbError::Startup {
        message: format!("Failed to create log directory {}: {e}", log_dir.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let level = config.logging.level_filter().ok_or_else(|| NdbError::Config {
        message: format!("Unknown log level: {}", config.logging.level),
        location: ErrorLocation::from(Location::caller()),
    })?;

    logger::initialize(&log_dir, level, args.verbose)?;
    info!("Log directory: {}", log_dir.display());
    Ok(())
}

/// Find the first target, attach to it and run the interactive session
/// over stdin and stdout.
pub async fn attach(config: &NdbConfig) -> Result<Termination, NdbError> {
    let locator = TargetLocator::new(&config.inspector).map_err(CoreError::from)?;
    let target = locator.locate().await.map_err(CoreError::from)?;

    let channel = channel::open(&target.web_socket_debugger_url)
        .await
        .map_err(CoreError::from)?;

    let state = SessionState::new(config.session.internal_prefix.as_str());
    let termination = session::run(channel, state, LineReader::stdin(), std::io::stdout())
        .await
        .map_err(CoreError::from)?;

    Ok(termination)
}

/// Full startup sequence from parsed arguments to session end.
pub async fn run(args: Args) -> Result<Termination, NdbError> {
    let config = prepare_config(&args)?;
    start_logging(&args, &config)?;

    info!("ndb starting");
    attach(&config).await
}
