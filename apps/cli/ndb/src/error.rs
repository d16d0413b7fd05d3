use ndb_core::error::CoreError;
use ndb_core::error::config::ConfigError;

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error;

/// Errors that stop `ndb` before or while attaching.
#[derive(Debug, Error)]
pub enum NdbError {
    /// Could not prepare the process (directories, runtime)
    #[error("Startup Error: {message} {location}")]
    Startup {
        message: String,
        location: ErrorLocation,
    },

    /// Logger could not be installed
    #[error("Logger Error: {message} {location}")]
    Logger {
        message: String,
        location: ErrorLocation,
    },

    /// Configuration could not be loaded or is invalid after overrides
    #[error("Config Error: {message} {location}")]
    Config {
        message: String,
        location: ErrorLocation,
    },

    /// Discovery, channel or session failure
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<ConfigError> for NdbError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        NdbError::Config {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
