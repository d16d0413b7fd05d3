use common::{ErrorLocation, HttpStatusCode};

use std::error::Error as StdError;
use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum DiscoveryError {
    #[error("Discovery Request Error: {message} {location}")]
    Http {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Discovery Status Error: HTTP {status_code} - {message} {location}")]
    Status {
        message: String,
        status_code: HttpStatusCode,
        location: ErrorLocation,
    },

    #[error("Target List Decode Error: {message} {location}")]
    Decode {
        message: String,
        location: ErrorLocation,
    },

    #[error("No Debug Targets: {message} {location}")]
    NoTargets {
        message: String,
        location: ErrorLocation,
    },

    #[error("Discovery URL Error: {message} {location}")]
    InvalidUrl {
        message: String,
        location: ErrorLocation,
    },
}

impl From<reqwest::Error> for DiscoveryError {
    #[track_caller]
    fn from(error: reqwest::Error) -> Self {
        DiscoveryError::Http {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(error),
        }
    }
}

impl From<url::ParseError> for DiscoveryError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        DiscoveryError::InvalidUrl {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl DiscoveryError {
    /// HTTP status of the discovery response, when the endpoint answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            DiscoveryError::Status { status_code, .. } => Some(status_code.0),
            _ => None,
        }
    }
}
