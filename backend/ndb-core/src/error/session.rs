use crate::error::channel::ChannelError;

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

/// Failures that end a running session.
///
/// Each of these is delivered once through the session's error signal and
/// terminates the loop that produced it.
#[derive(Debug, ThisError)]
pub enum SessionError {
    #[error("Transport Read Error: {message} {location}")]
    TransportRead {
        message: String,
        location: ErrorLocation,
    },

    #[error("Decode Error: {message} {location}")]
    Decode {
        message: String,
        location: ErrorLocation,
    },

    #[error("Input Error: {message} {location}")]
    Input {
        message: String,
        location: ErrorLocation,
    },

    #[error(transparent)]
    Send(#[from] ChannelError),
}

impl SessionError {
    #[track_caller]
    pub fn transport_read(message: impl Into<String>) -> Self {
        SessionError::TransportRead {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn decode(message: impl Into<String>) -> Self {
        SessionError::Decode {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn input(message: impl Into<String>) -> Self {
        SessionError::Input {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Short category name, used in log lines.
    pub fn category(&self) -> &'static str {
        match self {
            SessionError::TransportRead { .. } => "transport_read",
            SessionError::Decode { .. } => "decode",
            SessionError::Input { .. } => "input",
            SessionError::Send(_) => "send",
        }
    }
}

impl From<serde_json::Error> for SessionError {
    #[track_caller]
    fn from(error: serde_json::Error) -> Self {
        SessionError::Decode {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
