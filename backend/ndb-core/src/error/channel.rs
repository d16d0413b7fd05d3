use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ChannelError {
    #[error("Channel Open Error: {message} {location}")]
    Open {
        message: String,
        location: ErrorLocation,
    },

    #[error("Channel Send Error: {message} {location}")]
    Send {
        message: String,
        location: ErrorLocation,
    },

    #[error("Channel Close Error: {message} {location}")]
    Close {
        message: String,
        location: ErrorLocation,
    },
}
