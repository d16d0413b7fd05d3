pub mod channel;
pub mod config;
pub mod discovery;
pub mod session;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Discovery(#[from] discovery::DiscoveryError),

    #[error(transparent)]
    Channel(#[from] channel::ChannelError),

    #[error(transparent)]
    Session(#[from] session::SessionError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}
