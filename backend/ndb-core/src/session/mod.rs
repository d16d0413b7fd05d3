//! The debugger session.
//!
//! After the channel opens, the session sends the bootstrap requests and
//! then runs two loops side by side:
//!
//! - the inbound dispatch loop ([`dispatch`]) reads every frame the target
//!   sends, correlating replies and recording events in [`SessionState`];
//! - the command loop ([`repl`]) reads operator commands and answers them
//!   from that same state.
//!
//! Each loop delivers at most one termination signal ([`shutdown`]). The
//! first one observed ends the session, after which both loops are stopped
//! and the channel is closed.

pub mod command;
pub mod dispatch;
pub mod input;
pub mod repl;
pub mod shutdown;
pub mod state;

pub use command::Command;
pub use input::LineReader;
pub use shutdown::{ShutdownSignal, ShutdownWatch, Termination};
pub use state::{OutboundRequest, ScriptListing, SessionState};

use crate::channel::{DebugChannel, Outbound};
use crate::error::channel::ChannelError;
use crate::protocol::BOOTSTRAP_METHODS;

use std::io::Write;

use futures_util::{Sink, StreamExt};
use log::{info, warn};
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::Message;

/// Session state plus the write half of the channel.
pub struct DebuggerSession<S> {
    state: SessionState,
    outbound: Outbound<S>,
}

impl<S> DebuggerSession<S>
where
    S: Sink<Message, Error = WsError> + Unpin + Send,
{
    pub fn new(sink: S, state: SessionState) -> Self {
        Self {
            state,
            outbound: Outbound::new(sink),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Issue a request for `method` without waiting for its reply.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Send`] if the frame cannot be written. The
    /// request stays registered; its id is not reused.
    pub async fn request(&self, method: &str) -> Result<OutboundRequest, ChannelError> {
        let request = self.state.issue(method).await;
        self.outbound.send(&request.to_message()).await?;
        Ok(request)
    }

    /// Enable the debugger and runtime domains, then release a target that
    /// is waiting for a debugger to attach.
    pub async fn bootstrap(&self) -> Result<(), ChannelError> {
        for method in BOOTSTRAP_METHODS {
            self.request(method).await?;
        }

        info!("Bootstrap requests sent");
        Ok(())
    }

    pub async fn close(&self) -> Result<(), ChannelError> {
        self.outbound.close().await
    }
}

/// Drive a full session over an open channel.
///
/// Returns how the session ended. A failure to close the channel is only
/// returned as an error after a clean exit; after a session failure it is
/// logged and the failure is reported instead.
///
/// # Errors
///
/// Returns [`ChannelError`] if the bootstrap requests cannot be sent, or if
/// closing the channel fails after a clean exit.
pub async fn run<W>(
    channel: DebugChannel,
    state: SessionState,
    lines: LineReader,
    out: W,
) -> Result<Termination, ChannelError>
where
    W: Write + Send + 'static,
{
    let (sink, source) = channel.split();
    let session = DebuggerSession::new(sink, state);

    session.bootstrap().await?;

    let (signal, watch) = shutdown::channel();

    let dispatch_task = tokio::spawn(dispatch::run(
        source,
        session.state().clone(),
        signal.clone(),
    ));
    let command_task = tokio::spawn(repl::run(lines, out, session.state().clone(), signal));

    let termination = watch.wait().await;

    dispatch_task.abort();
    command_task.abort();

    match (session.close().await, termination) {
        (Ok(()), termination) => Ok(termination),
        (Err(e), Termination::CleanExit) => Err(e),
        (Err(e), failed) => {
            warn!("Channel close after session failure: {e}");
            Ok(failed)
        }
    }
}
