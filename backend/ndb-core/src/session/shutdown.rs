//! Termination signalling between the session loops and the entry point.
//!
//! Two single-slot channels: one for a clean exit, one for a fatal error.
//! Senders never block; once a slot is full, or nobody is listening any
//! more, later signals are dropped. The watcher takes whichever arrives
//! first.

use crate::error::session::SessionError;

use log::{debug, error};
use tokio::sync::mpsc;

/// How a session ended.
#[derive(Debug)]
pub enum Termination {
    /// The operator asked to leave.
    CleanExit,
    /// One of the loops failed.
    Failed(SessionError),
}

impl Termination {
    pub fn is_clean(&self) -> bool {
        matches!(self, Termination::CleanExit)
    }
}

/// Sending side, cloned into each loop.
#[derive(Clone)]
pub struct ShutdownSignal {
    done_tx: mpsc::Sender<()>,
    error_tx: mpsc::Sender<SessionError>,
}

/// Receiving side, held by the entry point.
pub struct ShutdownWatch {
    done_rx: mpsc::Receiver<()>,
    error_rx: mpsc::Receiver<SessionError>,
}

pub fn channel() -> (ShutdownSignal, ShutdownWatch) {
    let (done_tx, done_rx) = mpsc::channel(1);
    let (error_tx, error_rx) = mpsc::channel(1);

    (
        ShutdownSignal { done_tx, error_tx },
        ShutdownWatch { done_rx, error_rx },
    )
}

impl ShutdownSignal {
    pub fn request_exit(&self) {
        if self.done_tx.try_send(()).is_err() {
            debug!("Exit already signalled or no longer observed");
        }
    }

    pub fn report_error(&self, err: SessionError) {
        error!("Session failed ({}): {err}", err.category());

        if let Err(e) = self.error_tx.try_send(err) {
            debug!("Dropping late session error: {}", e.into_inner());
        }
    }
}

impl ShutdownWatch {
    /// Wait for the first termination signal.
    ///
    /// If every sender is gone without signalling, that is reported as a
    /// failure rather than waiting forever.
    pub async fn wait(mut self) -> Termination {
        tokio::select! {
            Some(()) = self.done_rx.recv() => Termination::CleanExit,
            Some(err) = self.error_rx.recv() => Termination::Failed(err),
            else => Termination::Failed(SessionError::transport_read(
                "session loops ended without signalling",
            )),
        }
    }
}
