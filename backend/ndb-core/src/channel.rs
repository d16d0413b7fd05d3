//! The bidirectional message channel to a debug target.
//!
//! A thin layer over `tokio-tungstenite`: open a WebSocket to the target's
//! debugger URL, write requests through a shared [`Outbound`] handle, and
//! close with a normal status when the session ends.

use crate::error::channel::ChannelError;
use crate::protocol::RequestMessage;

use common::ErrorLocation;

use std::panic::Location;
use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{Sink, SinkExt};
use log::{debug, info};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Utf8Bytes;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

pub type DebugChannel = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub type ChannelSink = SplitSink<DebugChannel, Message>;
pub type ChannelSource = SplitStream<DebugChannel>;

/// Open the channel to `endpoint` (a `ws://` URL from discovery).
///
/// # Errors
///
/// Returns [`ChannelError::Open`] if the connection or the WebSocket
/// handshake fails.
pub async fn open(endpoint: &str) -> Result<DebugChannel, ChannelError> {
    debug!("Opening debug channel to {endpoint}");

    let (channel, _response) = connect_async(endpoint)
        .await
        .map_err(|e| ChannelError::Open {
            message: format!("Failed to connect to {endpoint}: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    info!("Debug channel open to {endpoint}");
    Ok(channel)
}

/// Shared write half of the channel.
///
/// Cloning is cheap; all clones write to the same sink, one frame at a time.
pub struct Outbound<S> {
    sink: Arc<Mutex<S>>,
}

impl<S> Clone for Outbound<S> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<S> Outbound<S>
where
    S: Sink<Message, Error = WsError> + Unpin + Send,
{
    pub fn new(sink: S) -> Self {
        Self {
            sink: Arc::new(Mutex::new(sink)),
        }
    }

    /// Write one request as a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Send`] if the request cannot be encoded or the
    /// frame cannot be written.
    pub async fn send(&self, request: &RequestMessage) -> Result<(), ChannelError> {
        let text = serde_json::to_string(request).map_err(|e| ChannelError::Send {
            message: format!("Failed to encode request {}: {e}", request.id),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!("-> {text}");

        self.sink
            .lock()
            .await
            .send(Message::text(text))
            .await
            .map_err(|e| ChannelError::Send {
                message: format!("Failed to send {} (id {}): {e}", request.method, request.id),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Send a normal-closure frame and close the sink.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Close`] if either step fails, for instance
    /// because the remote side already went away.
    pub async fn close(&self) -> Result<(), ChannelError> {
        let mut sink = self.sink.lock().await;

        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: Utf8Bytes::from_static(""),
        };

        sink.send(Message::Close(Some(frame)))
            .await
            .map_err(|e| ChannelError::Close {
                message: format!("Failed to send close frame: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        sink.close().await.map_err(|e| ChannelError::Close {
            message: format!("Failed to close channel: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!("Debug channel closed");
        Ok(())
    }
}
