//! Inbound dispatch loop.
//!
//! Reads frames off the channel one at a time, decodes them, correlates
//! replies with outstanding requests and records events. Any read or decode
//! failure ends the loop; unknown ids and methods are ignored.

use crate::error::session::SessionError;
use crate::protocol::{
    DEBUGGER_GET_SCRIPT_SOURCE, DEBUGGER_PAUSED, DEBUGGER_RESUMED, DEBUGGER_SCRIPT_PARSED,
    InboundMessage, RemoteError, ResponseMessage, ScriptRecord, ScriptSource,
};
use crate::session::shutdown::ShutdownSignal;
use crate::session::state::{OutboundRequest, SessionState};

use futures_util::{Stream, StreamExt};
use log::{debug, info, trace, warn};
use serde_json::Value;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::Message;

/// Run the loop and turn its failure into the session's error signal.
pub async fn run<R>(source: R, state: SessionState, signal: ShutdownSignal)
where
    R: Stream<Item = Result<Message, WsError>> + Unpin,
{
    if let Err(e) = dispatch_frames(source, &state).await {
        signal.report_error(e);
    }
}

/// Process frames until the channel fails or closes.
///
/// Never returns `Ok`: a healthy channel keeps the loop running, and the end
/// of the stream is itself a transport failure.
pub async fn dispatch_frames<R>(mut source: R, state: &SessionState) -> Result<(), SessionError>
where
    R: Stream<Item = Result<Message, WsError>> + Unpin,
{
    info!("Inbound dispatch loop started");

    while let Some(frame) = source.next().await {
        let frame =
            frame.map_err(|e| SessionError::transport_read(format!("Failed to read frame: {e}")))?;

        match frame {
            Message::Text(text) => dispatch_text(text.as_str(), state).await?,
            Message::Binary(data) => {
                let text = std::str::from_utf8(&data).map_err(|e| {
                    SessionError::decode(format!("Binary frame is not UTF-8: {e}"))
                })?;
                dispatch_text(text, state).await?;
            }
            Message::Close(frame) => {
                let reason = frame
                    .map(|f| format!("{} {}", u16::from(f.code), f.reason.as_str()))
                    .unwrap_or_else(|| String::from("no close frame"));
                return Err(SessionError::transport_read(format!(
                    "Channel closed by target: {reason}"
                )));
            }
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {
                trace!("Skipping control frame");
            }
        }
    }

    Err(SessionError::transport_read("Channel closed"))
}

/// Decode one text frame and route what it carries.
pub async fn dispatch_text(text: &str, state: &SessionState) -> Result<(), SessionError> {
    debug!("<- {text}");

    let message = ResponseMessage::decode(text)?;

    for inbound in message.into_inbound() {
        match inbound {
            InboundMessage::Reply { id, result, error } => {
                handle_reply(id, result, error, state).await;
            }
            InboundMessage::Event { method, params } => {
                handle_event(&method, params, state).await?;
            }
            InboundMessage::Unrecognized => {
                trace!("Ignoring frame with neither id nor method");
            }
        }
    }

    Ok(())
}

async fn handle_reply(id: u64, result: Value, error: Option<RemoteError>, state: &SessionState) {
    let Some(request) = state.resolve(id).await else {
        warn!("Reply for unknown request id {id}");
        return;
    };

    if let Some(error) = error {
        warn!(
            "{} (id {}) failed: {} ({})",
            request.method, request.id, error.message, error.code
        );
        return;
    }

    debug!("Reply for {} (id {})", request.method, request.id);

    if request.method == DEBUGGER_GET_SCRIPT_SOURCE {
        on_script_source(&request, result);
    }
}

/// Hook for `Debugger.getScriptSource` replies.
///
/// No command fetches source yet, so a correlated reply is only logged.
pub(crate) fn on_script_source(request: &OutboundRequest, result: Value) {
    match serde_json::from_value::<ScriptSource>(result) {
        Ok(source) => debug!(
            "Script source for request {} ({} bytes)",
            request.id,
            source.script_source.len()
        ),
        Err(e) => debug!("Unreadable script source for request {}: {e}", request.id),
    }
}

async fn handle_event(method: &str, params: Value, state: &SessionState) -> Result<(), SessionError> {
    match method {
        DEBUGGER_SCRIPT_PARSED => {
            let record = ScriptRecord::from_params(params).map_err(|e| {
                SessionError::decode(format!("Invalid {DEBUGGER_SCRIPT_PARSED} params: {e}"))
            })?;
            state.record_script(record).await;
        }
        DEBUGGER_PAUSED => info!("Target paused"),
        DEBUGGER_RESUMED => info!("Target resumed"),
        other => trace!("Ignoring event {other}"),
    }

    Ok(())
}
