// Unit tests for the inbound dispatch loop
// Frames are fed from an in-memory stream instead of a live channel

use crate::error::session::SessionError;
use crate::protocol::{DEBUGGER_GET_SCRIPT_SOURCE, ScriptRecord};
use crate::session::dispatch::{dispatch_frames, dispatch_text, on_script_source, run};
use crate::session::shutdown::{self, Termination};
use crate::session::state::{OutboundRequest, SessionState};

use futures_util::stream;
use serde_json::json;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::Message;

fn text(value: serde_json::Value) -> Result<Message, WsError> {
    Ok(Message::text(value.to_string()))
}

fn script_parsed(script_id: &str, url: &str) -> Result<Message, WsError> {
    text(json!({
        "method": "Debugger.scriptParsed",
        "params": { "scriptId": script_id, "url": url, "startLine": 0 }
    }))
}

/// **VALUE**: Each `Debugger.scriptParsed` event appends exactly one record, in arrival order.
///
/// **WHY THIS MATTERS**: `sources` shows scripts in discovery order; the
/// dispatch loop is the only writer of that log.
///
/// **BUG THIS CATCHES**: Would catch dropped, duplicated or reordered events.
#[tokio::test]
async fn given_script_parsed_events_when_dispatched_then_records_in_order() {
    // GIVEN: Two scriptParsed events followed by the end of the channel
    let state = SessionState::new("node:internal");
    let frames = stream::iter(vec![
        script_parsed("1", "app.js"),
        script_parsed("2", "lib.js"),
    ]);

    // WHEN: Running the loop to completion
    let result = dispatch_frames(frames, &state).await;

    // THEN: Both scripts were recorded in order
    let listing = state.list_scripts(true).await;
    let records: Vec<ScriptRecord> = listing.iter().cloned().collect();
    assert_eq!(
        records,
        vec![
            ScriptRecord::new("1", "app.js"),
            ScriptRecord::new("2", "lib.js")
        ]
    );

    // AND: The end of the stream is a transport failure
    assert!(matches!(result, Err(SessionError::TransportRead { .. })));
}

/// **VALUE**: A reply with an id the session never issued does not stop the loop.
///
/// **BUG THIS CATCHES**: Would catch treating an uncorrelated reply as fatal,
/// which would drop every event that follows it.
#[tokio::test]
async fn given_reply_for_unknown_id_when_dispatched_then_processing_continues() {
    // GIVEN: An orphan reply followed by an event
    let state = SessionState::new("node:internal");
    let frames = stream::iter(vec![
        text(json!({ "id": 77, "result": {} })),
        script_parsed("5", "after.js"),
    ]);

    // WHEN: Dispatching
    let _ = dispatch_frames(frames, &state).await;

    // THEN: The event after the orphan reply was still recorded
    assert_eq!(state.script_count().await, 1);
}

#[tokio::test]
async fn given_replies_for_bootstrap_requests_when_dispatched_then_registry_drains() {
    // GIVEN: Three outstanding requests
    let state = SessionState::new("node:internal");
    for method in ["Debugger.enable", "Runtime.enable", "Runtime.runIfWaitingForDebugger"] {
        state.issue(method).await;
    }

    // WHEN: Their replies arrive, one of them as a remote error
    dispatch_text(&json!({ "id": 1, "result": { "debuggerId": "x" } }).to_string(), &state)
        .await
        .unwrap();
    dispatch_text(&json!({ "id": 2, "result": {} }).to_string(), &state)
        .await
        .unwrap();
    dispatch_text(
        &json!({ "id": 3, "error": { "code": -32601, "message": "nope" } }).to_string(),
        &state,
    )
    .await
    .unwrap();

    // THEN: Nothing is left pending
    assert_eq!(state.pending_count().await, 0);
}

#[tokio::test]
async fn given_script_source_reply_when_dispatched_then_hook_correlates_it() {
    let state = SessionState::new("node:internal");
    let request = state.issue(DEBUGGER_GET_SCRIPT_SOURCE).await;

    dispatch_text(
        &json!({ "id": request.id, "result": { "scriptSource": "let a = 1;\n" } }).to_string(),
        &state,
    )
    .await
    .unwrap();

    assert_eq!(state.resolve(request.id).await, None, "Reply must evict the request");
}

#[test]
fn given_malformed_script_source_when_hook_runs_then_does_not_panic() {
    let request = OutboundRequest {
        id: 9,
        method: String::from(DEBUGGER_GET_SCRIPT_SOURCE),
    };

    on_script_source(&request, json!("not an object"));
}

#[tokio::test]
async fn given_unknown_event_when_dispatched_then_ignored() {
    let state = SessionState::new("node:internal");

    let result = dispatch_text(
        &json!({ "method": "Runtime.consoleAPICalled", "params": { "type": "log" } }).to_string(),
        &state,
    )
    .await;

    assert!(result.is_ok());
    assert_eq!(state.script_count().await, 0);
}

#[tokio::test]
async fn given_frame_without_id_or_method_when_dispatched_then_ignored() {
    let state = SessionState::new("node:internal");

    assert!(dispatch_text("{}", &state).await.is_ok());
    assert!(dispatch_text(r#"{"id":0}"#, &state).await.is_ok());
}

/// **VALUE**: Malformed JSON is fatal for the session.
///
/// **WHY THIS MATTERS**: There is no partial-message recovery; a frame that
/// cannot be decoded means the stream can no longer be trusted.
#[tokio::test]
async fn given_malformed_frame_when_dispatched_then_decode_error_stops_loop() {
    // GIVEN: Garbage followed by a valid event
    let state = SessionState::new("node:internal");
    let frames = stream::iter(vec![
        Ok(Message::text(String::from("{not json"))),
        script_parsed("1", "never.js"),
    ]);

    // WHEN: Dispatching
    let result = dispatch_frames(frames, &state).await;

    // THEN: Decode failure, and nothing after it was processed
    assert!(matches!(result, Err(SessionError::Decode { .. })));
    assert_eq!(state.script_count().await, 0);
}

#[tokio::test]
async fn given_script_parsed_without_script_id_when_dispatched_then_decode_error() {
    let state = SessionState::new("node:internal");

    let result = dispatch_text(
        &json!({ "method": "Debugger.scriptParsed", "params": { "url": "x.js" } }).to_string(),
        &state,
    )
    .await;

    assert!(matches!(result, Err(SessionError::Decode { .. })));
}

#[tokio::test]
async fn given_control_and_binary_frames_when_dispatched_then_binary_json_is_decoded() {
    let state = SessionState::new("node:internal");
    let binary = json!({
        "method": "Debugger.scriptParsed",
        "params": { "scriptId": "3", "url": "bin.js" }
    })
    .to_string()
    .into_bytes();

    let frames = stream::iter(vec![
        Ok(Message::Ping(Default::default())),
        Ok(Message::Binary(binary.into())),
        Ok(Message::Close(None)),
        script_parsed("4", "after-close.js"),
    ]);

    let result = dispatch_frames(frames, &state).await;

    assert!(matches!(result, Err(SessionError::TransportRead { .. })));
    let ids: Vec<String> = state
        .list_scripts(true)
        .await
        .iter()
        .map(|s| s.script_id.clone())
        .collect();
    assert_eq!(ids, vec![String::from("3")]);
}

#[tokio::test]
async fn given_read_error_when_loop_runs_then_reports_single_error_signal() {
    // GIVEN: A stream that fails immediately
    let state = SessionState::new("node:internal");
    let (signal, watch) = shutdown::channel();
    let frames = stream::iter(vec![Err::<Message, WsError>(WsError::ConnectionClosed)]);

    // WHEN: Running the loop wrapper
    run(frames, state, signal).await;

    // THEN: The watcher sees a transport failure
    match watch.wait().await {
        Termination::Failed(SessionError::TransportRead { message, .. }) => {
            assert!(message.contains("Failed to read frame"));
        }
        other => panic!("Expected transport failure, got {other:?}"),
    }
}
