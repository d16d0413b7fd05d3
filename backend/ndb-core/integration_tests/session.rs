use crate::helpers::{
    SharedBuffer, answer_bootstrap, drain_until_closed, inspector_config_for, mock_discovery,
    receive_json, script_parsed, send_json, spawn_fake_target, wait_for_scripts,
};

use ndb_core::channel;
use ndb_core::discovery::TargetLocator;
use ndb_core::error::session::SessionError;
use ndb_core::session::{self, DebuggerSession, LineReader, SessionState, Termination};

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

const SESSION_TIMEOUT: Duration = Duration::from_secs(5);

/// **VALUE**: Attaching sends the three bootstrap requests with ids 1, 2, 3, in order.
///
/// **WHY THIS MATTERS**: A target started with `--inspect-brk` stays paused
/// until `Runtime.runIfWaitingForDebugger` arrives, and script events only
/// flow once `Debugger.enable` has been processed.
///
/// **BUG THIS CATCHES**: Would catch a reordered bootstrap, ids starting at 0,
/// or ids that skip.
#[tokio::test]
async fn given_discovered_target_when_attaching_then_bootstrap_ids_are_1_2_3() {
    // GIVEN: A fake target that records the first three requests
    let (ws_url, target) = spawn_fake_target(|mut ws| async move {
        let mut requests = Vec::new();
        for _ in 0..3 {
            requests.push(receive_json(&mut ws).await);
        }
        requests
    })
    .await;

    // GIVEN: Discovery lists exactly that target
    let discovery = mock_discovery(json!([{
        "url": "file:///app/main.js",
        "webSocketDebuggerUrl": ws_url
    }]))
    .await;

    // WHEN: Locating, opening and bootstrapping
    let locator = TargetLocator::new(&inspector_config_for(&discovery)).unwrap();
    let target_info = locator.locate().await.unwrap();
    let channel = channel::open(&target_info.web_socket_debugger_url)
        .await
        .unwrap();
    let (sink, _source) = channel.split();
    let session = DebuggerSession::new(sink, SessionState::new("node:internal"));
    session.bootstrap().await.unwrap();

    // THEN: The target saw ids 1, 2, 3 with the expected methods
    let requests = timeout(SESSION_TIMEOUT, target).await.unwrap().unwrap();
    assert_eq!(
        requests,
        vec![
            json!({ "id": 1, "method": "Debugger.enable" }),
            json!({ "id": 2, "method": "Runtime.enable" }),
            json!({ "id": 3, "method": "Runtime.runIfWaitingForDebugger" }),
        ]
    );

    // AND: All three are pending until their replies arrive
    assert_eq!(session.state().pending_count().await, 3);
}

/// **VALUE**: End to end, an internal script is hidden by `sources` and shown by `sources --all`.
///
/// **WHY THIS MATTERS**: Exercises both loops together: the dispatch loop
/// records the event while the command loop waits for input, then the
/// command loop reads what was recorded.
#[tokio::test]
async fn given_internal_script_event_when_listing_then_only_all_shows_it() {
    // GIVEN: A target that announces one internal script after bootstrap
    let (ws_url, target) = spawn_fake_target(|mut ws| async move {
        answer_bootstrap(&mut ws).await;
        send_json(&mut ws, script_parsed("42", "node:internal/foo.js")).await;
        drain_until_closed(&mut ws).await
    })
    .await;

    let (input_tx, input_rx) = mpsc::channel(4);
    let out = SharedBuffer::default();
    let state = SessionState::new("node:internal");

    // WHEN: The session runs
    let channel = channel::open(&ws_url).await.unwrap();
    let running = tokio::spawn(session::run(
        channel,
        state.clone(),
        LineReader::from_channel(input_rx),
        out.clone(),
    ));

    // AND: The event has been recorded
    assert!(wait_for_scripts(&state, 1).await);

    // AND: The operator lists with and without --all, then exits
    for line in ["sources", "sources --all", "exit"] {
        input_tx.send(Ok(line.to_string())).await.unwrap();
    }

    // THEN: The session ends cleanly and closes the channel
    let termination = timeout(SESSION_TIMEOUT, running)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert!(termination.is_clean());
    assert!(timeout(SESSION_TIMEOUT, target).await.unwrap().unwrap());

    // AND: Only the second listing printed the script
    assert_eq!(
        out.plain_text(),
        "(ndb) (ndb) 42: node:internal/foo.js\n(ndb) "
    );

    // AND: Every bootstrap reply was correlated and evicted
    assert_eq!(state.pending_count().await, 0);
}

#[tokio::test]
async fn given_two_script_events_when_listing_then_discovery_order_is_kept() {
    // GIVEN: A target that announces app.js then lib.js
    let (ws_url, target) = spawn_fake_target(|mut ws| async move {
        answer_bootstrap(&mut ws).await;
        send_json(&mut ws, script_parsed("1", "app.js")).await;
        send_json(&mut ws, script_parsed("2", "lib.js")).await;
        drain_until_closed(&mut ws).await
    })
    .await;

    let (input_tx, input_rx) = mpsc::channel(4);
    let out = SharedBuffer::default();
    let state = SessionState::new("node:internal");

    let channel = channel::open(&ws_url).await.unwrap();
    let running = tokio::spawn(session::run(
        channel,
        state.clone(),
        LineReader::from_channel(input_rx),
        out.clone(),
    ));

    assert!(wait_for_scripts(&state, 2).await);

    // WHEN: Listing and exiting
    input_tx.send(Ok(String::from("sources"))).await.unwrap();
    input_tx.send(Ok(String::from("exit"))).await.unwrap();

    let termination = timeout(SESSION_TIMEOUT, running)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let _ = timeout(SESSION_TIMEOUT, target).await;

    // THEN: app.js is listed before lib.js
    assert!(termination.is_clean());
    let text = out.plain_text();
    let app = text.find("1: app.js").expect("app.js missing");
    let lib = text.find("2: lib.js").expect("lib.js missing");
    assert!(app < lib);
}

/// **VALUE**: Losing the channel while the operator sits at the prompt ends the session with an error.
///
/// **WHY THIS MATTERS**: The command loop is blocked on input and will never
/// notice on its own; the dispatch loop's error signal must be enough to end
/// the session.
///
/// **BUG THIS CATCHES**: Would catch a coordinator that waits for both loops,
/// which would hang here, or one that reports a clean exit.
#[tokio::test]
async fn given_channel_drops_mid_prompt_when_running_then_single_failure_no_clean_exit() {
    // GIVEN: A target that disappears right after bootstrap
    let (ws_url, target) = spawn_fake_target(|mut ws| async move {
        for _ in 0..3 {
            receive_json(&mut ws).await;
        }
        drop(ws);
    })
    .await;

    // GIVEN: Operator input that stays open but never produces a line
    let (_input_tx, input_rx) = mpsc::channel(1);
    let out = SharedBuffer::default();

    // WHEN: Running the session
    let channel = channel::open(&ws_url).await.unwrap();
    let termination = timeout(
        SESSION_TIMEOUT,
        session::run(
            channel,
            SessionState::new("node:internal"),
            LineReader::from_channel(input_rx),
            out.clone(),
        ),
    )
    .await
    .expect("Session must end when the channel drops")
    .expect("Close failures after a session error are not returned");

    let _ = target.await;

    // THEN: A transport failure, not a clean exit
    assert!(!termination.is_clean());
    assert!(matches!(
        termination,
        Termination::Failed(SessionError::TransportRead { .. })
    ));

    // AND: The prompt had been printed once, nothing else
    assert_eq!(out.plain_text(), "(ndb) ");
}

#[tokio::test]
async fn given_malformed_frame_when_running_then_decode_failure_ends_session() {
    // GIVEN: A target that sends garbage after bootstrap
    let (ws_url, target) = spawn_fake_target(|mut ws| async move {
        answer_bootstrap(&mut ws).await;
        ws.send(Message::text(String::from("{\"method\":")))
            .await
            .unwrap();
        drain_until_closed(&mut ws).await
    })
    .await;

    let (_input_tx, input_rx) = mpsc::channel(1);

    // WHEN: Running the session
    let channel = channel::open(&ws_url).await.unwrap();
    let termination = timeout(
        SESSION_TIMEOUT,
        session::run(
            channel,
            SessionState::new("node:internal"),
            LineReader::from_channel(input_rx),
            SharedBuffer::default(),
        ),
    )
    .await
    .unwrap()
    .unwrap();

    let _ = timeout(SESSION_TIMEOUT, target).await;

    // THEN: The session failed with a decode error
    assert!(matches!(
        termination,
        Termination::Failed(SessionError::Decode { .. })
    ));
}

#[tokio::test]
async fn given_unreachable_endpoint_when_opening_then_open_error() {
    let result = channel::open("ws://127.0.0.1:1/nobody-home").await;

    assert!(matches!(
        result,
        Err(ndb_core::error::channel::ChannelError::Open { .. })
    ));
}
