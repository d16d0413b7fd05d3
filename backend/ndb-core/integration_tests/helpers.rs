//! Test helpers for session integration tests.
//!
//! - a fake inspector target: a local WebSocket server driven by a closure
//! - a mocked discovery endpoint pointing at it
//! - a cloneable output buffer for the command loop

use ndb_core::config::InspectorConfig;
use ndb_core::session::SessionState;

use std::future::Future;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub type TargetSocket = WebSocketStream<TcpStream>;

/// Start a fake debug target that accepts one connection and hands it to `behavior`.
///
/// Returns the `ws://` URL to connect to and the behavior's task.
pub async fn spawn_fake_target<F, Fut, T>(behavior: F) -> (String, JoinHandle<T>)
where
    F: FnOnce(TargetSocket) -> Fut + Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake target");
    let addr = listener.local_addr().expect("Fake target has no address");

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("Failed to accept");
        let ws = accept_async(stream).await.expect("WebSocket handshake failed");
        behavior(ws).await
    });

    (format!("ws://{addr}/fake-target"), handle)
}

/// Read the next text frame as JSON.
pub async fn receive_json(ws: &mut TargetSocket) -> Value {
    loop {
        let msg = ws
            .next()
            .await
            .expect("Channel ended early")
            .expect("Error receiving frame");

        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("Frame is not JSON");
        }
    }
}

pub async fn send_json(ws: &mut TargetSocket, value: Value) {
    ws.send(Message::text(value.to_string()))
        .await
        .expect("Failed to send frame");
}

/// Read the three bootstrap requests and answer each of them.
pub async fn answer_bootstrap(ws: &mut TargetSocket) -> Vec<Value> {
    let mut requests = Vec::new();
    for _ in 0..3 {
        let request = receive_json(ws).await;
        send_json(ws, json!({ "id": request["id"], "result": {} })).await;
        requests.push(request);
    }
    requests
}

/// Keep reading until the client closes the channel.
pub async fn drain_until_closed(ws: &mut TargetSocket) -> bool {
    while let Some(msg) = ws.next().await {
        match msg {
            Ok(Message::Close(_)) => return true,
            Ok(_) => {}
            Err(_) => return false,
        }
    }
    false
}

pub fn script_parsed(script_id: &str, url: &str) -> Value {
    json!({
        "method": "Debugger.scriptParsed",
        "params": { "scriptId": script_id, "url": url, "executionContextId": 1 }
    })
}

/// Mock discovery endpoint returning `targets` at `/json`.
pub async fn mock_discovery(targets: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(targets))
        .mount(&server)
        .await;
    server
}

pub fn inspector_config_for(server: &MockServer) -> InspectorConfig {
    InspectorConfig {
        host: server.address().ip().to_string(),
        port: server.address().port(),
        ..InspectorConfig::default()
    }
}

/// Wait until the dispatch loop has recorded `count` scripts.
pub async fn wait_for_scripts(state: &SessionState, count: usize) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while tokio::time::Instant::now() < deadline {
        if state.script_count().await >= count {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

/// Output sink shared between the command loop and the test.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Captured output with terminal color sequences removed.
    pub fn plain_text(&self) -> String {
        let raw = self.0.lock().expect("Buffer poisoned").clone();
        let text = String::from_utf8_lossy(&raw).to_string();
        let mut plain = String::with_capacity(text.len());
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c == '\u{1b}' {
                for c in chars.by_ref() {
                    if c.is_ascii_alphabetic() {
                        break;
                    }
                }
            } else {
                plain.push(c);
            }
        }
        plain
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("Buffer poisoned").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
