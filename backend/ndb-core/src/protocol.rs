//! Wire types for the inspector's JSON message protocol.
//!
//! Outbound frames are [`RequestMessage`]s. Inbound frames are decoded into a
//! [`ResponseMessage`] with every field optional, then classified by which
//! fields are present: a non-zero `id` makes it a reply, a `method` makes it
//! an event. There is no discriminant tag on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEBUGGER_ENABLE: &str = "Debugger.enable";
pub const RUNTIME_ENABLE: &str = "Runtime.enable";
pub const RUNTIME_RUN_IF_WAITING_FOR_DEBUGGER: &str = "Runtime.runIfWaitingForDebugger";
pub const DEBUGGER_GET_SCRIPT_SOURCE: &str = "Debugger.getScriptSource";
pub const DEBUGGER_SCRIPT_PARSED: &str = "Debugger.scriptParsed";
pub const DEBUGGER_PAUSED: &str = "Debugger.paused";
pub const DEBUGGER_RESUMED: &str = "Debugger.resumed";

/// Requests sent right after the channel opens, in this order.
pub const BOOTSTRAP_METHODS: [&str; 3] = [
    DEBUGGER_ENABLE,
    RUNTIME_ENABLE,
    RUNTIME_RUN_IF_WAITING_FOR_DEBUGGER,
];

/// One entry of the discovery endpoint's target listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugTarget {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    pub url: String,
    pub web_socket_debugger_url: String,
}

/// A request as it is written to the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestMessage {
    pub id: u64,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Error object carried by a reply in place of `result`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Any inbound frame, before classification.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RemoteError>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: Option<Value>,
}

/// A classified inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    Reply {
        id: u64,
        result: Value,
        error: Option<RemoteError>,
    },
    Event {
        method: String,
        params: Value,
    },
    Unrecognized,
}

impl ResponseMessage {
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Split the frame into the messages it carries.
    ///
    /// A frame with both a non-zero id and a method yields the reply first
    /// and then the event; the two paths are independent.
    pub fn into_inbound(self) -> Vec<InboundMessage> {
        let mut messages = Vec::with_capacity(1);

        if let Some(id) = self.id.filter(|id| *id != 0) {
            messages.push(InboundMessage::Reply {
                id,
                result: self.result.unwrap_or(Value::Null),
                error: self.error,
            });
        }

        if let Some(method) = self.method {
            messages.push(InboundMessage::Event {
                method,
                params: self.params.unwrap_or(Value::Null),
            });
        }

        if messages.is_empty() {
            messages.push(InboundMessage::Unrecognized);
        }

        messages
    }
}

/// A script the target reported through `Debugger.scriptParsed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptRecord {
    pub script_id: String,
    #[serde(default)]
    pub url: String,
}

impl ScriptRecord {
    pub fn new(script_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            script_id: script_id.into(),
            url: url.into(),
        }
    }

    pub fn from_params(params: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(params)
    }

    pub fn is_internal(&self, prefix: &str) -> bool {
        self.url.starts_with(prefix)
    }
}

/// Result payload of `Debugger.getScriptSource`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptSource {
    #[serde(default)]
    pub script_source: String,
}
