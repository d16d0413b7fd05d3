//! Session state shared by the dispatch loop and the command loop.
//!
//! Two field groups, each behind its own lock:
//! - the correlation id counter together with the pending-request registry,
//!   so allocating an id and registering the request is one critical section
//!   no matter how many flows issue requests;
//! - the append-only log of scripts reported by the target.
//!
//! [`SessionState`] is a handle; clones share the same state.

use crate::protocol::{RequestMessage, ScriptRecord};

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::{Mutex, RwLock};

/// A request that has been sent and not yet answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub id: u64,
    pub method: String,
}

impl OutboundRequest {
    pub fn to_message(&self) -> RequestMessage {
        RequestMessage {
            id: self.id,
            method: self.method.clone(),
            params: None,
        }
    }
}

#[derive(Debug, Default)]
struct PendingRequests {
    last_id: u64,
    requests: HashMap<u64, OutboundRequest>,
}

impl PendingRequests {
    fn allocate(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    fn register(&mut self, id: u64, method: &str) -> OutboundRequest {
        let request = OutboundRequest {
            id,
            method: method.to_string(),
        };

        if let Some(previous) = self.requests.insert(id, request.clone()) {
            warn!(
                "Request id {id} re-registered ({} replaced by {method})",
                previous.method
            );
        }

        request
    }
}

#[derive(Clone)]
pub struct SessionState {
    pending: Arc<Mutex<PendingRequests>>,
    scripts: Arc<RwLock<Vec<ScriptRecord>>>,
    internal_prefix: Arc<str>,
}

impl SessionState {
    /// Create empty state. Script URLs starting with `internal_prefix` are
    /// hidden from [`list_scripts(false)`](Self::list_scripts).
    pub fn new(internal_prefix: impl Into<String>) -> Self {
        Self {
            pending: Arc::new(Mutex::new(PendingRequests::default())),
            scripts: Arc::new(RwLock::new(Vec::new())),
            internal_prefix: Arc::from(internal_prefix.into()),
        }
    }

    /// Next correlation id: 1, 2, 3, ... never reused within the session.
    pub async fn allocate(&self) -> u64 {
        self.pending.lock().await.allocate()
    }

    /// Record `id` as outstanding for `method`.
    pub async fn register(&self, id: u64, method: &str) -> OutboundRequest {
        self.pending.lock().await.register(id, method)
    }

    /// Allocate an id and register `method` under it in one step.
    pub async fn issue(&self, method: &str) -> OutboundRequest {
        let mut pending = self.pending.lock().await;
        let id = pending.allocate();
        pending.register(id, method)
    }

    /// Look up and evict the outstanding request for `id`.
    ///
    /// `None` for ids that were never issued or were already resolved.
    pub async fn resolve(&self, id: u64) -> Option<OutboundRequest> {
        self.pending.lock().await.requests.remove(&id)
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.requests.len()
    }

    /// Append a script to the discovery log. Duplicates are kept.
    pub async fn record_script(&self, record: ScriptRecord) {
        debug!("Script parsed: {} {}", record.script_id, record.url);
        self.scripts.write().await.push(record);
    }

    pub async fn script_count(&self) -> usize {
        self.scripts.read().await.len()
    }

    /// Snapshot of the scripts recorded so far, in discovery order.
    pub async fn list_scripts(&self, include_internal: bool) -> ScriptListing {
        ScriptListing {
            records: self.scripts.read().await.clone(),
            internal_prefix: Arc::clone(&self.internal_prefix),
            include_internal,
        }
    }

    pub fn internal_prefix(&self) -> &str {
        &self.internal_prefix
    }
}

/// Scripts as they were when the listing was taken.
///
/// [`iter`](Self::iter) filters lazily and can be called repeatedly.
#[derive(Debug, Clone)]
pub struct ScriptListing {
    records: Vec<ScriptRecord>,
    internal_prefix: Arc<str>,
    include_internal: bool,
}

impl ScriptListing {
    pub fn iter(&self) -> impl Iterator<Item = &ScriptRecord> + '_ {
        self.records
            .iter()
            .filter(|record| self.include_internal || !record.is_internal(&self.internal_prefix))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}
