//! Per-session conversation context.
//!
//! Contexts are created on first message for a session identifier and kept
//! for the process lifetime. The payload is an open-ended mapping, currently
//! unused beyond existence; it is the anchor point for future multi-turn
//! state. Access is synchronized, but two concurrent requests on one session
//! identifier interleave without a defined order.
//
// TODO: bound this with time-based eviction before multi-turn memory lands;
// until then the map grows with every distinct session identifier.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Conversation context for a single session.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub created_at: Option<DateTime<Utc>>,
    pub data: HashMap<String, Value>,
}

/// In-memory session context store.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, SessionContext>>>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the context for a session identifier.
    pub async fn touch(&self, session_id: &str) -> SessionContext {
        let mut sessions = self.inner.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionContext {
                created_at: Some(Utc::now()),
                data: HashMap::new(),
            })
            .clone()
    }

    /// Number of known sessions.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
