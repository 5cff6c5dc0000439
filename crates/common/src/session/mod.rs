//! Chat session state
//!
//! A session owns its message history, uploaded file records and a private
//! vector store. Sessions live in memory only and expire after a period of
//! inactivity; expired sessions are purged whenever the store is accessed.

use crate::classify::FileTags;
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::models::{ChatMessage, HitOrigin, UploadedFile};
use crate::vector_store::InMemoryVectorStore;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// One user's conversation
#[derive(Debug)]
pub struct ChatSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    pub messages: Vec<ChatMessage>,
    pub files: Vec<UploadedFile>,
    pub store: InMemoryVectorStore,
}

impl ChatSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            last_active_at: now,
            messages: Vec::new(),
            files: Vec::new(),
            store: InMemoryVectorStore::new(HitOrigin::Session),
        }
    }

    /// Mark the session as used now
    pub fn touch(&mut self) {
        self.last_active_at = Utc::now();
    }

    /// Tags of the uploaded files, in upload order
    pub fn file_tags(&self) -> Vec<FileTags> {
        self.files.iter().map(|f| f.tags.clone()).collect()
    }

    pub fn file_names(&self) -> Vec<String> {
        self.files.iter().map(|f| f.name.clone()).collect()
    }

    /// When the session expires; `None` when sessions never expire or the
    /// deadline is past the representable date range
    pub fn expires_at(&self, ttl: Option<Duration>) -> Option<DateTime<Utc>> {
        ttl.and_then(|ttl| self.last_active_at.checked_add_signed(ttl))
    }

    fn is_expired(&self, ttl: Option<Duration>, now: DateTime<Utc>) -> bool {
        self.expires_at(ttl).is_some_and(|at| at <= now)
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a session; requests on the same session are serialized by the mutex
pub type SharedSession = Arc<Mutex<ChatSession>>;

/// In-memory session registry with inactivity expiry
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SharedSession>>,
    ttl: Option<Duration>,
}

impl SessionStore {
    /// Create a store; a non-positive or out-of-range TTL disables expiry
    pub fn new(ttl_minutes: i64) -> Self {
        let ttl = (ttl_minutes > 0)
            .then(|| Duration::try_minutes(ttl_minutes))
            .flatten();
        if ttl.is_none() && ttl_minutes > 0 {
            tracing::warn!(ttl_minutes, "Session TTL out of range, sessions will not expire");
        }

        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Start a new empty session
    pub async fn create(&self) -> SharedSession {
        let session = ChatSession::new();
        let id = session.id;
        let shared = Arc::new(Mutex::new(session));

        let count = {
            let mut sessions = self.sessions.write().await;
            sessions.insert(id, shared.clone());
            sessions.len()
        };
        metrics::record_active_sessions(count);
        tracing::info!(session_id = %id, "Session created");

        shared
    }

    /// Look up a live session and refresh its activity time
    pub async fn get(&self, id: Uuid) -> Result<SharedSession> {
        self.purge_expired().await;

        let shared = self
            .sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::SessionNotFound { id: id.to_string() })?;

        shared.lock().await.touch();
        Ok(shared)
    }

    /// Drop a session with its files and vectors
    pub async fn remove(&self, id: Uuid) -> Result<()> {
        let (removed, count) = {
            let mut sessions = self.sessions.write().await;
            let removed = sessions.remove(&id);
            (removed, sessions.len())
        };

        match removed {
            Some(_) => {
                metrics::record_active_sessions(count);
                tracing::info!(session_id = %id, "Session removed");
                Ok(())
            }
            None => Err(AppError::SessionNotFound { id: id.to_string() }),
        }
    }

    /// Remove sessions idle past the TTL. Sessions busy with a request are kept.
    pub async fn purge_expired(&self) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };
        let now = Utc::now();

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, shared| match shared.try_lock() {
            Ok(session) => !session.is_expired(Some(ttl), now),
            Err(_) => true,
        });
        let purged = before - sessions.len();

        if purged > 0 {
            metrics::record_active_sessions(sessions.len());
            tracing::info!(purged, remaining = sessions.len(), "Expired sessions purged");
        }
        purged
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
