//! In-memory session store with per-entry expiry.
//!
//! Entries expire a fixed TTL after they were stored; reads do not extend
//! them. Expired entries are invisible to `get` immediately and are removed
//! either lazily on lookup or by the [`SessionSweeper`](super::SessionSweeper).

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::domain::foundation::{DomainError, SessionId};
use crate::domain::voting::VotingSession;
use crate::ports::{SessionCell, SessionStore, SharedSession};

/// Default time a session stays retrievable after it was stored.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Single-process session store.
///
/// The map lock is only held for lookups and inserts; commands against a
/// session take that session's own mutex.
#[derive(Debug)]
pub struct InMemorySessionStore {
    entries: RwLock<HashMap<SessionId, StoredSession>>,
    ttl: Duration,
}

#[derive(Debug)]
struct StoredSession {
    session: SharedSession,
    expires_at: Instant,
}

impl StoredSession {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

impl InMemorySessionStore {
    /// Create a store whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Create a store with the default 30 minute TTL.
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn put(&self, session: VotingSession) -> Result<SharedSession, DomainError> {
        let id = session.id();
        let shared = Arc::new(SessionCell::new(session));
        let entry = StoredSession {
            session: Arc::clone(&shared),
            expires_at: Instant::now() + self.ttl,
        };

        let mut entries = self.entries.write().await;
        if entries.insert(id, entry).is_some() {
            tracing::warn!(session_id = %id, "Replaced existing session with the same id");
        }
        tracing::debug!(session_id = %id, active = entries.len(), "Session stored");
        Ok(shared)
    }

    async fn get(&self, id: &SessionId) -> Result<Option<SharedSession>, DomainError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(id) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => {
                    return Ok(Some(Arc::clone(&entry.session)))
                }
                Some(_) => {}
            }
        }

        // Expired: drop it now instead of waiting for the sweeper.
        let mut entries = self.entries.write().await;
        if entries.get(id).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(id);
            tracing::debug!(session_id = %id, "Expired session evicted on lookup");
        }
        Ok(None)
    }

    async fn remove(&self, id: &SessionId) -> Result<bool, DomainError> {
        let mut entries = self.entries.write().await;
        let removed = entries.remove(id).is_some();
        tracing::info!(session_id = %id, removed, active = entries.len(), "Session removed");
        Ok(removed)
    }

    async fn len(&self) -> Result<usize, DomainError> {
        Ok(self.entries.read().await.len())
    }

    async fn purge_expired(&self) -> Result<usize, DomainError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        Ok(before - entries.len())
    }
}
