//! Session store port - registry of live voting sessions.
//!
//! Sessions live in the store only; they are never persisted. Each entry
//! expires a fixed time after it was stored.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use crate::domain::foundation::{DomainError, SessionId};
use crate::domain::voting::{DeliveryLedger, VotingSession};

/// A live session and the ordering state of its outbound deliveries.
///
/// Two locks, always taken in this order when both are needed:
/// `deliveries` first, then `state`. Commands take only `state`, so they
/// never wait on a delivery in flight.
#[derive(Debug)]
pub struct SessionCell {
    state: Mutex<VotingSession>,
    deliveries: Mutex<DeliveryLedger>,
}

impl SessionCell {
    pub fn new(session: VotingSession) -> Self {
        Self {
            state: Mutex::new(session),
            deliveries: Mutex::new(DeliveryLedger::new()),
        }
    }

    /// Exclusive access to the session state.
    pub async fn lock(&self) -> MutexGuard<'_, VotingSession> {
        self.state.lock().await
    }

    /// Exclusive access to delivery ordering; held for a whole plan.
    pub async fn lock_deliveries(&self) -> MutexGuard<'_, DeliveryLedger> {
        self.deliveries.lock().await
    }
}

/// A session shared between concurrent action handlers.
///
/// Commands against one session are serialized without blocking other
/// sessions.
pub type SharedSession = Arc<SessionCell>;

/// Port for storing live sessions by id.
///
/// # Guarantees
///
/// - at most one live session object per id
/// - lookups after expiry report `None`, never a stale session
/// - `get` hands out the stored session itself, not a copy
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores the session under its own id, replacing any previous entry.
    async fn put(&self, session: VotingSession) -> Result<SharedSession, DomainError>;

    /// Looks up a live session.
    async fn get(&self, id: &SessionId) -> Result<Option<SharedSession>, DomainError>;

    /// Evicts a session ahead of its expiry. Returns true if it was present.
    async fn remove(&self, id: &SessionId) -> Result<bool, DomainError>;

    /// Number of entries currently held, expired ones not yet purged included.
    async fn len(&self) -> Result<usize, DomainError>;

    /// Drops all expired entries. Returns how many were dropped.
    async fn purge_expired(&self) -> Result<usize, DomainError>;
}
