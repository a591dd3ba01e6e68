//! In-memory notifier for testing.
//!
//! Captures every send and dismissal for assertions and can be told to fail
//! deliveries to chosen recipients.
//!
//! # Security Note
//!
//! This adapter is for **testing only**. It uses `.expect()` on lock
//! operations which will panic if locks are poisoned.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::domain::foundation::{ChannelId, ResponseHandle, UserId};
use crate::domain::voting::Payload;
use crate::ports::{Notifier, NotifierError};

/// A captured `send` call.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub channel: ChannelId,
    pub user: UserId,
    pub payload: Payload,
    pub replace: Option<ResponseHandle>,
    /// Handle returned to the caller.
    pub handle: ResponseHandle,
}

/// A captured `dismiss` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DismissedMessage {
    pub channel: ChannelId,
    pub user: UserId,
    pub handle: ResponseHandle,
}

/// Notifier that records instead of delivering.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMessage>>,
    dismissed: Mutex<Vec<DismissedMessage>>,
    unreachable: Mutex<HashSet<UserId>>,
    next_handle: AtomicUsize,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every delivery to `user` fail with `Unreachable`.
    pub fn fail_for(&self, user: &UserId) {
        self.unreachable
            .lock()
            .expect("RecordingNotifier: unreachable lock poisoned")
            .insert(user.clone());
    }

    // === Test Helpers ===

    /// Returns all successful sends in call order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent
            .lock()
            .expect("RecordingNotifier: sent lock poisoned")
            .clone()
    }

    /// Returns the successful sends to one user.
    pub fn sent_to(&self, user: &UserId) -> Vec<SentMessage> {
        self.sent()
            .into_iter()
            .filter(|m| &m.user == user)
            .collect()
    }

    /// Returns the last payload delivered to one user.
    pub fn last_payload_for(&self, user: &UserId) -> Option<Payload> {
        self.sent_to(user).pop().map(|m| m.payload)
    }

    /// Returns all dismissals in call order.
    pub fn dismissed(&self) -> Vec<DismissedMessage> {
        self.dismissed
            .lock()
            .expect("RecordingNotifier: dismissed lock poisoned")
            .clone()
    }

    fn check_reachable(&self, user: &UserId) -> Result<(), NotifierError> {
        let unreachable = self
            .unreachable
            .lock()
            .expect("RecordingNotifier: unreachable lock poisoned");
        if unreachable.contains(user) {
            return Err(NotifierError::Unreachable(user.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(
        &self,
        channel: &ChannelId,
        user: &UserId,
        payload: &Payload,
        replace: Option<&ResponseHandle>,
    ) -> Result<ResponseHandle, NotifierError> {
        self.check_reachable(user)?;

        let n = self.next_handle.fetch_add(1, Ordering::SeqCst);
        let handle = ResponseHandle::new(format!("recorded-{}", n))
            .map_err(|e| NotifierError::Transport(e.to_string()))?;

        self.sent
            .lock()
            .expect("RecordingNotifier: sent lock poisoned")
            .push(SentMessage {
                channel: channel.clone(),
                user: user.clone(),
                payload: payload.clone(),
                replace: replace.cloned(),
                handle: handle.clone(),
            });
        Ok(handle)
    }

    async fn dismiss(
        &self,
        channel: &ChannelId,
        user: &UserId,
        handle: &ResponseHandle,
    ) -> Result<(), NotifierError> {
        self.check_reachable(user)?;

        self.dismissed
            .lock()
            .expect("RecordingNotifier: dismissed lock poisoned")
            .push(DismissedMessage {
                channel: channel.clone(),
                user: user.clone(),
                handle: handle.clone(),
            });
        Ok(())
    }
}
