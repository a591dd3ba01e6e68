//! Notifier port - delivery of rendered payloads to participants.
//!
//! The chat transport implements this port. Sends are best effort: the
//! caller logs failures and never retries them.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{ChannelId, ResponseHandle, UserId};
use crate::domain::voting::Payload;

/// Errors that can occur while delivering to a participant.
#[derive(Debug, Clone, Error)]
pub enum NotifierError {
    #[error("Recipient {0} cannot be reached")]
    Unreachable(UserId),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Port for showing payloads to individual participants.
///
/// Implementations must be safe to call concurrently from many sessions.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Shows `payload` to `user` in `channel`.
    ///
    /// When `replace` is given, the surface it names is replaced in place.
    /// Returns the handle of the surface now showing the payload.
    async fn send(
        &self,
        channel: &ChannelId,
        user: &UserId,
        payload: &Payload,
        replace: Option<&ResponseHandle>,
    ) -> Result<ResponseHandle, NotifierError>;

    /// Removes the surface named by `handle`.
    async fn dismiss(
        &self,
        channel: &ChannelId,
        user: &UserId,
        handle: &ResponseHandle,
    ) -> Result<(), NotifierError>;
}
