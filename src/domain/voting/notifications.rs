//! Outbound work produced by session commands.
//!
//! Commands run under the session lock and return a `Notifications` plan;
//! the plan is delivered after the lock is released. Plans are stamped with
//! the session revision so a late plan can be recognised as outdated.

use std::collections::HashMap;

use crate::domain::foundation::{ChannelId, ResponseHandle, SessionId, UserId};

use super::view::Payload;

/// One payload for one recipient.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub recipient: UserId,
    /// Surface to replace in place, if the recipient has one.
    pub replace: Option<ResponseHandle>,
    pub payload: Payload,
    /// Whether the handle returned by the notifier becomes the recipient's
    /// new surface.
    pub track_handle: bool,
}

/// Removal of a surface the recipient no longer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dismissal {
    pub recipient: UserId,
    pub handle: ResponseHandle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notifications {
    pub session_id: SessionId,
    pub channel: ChannelId,
    /// Session revision this plan was rendered at.
    pub revision: u64,
    pub dismissals: Vec<Dismissal>,
    pub deliveries: Vec<Delivery>,
}

impl Notifications {
    pub fn new(session_id: SessionId, channel: ChannelId, revision: u64) -> Self {
        Self {
            session_id,
            channel,
            revision,
            dismissals: Vec::new(),
            deliveries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dismissals.is_empty() && self.deliveries.is_empty()
    }

    /// Recipients of deliveries, in delivery order.
    pub fn recipients(&self) -> Vec<&UserId> {
        self.deliveries.iter().map(|d| &d.recipient).collect()
    }
}

/// Newest revision each recipient has been shown, per session.
///
/// Guarded by its own lock next to the session state, so deliveries of one
/// session are ordered without holding the state lock over the network.
#[derive(Debug, Default)]
pub struct DeliveryLedger {
    shown: HashMap<UserId, u64>,
}

impl DeliveryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `recipient` already saw a newer revision than `revision`.
    pub fn is_outdated(&self, recipient: &UserId, revision: u64) -> bool {
        self.shown
            .get(recipient)
            .is_some_and(|&shown| shown > revision)
    }

    /// Records a successful delivery; older revisions never overwrite newer.
    pub fn record(&mut self, recipient: &UserId, revision: u64) {
        let shown = self.shown.entry(recipient.clone()).or_insert(revision);
        if *shown < revision {
            *shown = revision;
        }
    }

    pub fn shown(&self, recipient: &UserId) -> Option<u64> {
        self.shown.get(recipient).copied()
    }
}
