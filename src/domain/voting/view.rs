//! Render payloads handed to the notifier.
//!
//! These are structured views of a session; turning them into chat blocks or
//! text belongs to the transport.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SessionId, UserId};

use super::action::{encode_value, SessionAction};
use super::tally::TallySummary;

/// A clickable control routed back to the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionButton {
    pub action_id: String,
    /// `<session id>|<parameter>`
    pub value: String,
    pub label: String,
}

impl ActionButton {
    pub fn new(session_id: SessionId, action: &SessionAction, label: impl Into<String>) -> Self {
        Self {
            action_id: action.action_id(),
            value: encode_value(session_id, action.param()),
            label: label.into(),
        }
    }
}

/// How a voter appears in the status list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VoterStatus {
    /// Has not answered the invitation.
    Pending,
    /// Participating, no vote yet.
    Ready,
    /// Vote cast, hidden until everyone voted.
    Voted,
    /// Everyone voted; the vote is shown.
    Revealed { vote: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterLine {
    pub user_id: UserId,
    pub mention: String,
    #[serde(flatten)]
    pub status: VoterStatus,
}

/// First message a participant receives: join or skip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationView {
    pub session_id: SessionId,
    pub owner: String,
    pub message: String,
    pub actions: Vec<ActionButton>,
}

/// Live status of a session as seen by one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub owner: String,
    pub message: String,
    pub started: bool,
    pub voters: Vec<VoterLine>,
    /// Present once started and every counted voter has voted.
    pub summary: Option<TallySummary>,
    /// Deck buttons while started and still open.
    pub vote_actions: Vec<ActionButton>,
    /// Start button, owner only, before the session starts.
    pub control: Option<ActionButton>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    Invitation(InvitationView),
    Status(SessionView),
}
