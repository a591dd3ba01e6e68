//! Voter entity and its participation sub-state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{ResponseHandle, StateMachine, UserId};

use super::vote::Vote;

/// Whether an invited participant takes part in the vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParticipationState {
    /// Invited, has not answered yet.
    #[default]
    Unknown,
    Participating,
    /// Opted out, or never answered before the session started.
    Skipped,
}

impl ParticipationState {
    /// Returns true if the voter still counts toward the tally.
    pub fn is_counted(&self) -> bool {
        !matches!(self, ParticipationState::Skipped)
    }
}

impl StateMachine for ParticipationState {
    fn successors(&self) -> &'static [Self] {
        use ParticipationState::*;
        match self {
            // Re-opting in only refreshes the response handle.
            Unknown | Participating => &[Participating, Skipped],
            Skipped => &[],
        }
    }
}

impl fmt::Display for ParticipationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParticipationState::Unknown => "Unknown",
            ParticipationState::Participating => "Participating",
            ParticipationState::Skipped => "Skipped",
        };
        write!(f, "{}", s)
    }
}

/// One invited participant within a session.
///
/// # Invariants
///
/// - `mention` never changes after invitation
/// - `state` only moves along [`ParticipationState`] edges; `Skipped` is final
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    user_id: UserId,
    mention: String,
    state: ParticipationState,
    vote: Option<Vote>,
    response_handle: Option<ResponseHandle>,
}

impl Voter {
    /// Creates a freshly invited voter.
    pub fn invited(user_id: UserId, mention: impl Into<String>) -> Self {
        Self {
            user_id,
            mention: mention.into(),
            state: ParticipationState::Unknown,
            vote: None,
            response_handle: None,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Display handle as written in the invitation command.
    pub fn mention(&self) -> &str {
        &self.mention
    }

    pub fn state(&self) -> ParticipationState {
        self.state
    }

    pub fn vote(&self) -> Option<&Vote> {
        self.vote.as_ref()
    }

    pub fn has_voted(&self) -> bool {
        self.vote.is_some()
    }

    /// Handle of the last surface shown to this voter.
    pub fn response_handle(&self) -> Option<&ResponseHandle> {
        self.response_handle.as_ref()
    }

    /// Moves to `Participating` and remembers the surface to replace.
    ///
    /// Returns false (and changes nothing) if the voter already skipped.
    pub(crate) fn opt_in(&mut self, handle: ResponseHandle) -> bool {
        match self.state.transition_to(ParticipationState::Participating) {
            Ok(next) => {
                self.state = next;
                self.response_handle = Some(handle);
                true
            }
            Err(_) => false,
        }
    }

    /// Moves to `Skipped`. Already skipped voters stay skipped.
    pub(crate) fn skip(&mut self) {
        if let Ok(next) = self.state.transition_to(ParticipationState::Skipped) {
            self.state = next;
        }
    }

    /// Forces a voter who never answered out of the vote.
    ///
    /// Returns true if the voter was `Unknown`.
    pub(crate) fn skip_if_unanswered(&mut self) -> bool {
        if self.state == ParticipationState::Unknown {
            self.state = ParticipationState::Skipped;
            true
        } else {
            false
        }
    }

    /// Stores the raw vote; an empty value clears it.
    pub(crate) fn cast(&mut self, raw: &str) {
        self.vote = Vote::parse(raw);
    }

    /// Replaces the stored handle only if it is still `expected`.
    ///
    /// Returns true if the handle was updated.
    pub(crate) fn refresh_handle(
        &mut self,
        expected: Option<&ResponseHandle>,
        handle: ResponseHandle,
    ) -> bool {
        if self.response_handle.as_ref() != expected || !self.state.is_counted() {
            return false;
        }
        self.response_handle = Some(handle);
        true
    }
}
