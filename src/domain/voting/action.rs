//! Participant actions routed back to a session.
//!
//! Every button carries an action id and a composite value
//! `<session id>|<parameter>`; the session id selects the session and the
//! parameter carries the vote for `vote<value>` actions.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::VotingError;

pub const PARTICIPATE: &str = "participate";
pub const SKIP: &str = "skip";
pub const START: &str = "start";
pub const VOTE_PREFIX: &str = "vote";

const VALUE_SEPARATOR: char = '|';

/// A command a participant can issue against a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "vote", rename_all = "snake_case")]
pub enum SessionAction {
    Participate,
    Skip,
    Start,
    Vote(String),
}

impl SessionAction {
    /// Resolves an action id and its parameter. Unknown ids yield `None`.
    pub fn parse(action_id: &str, param: &str) -> Option<Self> {
        match action_id {
            PARTICIPATE => Some(SessionAction::Participate),
            SKIP => Some(SessionAction::Skip),
            START => Some(SessionAction::Start),
            id if id.starts_with(VOTE_PREFIX) => Some(SessionAction::Vote(param.to_string())),
            _ => None,
        }
    }

    /// Action id carried by the button for this action.
    pub fn action_id(&self) -> String {
        match self {
            SessionAction::Participate => PARTICIPATE.to_string(),
            SessionAction::Skip => SKIP.to_string(),
            SessionAction::Start => START.to_string(),
            SessionAction::Vote(value) => format!("{}{}", VOTE_PREFIX, value),
        }
    }

    /// Parameter half of the button value.
    pub fn param(&self) -> &str {
        match self {
            SessionAction::Participate => PARTICIPATE,
            SessionAction::Skip => SKIP,
            SessionAction::Start => START,
            SessionAction::Vote(value) => value,
        }
    }
}

impl fmt::Display for SessionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.action_id())
    }
}

/// Joins a session id and a parameter into a button value.
pub fn encode_value(session_id: impl fmt::Display, param: &str) -> String {
    format!("{}{}{}", session_id, VALUE_SEPARATOR, param)
}

/// Splits a button value on its first separator into `(session, parameter)`.
pub fn split_value(value: &str) -> Result<(&str, &str), VotingError> {
    value
        .split_once(VALUE_SEPARATOR)
        .ok_or_else(|| VotingError::MalformedAction(value.to_string()))
}
