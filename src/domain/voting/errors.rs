//! Voting-specific error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Errors raised while creating sessions or routing participant actions.
///
/// Unknown sessions and unknown voters are not errors: those actions are
/// dropped or become no-ops.
#[derive(Debug, Clone, Error)]
pub enum VotingError {
    #[error("Invitation names no participants")]
    NoParticipants,

    #[error("Malformed action value '{0}': expected '<session>|<value>'")]
    MalformedAction(String),

    #[error("Session store error: {0}")]
    Store(#[from] DomainError),
}

impl VotingError {
    pub fn code(&self) -> ErrorCode {
        match self {
            VotingError::NoParticipants | VotingError::MalformedAction(_) => {
                ErrorCode::ValidationFailed
            }
            VotingError::Store(err) => err.code,
        }
    }
}
