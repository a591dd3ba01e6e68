//! Voting configuration

use serde::Deserialize;

use crate::domain::voting::VoteDeck;

use super::error::ValidationError;

/// Voting configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VotingConfig {
    /// Vote options (comma-separated integers); the Fibonacci deck if unset
    pub deck: Option<String>,
}

impl VotingConfig {
    /// Get the deck offered to voters
    pub fn deck(&self) -> Result<VoteDeck, ValidationError> {
        let Some(raw) = self.deck.as_deref() else {
            return Ok(VoteDeck::default());
        };

        let options = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<i64>()
                    .map_err(|_| ValidationError::InvalidDeck(format!("'{}' is not an integer", s)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        VoteDeck::new(options).map_err(|e| ValidationError::InvalidDeck(e.to_string()))
    }

    /// Validate voting configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.deck().map(|_| ())
    }
}
