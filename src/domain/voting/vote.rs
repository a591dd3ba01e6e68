//! Vote values and the deck of options offered to voters.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// A vote as cast by a participant.
///
/// Votes arrive as free text. Integers become `Numeric` and take part in the
/// average and histogram; anything else is kept as `Raw`, which still counts
/// as "responded" when deciding whether voting is closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Vote {
    Numeric(i64),
    Raw(String),
}

impl Vote {
    /// Decodes a raw vote string. An empty string means "no vote".
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        Some(match raw.parse::<i64>() {
            Ok(n) => Vote::Numeric(n),
            Err(_) => Vote::Raw(raw.to_string()),
        })
    }

    /// Returns the numeric value, if this vote has one.
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Vote::Numeric(n) => Some(*n),
            Vote::Raw(_) => None,
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vote::Numeric(n) => write!(f, "{}", n),
            Vote::Raw(s) => write!(f, "{}", s),
        }
    }
}

/// Ordered set of numeric options rendered as vote buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<i64>")]
pub struct VoteDeck(Vec<i64>);

impl VoteDeck {
    /// Creates a deck, returning error if no options are given.
    ///
    /// Duplicate options are dropped, keeping the first occurrence.
    pub fn new(options: impl IntoIterator<Item = i64>) -> Result<Self, ValidationError> {
        let mut deck: Vec<i64> = Vec::new();
        for option in options {
            if !deck.contains(&option) {
                deck.push(option);
            }
        }
        if deck.is_empty() {
            return Err(ValidationError::empty_field("deck"));
        }
        Ok(Self(deck))
    }

    /// The modified Fibonacci deck: 1, 2, 3, 5, 8, 13, 21, 100.
    pub fn fibonacci() -> Self {
        Self(vec![1, 2, 3, 5, 8, 13, 21, 100])
    }

    /// Returns the options in display order.
    pub fn options(&self) -> &[i64] {
        &self.0
    }
}

impl Default for VoteDeck {
    fn default() -> Self {
        Self::fibonacci()
    }
}

impl TryFrom<Vec<i64>> for VoteDeck {
    type Error = ValidationError;

    fn try_from(options: Vec<i64>) -> Result<Self, Self::Error> {
        Self::new(options)
    }
}

impl From<VoteDeck> for Vec<i64> {
    fn from(deck: VoteDeck) -> Self {
        deck.0
    }
}
