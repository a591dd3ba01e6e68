//! Vote aggregation over the counted voters of a session.
//!
//! Pure functions only: the tally is recomputed from voter state on every
//! render and never stored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::voter::Voter;

/// Result of tallying a set of counted voters.
#[derive(Debug, Clone, PartialEq)]
pub struct Tally {
    votes: Vec<i64>,
    responded: usize,
    eligible: usize,
}

/// Figures shown once voting is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallySummary {
    /// `None` when no vote was numeric.
    pub average: Option<f64>,
    /// Occurrences per distinct numeric vote, ascending by value.
    pub histogram: BTreeMap<i64, usize>,
}

impl Tally {
    /// Tallies the given voters. Callers pass only voters that are counted.
    pub fn compute<'a>(voters: impl IntoIterator<Item = &'a Voter>) -> Self {
        let mut votes = Vec::new();
        let mut responded = 0;
        let mut eligible = 0;

        for voter in voters {
            eligible += 1;
            if let Some(vote) = voter.vote() {
                responded += 1;
                if let Some(n) = vote.as_number() {
                    votes.push(n);
                }
            }
        }

        Self {
            votes,
            responded,
            eligible,
        }
    }

    /// Numeric votes in voter order.
    pub fn votes(&self) -> &[i64] {
        &self.votes
    }

    /// Number of voters with any non-empty vote.
    pub fn responded(&self) -> usize {
        self.responded
    }

    /// Number of voters tallied.
    pub fn eligible(&self) -> usize {
        self.eligible
    }

    /// True once every tallied voter has voted.
    ///
    /// Vacuously true when nobody is tallied.
    pub fn is_closed(&self) -> bool {
        self.responded == self.eligible
    }

    /// Mean of the numeric votes, `None` if there are none.
    pub fn average(&self) -> Option<f64> {
        if self.votes.is_empty() {
            return None;
        }
        let sum: i128 = self.votes.iter().map(|&v| v as i128).sum();
        Some(sum as f64 / self.votes.len() as f64)
    }

    /// Count of occurrences per distinct numeric vote.
    pub fn histogram(&self) -> BTreeMap<i64, usize> {
        let mut histogram = BTreeMap::new();
        for &vote in &self.votes {
            *histogram.entry(vote).or_insert(0) += 1;
        }
        histogram
    }

    /// Summary figures, only available once closed.
    pub fn summary(&self) -> Option<TallySummary> {
        self.is_closed().then(|| TallySummary {
            average: self.average(),
            histogram: self.histogram(),
        })
    }
}
