//! Wall-clock timestamps for session bookkeeping.
//!
//! Expiry deadlines use the monotonic `tokio::time::Instant` instead; this
//! type only records when something happened.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Wall-clock time since this timestamp; zero if it lies in the future.
    pub fn elapsed(&self) -> Duration {
        (Utc::now() - self.0).max(Duration::zero())
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_lies_between_surrounding_reads() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn elapsed_never_goes_negative() {
        let future: Timestamp =
            serde_json::from_str("\"2999-01-01T00:00:00Z\"").unwrap();
        assert_eq!(future.elapsed(), Duration::zero());
        assert!(Timestamp::now().elapsed() >= Duration::zero());
    }

    #[test]
    fn serializes_as_rfc3339() {
        let ts: Timestamp = serde_json::from_str("\"2024-01-15T10:30:00Z\"").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert!(json.contains("2024-01-15T10:30:00"));
    }
}
