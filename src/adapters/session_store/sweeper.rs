//! SessionSweeper - background eviction of expired sessions.
//!
//! Lookups already hide expired sessions; the sweeper makes sure sessions
//! nobody touches again are dropped too, so memory stays bounded.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use crate::ports::SessionStore;

/// Default pause between sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(40 * 60);

/// Periodically purges expired sessions from a store.
pub struct SessionSweeper {
    store: Arc<dyn SessionStore>,
    interval: Duration,
}

impl SessionSweeper {
    pub fn new(store: Arc<dyn SessionStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Run the sweep loop until shutdown signal is received.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::debug!("Session sweeper stopping");
                        return;
                    }
                }

                _ = interval.tick() => {
                    self.sweep_once().await;
                }
            }
        }
    }

    /// Run exactly one sweep. Returns how many sessions were evicted.
    pub async fn sweep_once(&self) -> usize {
        match self.store.purge_expired().await {
            Ok(0) => 0,
            Ok(evicted) => {
                tracing::info!(evicted, "Evicted expired sessions");
                evicted
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session sweep failed");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemorySessionStore;
    use crate::domain::foundation::{ChannelId, SessionId, UserId};
    use crate::domain::voting::{SessionDetails, VoteDeck, VotingSession};

    fn session() -> VotingSession {
        VotingSession::new(
            SessionId::new(),
            SessionDetails {
                channel: ChannelId::new("C1").unwrap(),
                message: String::new(),
                owner: "owner".into(),
                owner_id: UserId::new("O").unwrap(),
            },
            vec![(UserId::new("A").unwrap(), "<@A>".to_string())],
            VoteDeck::default(),
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_once_evicts_expired_sessions() {
        let store = Arc::new(InMemorySessionStore::new(Duration::from_secs(10)));
        store.put(session()).await.unwrap();
        store.put(session()).await.unwrap();
        let sweeper = SessionSweeper::new(store.clone(), Duration::from_secs(60));

        assert_eq!(sweeper.sweep_once().await, 0);
        time::advance(Duration::from_secs(10)).await;
        assert_eq!(sweeper.sweep_once().await, 2);
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn run_sweeps_on_interval_and_stops_on_shutdown() {
        let store = Arc::new(InMemorySessionStore::new(Duration::from_secs(10)));
        store.put(session()).await.unwrap();
        let sweeper = SessionSweeper::new(store.clone(), Duration::from_secs(15));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move { sweeper.run(shutdown_rx).await });

        time::sleep(Duration::from_secs(16)).await;
        assert_eq!(store.len().await.unwrap(), 0);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
