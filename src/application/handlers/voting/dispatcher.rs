//! NotificationDispatcher - delivers session notifications.
//!
//! Runs after the session lock is released. Deliveries are best effort:
//! failures are logged and counted, never retried, and the state change
//! that produced them stands.
//!
//! Plans of one session go out one at a time under the session's delivery
//! lock. A plan that reaches the lock after a newer one has already been
//! shown to a recipient is not sent to that recipient.

use futures::future::join_all;
use std::sync::Arc;

use crate::domain::voting::{Delivery, Notifications};
use crate::ports::{Notifier, SharedSession};

/// Outcome counts of one delivery run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub dismissed: usize,
    pub failed: usize,
    /// Deliveries dropped because the recipient already saw a newer render.
    pub outdated: usize,
}

/// Sends notification plans through the notifier.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Delivers `notifications`, then records returned handles on `session`.
    ///
    /// Must not be called while holding the session state lock.
    pub async fn deliver(
        &self,
        session: &SharedSession,
        notifications: Notifications,
    ) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let Notifications {
            session_id,
            channel,
            revision,
            dismissals,
            deliveries,
        } = notifications;

        let mut ledger = session.lock_deliveries().await;

        for dismissal in &dismissals {
            match self
                .notifier
                .dismiss(&channel, &dismissal.recipient, &dismissal.handle)
                .await
            {
                Ok(()) => report.dismissed += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        session_id = %session_id,
                        user_id = %dismissal.recipient,
                        error = %e,
                        "Failed to dismiss message"
                    );
                }
            }
        }

        let (current, outdated): (Vec<&Delivery>, Vec<&Delivery>) = deliveries
            .iter()
            .partition(|delivery| !ledger.is_outdated(&delivery.recipient, revision));
        for delivery in &outdated {
            report.outdated += 1;
            tracing::debug!(
                session_id = %session_id,
                user_id = %delivery.recipient,
                revision,
                "Skipping render older than the one already shown"
            );
        }

        let results = join_all(current.iter().map(|delivery| {
            self.notifier.send(
                &channel,
                &delivery.recipient,
                &delivery.payload,
                delivery.replace.as_ref(),
            )
        }))
        .await;

        let mut handles = Vec::new();
        for (delivery, result) in current.into_iter().zip(results) {
            match result {
                Ok(handle) => {
                    report.delivered += 1;
                    ledger.record(&delivery.recipient, revision);
                    if delivery.track_handle {
                        handles.push((delivery, handle));
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        session_id = %session_id,
                        user_id = %delivery.recipient,
                        error = %e,
                        "Failed to deliver message"
                    );
                }
            }
        }

        if !handles.is_empty() {
            let mut state = session.lock().await;
            for (Delivery { recipient, replace, .. }, handle) in handles {
                state.record_response_handle(recipient, replace.as_ref(), handle);
            }
        }
        drop(ledger);

        tracing::debug!(
            session_id = %session_id,
            revision,
            delivered = report.delivered,
            dismissed = report.dismissed,
            failed = report.failed,
            outdated = report.outdated,
            "Notifications delivered"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::RecordingNotifier;
    use crate::domain::foundation::{ChannelId, ResponseHandle, SessionId, UserId};
    use crate::domain::voting::{Payload, SessionDetails, VoteDeck, VotingSession};
    use crate::ports::SessionCell;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    fn shared_session() -> SharedSession {
        let session = VotingSession::new(
            SessionId::new(),
            SessionDetails {
                channel: ChannelId::new("C1").unwrap(),
                message: "size it".into(),
                owner: "a".into(),
                owner_id: uid("A"),
            },
            vec![(uid("A"), "<@A>".into()), (uid("B"), "<@B>".into())],
            VoteDeck::default(),
        )
        .unwrap();
        Arc::new(SessionCell::new(session))
    }

    #[tokio::test]
    async fn delivers_and_records_returned_handles() {
        let notifier = Arc::new(RecordingNotifier::new());
        let dispatcher = NotificationDispatcher::new(notifier.clone());
        let session = shared_session();

        let plan = session
            .lock()
            .await
            .opt_in(&uid("A"), ResponseHandle::new("invite-a").unwrap());
        let report = dispatcher.deliver(&session, plan).await;

        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed, 0);
        let sent_to_a = notifier.sent_to(&uid("A"));
        assert_eq!(sent_to_a[0].replace, Some(ResponseHandle::new("invite-a").unwrap()));

        let guard = session.lock().await;
        assert_eq!(
            guard.voter(&uid("A")).unwrap().response_handle(),
            Some(&sent_to_a[0].handle)
        );
    }

    #[tokio::test]
    async fn invitation_handles_are_not_recorded() {
        let notifier = Arc::new(RecordingNotifier::new());
        let dispatcher = NotificationDispatcher::new(notifier.clone());
        let session = shared_session();

        let plan = session.lock().await.invite();
        dispatcher.deliver(&session, plan).await;

        assert_eq!(notifier.sent().len(), 2);
        let guard = session.lock().await;
        assert!(guard.voters().iter().all(|v| v.response_handle().is_none()));
    }

    #[tokio::test]
    async fn failures_are_counted_not_propagated() {
        let notifier = Arc::new(RecordingNotifier::new());
        notifier.fail_for(&uid("B"));
        let dispatcher = NotificationDispatcher::new(notifier.clone());
        let session = shared_session();

        let plan = session
            .lock()
            .await
            .opt_in(&uid("B"), ResponseHandle::new("invite-b").unwrap());
        let report = dispatcher.deliver(&session, plan).await;

        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 1);
        // The opt-in stands even though B never saw the update.
        let guard = session.lock().await;
        assert_eq!(
            guard.voter(&uid("B")).unwrap().response_handle(),
            Some(&ResponseHandle::new("invite-b").unwrap())
        );
    }

    #[tokio::test]
    async fn dismissals_go_out() {
        let notifier = Arc::new(RecordingNotifier::new());
        let dispatcher = NotificationDispatcher::new(notifier.clone());
        let session = shared_session();

        let plan = session
            .lock()
            .await
            .skip(&uid("B"), ResponseHandle::new("invite-b").unwrap());
        let report = dispatcher.deliver(&session, plan).await;

        assert_eq!(report.dismissed, 1);
        assert_eq!(report.delivered, 0);
        assert_eq!(notifier.dismissed()[0].handle.as_str(), "invite-b");
    }

    #[tokio::test]
    async fn older_plan_arriving_late_is_not_shown() {
        let notifier = Arc::new(RecordingNotifier::new());
        let dispatcher = NotificationDispatcher::new(notifier.clone());
        let session = shared_session();

        let (older, newer) = {
            let mut state = session.lock().await;
            state.opt_in(&uid("A"), ResponseHandle::new("invite-a").unwrap());
            state.opt_in(&uid("B"), ResponseHandle::new("invite-b").unwrap());
            state.start();
            let older = state.cast_vote(&uid("A"), "3");
            let newer = state.cast_vote(&uid("B"), "5");
            (older, newer)
        };

        let first = dispatcher.deliver(&session, newer).await;
        let late = dispatcher.deliver(&session, older).await;

        assert_eq!(first.delivered, 2);
        assert_eq!(late.delivered, 0);
        assert_eq!(late.outdated, 2);
        for user in ["A", "B"] {
            match notifier.last_payload_for(&uid(user)) {
                Some(Payload::Status(view)) => assert!(view.summary.is_some()),
                other => panic!("expected status for {}, got {:?}", user, other),
            }
        }
    }
}
