//! HandleActionHandler - routes participant button presses to sessions.

use std::sync::Arc;

use crate::domain::foundation::{ChannelId, ResponseHandle, SessionId, UserId};
use crate::domain::voting::{split_value, SessionAction, VotingError};
use crate::ports::SessionStore;

use super::dispatcher::{DeliveryReport, NotificationDispatcher};

/// A button press as reported by the transport.
#[derive(Debug, Clone)]
pub struct InboundAction {
    /// `participate`, `skip`, `start` or `vote<value>`.
    pub action_id: String,
    pub user_id: UserId,
    pub channel_id: ChannelId,
    /// Surface the button was pressed on.
    pub response_handle: ResponseHandle,
    /// `<session id>|<parameter>`
    pub value: String,
}

/// What happened to an inbound action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Applied {
        session_id: SessionId,
        action: SessionAction,
        delivery: DeliveryReport,
    },
    /// No live session with that id; the action was dropped.
    SessionNotFound,
    /// Unrecognized action id; the action was dropped.
    Ignored,
}

/// Handler for participant actions.
pub struct HandleActionHandler {
    store: Arc<dyn SessionStore>,
    dispatcher: NotificationDispatcher,
}

impl HandleActionHandler {
    pub fn new(store: Arc<dyn SessionStore>, dispatcher: NotificationDispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// Applies the action to its session and delivers the resulting renders.
    ///
    /// # Errors
    ///
    /// - `MalformedAction` if the value has no `|` separator
    /// - `Store` if the session store fails
    pub async fn handle(&self, action: InboundAction) -> Result<ActionOutcome, VotingError> {
        let (raw_session_id, param) = split_value(&action.value)?;

        let Ok(session_id) = raw_session_id.parse::<SessionId>() else {
            tracing::debug!(value = %action.value, "Action references an unparseable session id");
            return Ok(ActionOutcome::SessionNotFound);
        };
        let Some(shared) = self.store.get(&session_id).await? else {
            tracing::info!(
                session_id = %session_id,
                user_id = %action.user_id,
                action = %action.action_id,
                "Dropping action for unknown or expired session"
            );
            return Ok(ActionOutcome::SessionNotFound);
        };
        let Some(kind) = SessionAction::parse(&action.action_id, param) else {
            tracing::debug!(
                session_id = %session_id,
                action = %action.action_id,
                "Ignoring unrecognized action"
            );
            return Ok(ActionOutcome::Ignored);
        };

        tracing::info!(
            session_id = %session_id,
            user_id = %action.user_id,
            channel_id = %action.channel_id,
            action = %kind,
            "Applying participant action"
        );

        // The lock covers the state change only; delivery happens after.
        let notifications = {
            let mut session = shared.lock().await;
            let notifications = session.apply(&kind, &action.user_id, action.response_handle);
            if session.is_started() && session.tally().is_closed() {
                tracing::debug!(
                    session_id = %session_id,
                    age_secs = session.created_at().elapsed().num_seconds(),
                    "Votes revealed"
                );
            }
            notifications
        };
        let delivery = self.dispatcher.deliver(&shared, notifications).await;

        Ok(ActionOutcome::Applied {
            session_id,
            action: kind,
            delivery,
        })
    }
}
