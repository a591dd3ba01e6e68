//! CreateSessionHandler - Command handler for starting a voting session.

use std::sync::Arc;

use crate::domain::foundation::{ChannelId, SessionId, UserId};
use crate::domain::voting::{Invitation, SessionDetails, VoteDeck, VotingError, VotingSession};
use crate::ports::SessionStore;

use super::dispatcher::{DeliveryReport, NotificationDispatcher};

/// Command issued when someone invokes the voting command.
#[derive(Debug, Clone)]
pub struct CreateSessionCommand {
    pub invoker_id: UserId,
    pub invoker_name: String,
    pub channel_id: ChannelId,
    /// Raw command text: message followed by participant mentions.
    pub text: String,
}

/// Result of successful session creation.
#[derive(Debug, Clone)]
pub struct CreateSessionResult {
    pub session_id: SessionId,
    pub participants: usize,
    pub delivery: DeliveryReport,
}

/// Handler for creating sessions.
pub struct CreateSessionHandler {
    store: Arc<dyn SessionStore>,
    dispatcher: NotificationDispatcher,
    deck: VoteDeck,
}

impl CreateSessionHandler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        dispatcher: NotificationDispatcher,
        deck: VoteDeck,
    ) -> Self {
        Self {
            store,
            dispatcher,
            deck,
        }
    }

    /// Creates, stores and announces a session.
    ///
    /// Returns `Ok(None)` when the text mentions nobody; no session is
    /// created and nothing is sent.
    pub async fn handle(
        &self,
        cmd: CreateSessionCommand,
    ) -> Result<Option<CreateSessionResult>, VotingError> {
        // 1. Parse the invitation
        let Some(invitation) = Invitation::parse(&cmd.text) else {
            tracing::info!(
                user_id = %cmd.invoker_id,
                channel_id = %cmd.channel_id,
                "Ignoring voting command without participants"
            );
            return Ok(None);
        };

        // 2. Build the session aggregate
        let participants = invitation.participants.len();
        let mut session = VotingSession::new(
            SessionId::new(),
            SessionDetails {
                channel: cmd.channel_id,
                message: invitation.message,
                owner: cmd.invoker_name,
                owner_id: cmd.invoker_id,
            },
            invitation.participants,
            self.deck.clone(),
        )?;
        let session_id = session.id();
        let invitations = session.invite();

        tracing::info!(
            session_id = %session_id,
            channel_id = %session.channel(),
            owner_id = %session.owner_id(),
            participants,
            "Voting session created"
        );
        if tracing::enabled!(tracing::Level::DEBUG) {
            if let Ok(snapshot) = serde_json::to_string(&session) {
                tracing::debug!(session_id = %session_id, %snapshot, "Session snapshot");
            }
        }

        // 3. Register, then invite
        let shared = self.store.put(session).await?;
        let delivery = self.dispatcher.deliver(&shared, invitations).await;

        Ok(Some(CreateSessionResult {
            session_id,
            participants,
            delivery,
        }))
    }
}
