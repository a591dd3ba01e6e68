//! Console event source - drives the engine from JSON lines.
//!
//! Each input line is one inbound event, tagged with `type`:
//!
//! ```json
//! {"type":"command","invoker_id":"U1","invoker_name":"ana","channel_id":"C1","text":"size it <@U2|bo>"}
//! {"type":"action","action_id":"vote5","user_id":"U2","channel_id":"C1","response_handle":"h1","value":"<session id>|5"}
//! ```
//!
//! Every event runs on its own task, so a slow or failing event never holds
//! up the next line.

use std::sync::Arc;

use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::application::{
    ActionOutcome, CreateSessionCommand, CreateSessionHandler, HandleActionHandler, InboundAction,
};
use crate::domain::foundation::{ChannelId, ResponseHandle, UserId};

/// One inbound event as read from the console.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConsoleEvent {
    /// The voting command was invoked.
    Command {
        invoker_id: UserId,
        invoker_name: String,
        channel_id: ChannelId,
        text: String,
    },
    /// A participant pressed a button.
    Action {
        action_id: String,
        user_id: UserId,
        channel_id: ChannelId,
        response_handle: ResponseHandle,
        value: String,
    },
}

impl ConsoleEvent {
    /// Parses a single input line.
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Reads events and hands each one to the matching handler.
#[derive(Clone)]
pub struct ConsoleEventSource {
    create: Arc<CreateSessionHandler>,
    actions: Arc<HandleActionHandler>,
}

impl ConsoleEventSource {
    pub fn new(create: Arc<CreateSessionHandler>, actions: Arc<HandleActionHandler>) -> Self {
        Self { create, actions }
    }

    /// Consumes `input` until EOF, until `shutdown` flips to true, or until
    /// its sender is gone; then waits for in-flight events to finish.
    pub async fn run<R>(&self, input: R, mut shutdown: watch::Receiver<bool>) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut in_flight = JoinSet::new();

        tracing::info!("Console event source started");

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    match line? {
                        Some(line) if line.trim().is_empty() => continue,
                        Some(line) => {
                            let source = self.clone();
                            in_flight.spawn(async move { source.dispatch(&line).await });
                        }
                        None => {
                            tracing::info!("Console input closed");
                            break;
                        }
                    }
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!(error = %e, "Event task panicked");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Console event source shutting down");
                        break;
                    }
                }
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Event task panicked");
            }
        }
        Ok(())
    }

    /// Parses and handles one line. Failures are logged, never propagated.
    pub async fn dispatch(&self, line: &str) {
        let event = match ConsoleEvent::parse(line) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable console event");
                return;
            }
        };

        match event {
            ConsoleEvent::Command {
                invoker_id,
                invoker_name,
                channel_id,
                text,
            } => {
                let cmd = CreateSessionCommand {
                    invoker_id,
                    invoker_name,
                    channel_id,
                    text,
                };
                match self.create.handle(cmd).await {
                    Ok(Some(result)) => tracing::debug!(
                        session_id = %result.session_id,
                        participants = result.participants,
                        failed = result.delivery.failed,
                        "Command handled"
                    ),
                    Ok(None) => {}
                    Err(e) => tracing::error!(error = %e, code = %e.code(), "Command failed"),
                }
            }
            ConsoleEvent::Action {
                action_id,
                user_id,
                channel_id,
                response_handle,
                value,
            } => {
                let action = InboundAction {
                    action_id,
                    user_id,
                    channel_id,
                    response_handle,
                    value,
                };
                match self.actions.handle(action).await {
                    Ok(ActionOutcome::Applied { delivery, .. }) => {
                        tracing::debug!(failed = delivery.failed, "Action handled")
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, code = %e.code(), "Action rejected"),
                }
            }
        }
    }
}
