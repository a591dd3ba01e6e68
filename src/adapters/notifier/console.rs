//! Console notifier - writes payloads as JSON lines.
//!
//! Each send or dismissal becomes one line on the wrapped writer (stdout in
//! the binary), tagged with `op`. Lets the engine be driven locally without
//! a chat workspace.

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::foundation::{ChannelId, ResponseHandle, UserId};
use crate::domain::voting::Payload;
use crate::ports::{Notifier, NotifierError};

#[derive(Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum ConsoleLine<'a> {
    Send {
        channel: &'a ChannelId,
        user: &'a UserId,
        replace: Option<&'a ResponseHandle>,
        handle: &'a ResponseHandle,
        payload: &'a Payload,
    },
    Dismiss {
        channel: &'a ChannelId,
        user: &'a UserId,
        handle: &'a ResponseHandle,
    },
}

/// Notifier printing one JSON object per line.
pub struct ConsoleNotifier<W> {
    out: Mutex<W>,
}

impl ConsoleNotifier<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> ConsoleNotifier<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    async fn write_line(&self, line: &ConsoleLine<'_>) -> Result<(), NotifierError> {
        let mut json =
            serde_json::to_vec(line).map_err(|e| NotifierError::Transport(e.to_string()))?;
        json.push(b'\n');

        let mut out = self.out.lock().await;
        out.write_all(&json)
            .await
            .map_err(|e| NotifierError::Transport(e.to_string()))?;
        out.flush()
            .await
            .map_err(|e| NotifierError::Transport(e.to_string()))
    }
}

#[async_trait]
impl<W> Notifier for ConsoleNotifier<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send(
        &self,
        channel: &ChannelId,
        user: &UserId,
        payload: &Payload,
        replace: Option<&ResponseHandle>,
    ) -> Result<ResponseHandle, NotifierError> {
        // Replacing keeps the surface, so its handle stays valid.
        let handle = match replace {
            Some(handle) => handle.clone(),
            None => ResponseHandle::new(format!("console-{}", Uuid::new_v4()))
                .map_err(|e| NotifierError::Transport(e.to_string()))?,
        };

        self.write_line(&ConsoleLine::Send {
            channel,
            user,
            replace,
            handle: &handle,
            payload,
        })
        .await?;
        Ok(handle)
    }

    async fn dismiss(
        &self,
        channel: &ChannelId,
        user: &UserId,
        handle: &ResponseHandle,
    ) -> Result<(), NotifierError> {
        self.write_line(&ConsoleLine::Dismiss {
            channel,
            user,
            handle,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionId;
    use crate::domain::voting::InvitationView;

    fn payload() -> Payload {
        Payload::Invitation(InvitationView {
            session_id: SessionId::new(),
            owner: "alice".into(),
            message: "size PROJ-1".into(),
            actions: Vec::new(),
        })
    }

    fn lines(bytes: Vec<u8>) -> Vec<serde_json::Value> {
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn send_writes_one_json_line_with_fresh_handle() {
        let notifier = ConsoleNotifier::new(Vec::new());
        let channel = ChannelId::new("C1").unwrap();
        let user = UserId::new("U1").unwrap();

        let handle = notifier.send(&channel, &user, &payload(), None).await.unwrap();

        let lines = lines(notifier.into_inner());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["op"], "send");
        assert_eq!(lines[0]["user"], "U1");
        assert_eq!(lines[0]["handle"], handle.as_str());
        assert_eq!(lines[0]["payload"]["kind"], "invitation");
        assert!(handle.as_str().starts_with("console-"));
    }

    #[tokio::test]
    async fn replacing_keeps_the_handle() {
        let notifier = ConsoleNotifier::new(Vec::new());
        let channel = ChannelId::new("C1").unwrap();
        let user = UserId::new("U1").unwrap();
        let existing = ResponseHandle::new("h-1").unwrap();

        let handle = notifier
            .send(&channel, &user, &payload(), Some(&existing))
            .await
            .unwrap();

        assert_eq!(handle, existing);
        let lines = lines(notifier.into_inner());
        assert_eq!(lines[0]["replace"], "h-1");
    }

    #[tokio::test]
    async fn dismiss_writes_dismiss_line() {
        let notifier = ConsoleNotifier::new(Vec::new());
        notifier
            .dismiss(
                &ChannelId::new("C1").unwrap(),
                &UserId::new("U1").unwrap(),
                &ResponseHandle::new("h-9").unwrap(),
            )
            .await
            .unwrap();

        let lines = lines(notifier.into_inner());
        assert_eq!(lines[0]["op"], "dismiss");
        assert_eq!(lines[0]["handle"], "h-9");
    }
}
