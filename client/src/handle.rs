use std::sync::Arc;

use futures_util::SinkExt;
use pokeagent_protocol::{ClientCommand, ClientMessage};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;

use crate::EngineError;
use crate::connection::WsSink;
use crate::state::{EnginePhase, SessionState};

/// Write side of the connection. Every frame goes through the one lock, so
/// concurrent senders never interleave on the wire.
pub(crate) struct Outbound {
    sink: Mutex<Option<WsSink>>,
}

impl Outbound {
    pub fn new() -> Self {
        Self {
            sink: Mutex::new(None),
        }
    }

    pub async fn attach(&self, sink: WsSink) {
        *self.sink.lock().await = Some(sink);
    }

    pub async fn send(&self, message: &ClientMessage) -> Result<(), EngineError> {
        let wire_format = message.to_wire_format();

        let mut sink = self.sink.lock().await;
        let sink = sink.as_mut().ok_or(EngineError::NotConnected)?;
        tracing::debug!(">> {}", wire_format);
        sink.send(Message::Text(wire_format)).await?;
        Ok(())
    }
}

/// Cloneable handle for sending commands through an engine's connection.
///
/// Decision logic running in its own task holds one of these while the
/// engine's receive loop runs.
#[derive(Clone)]
pub struct EngineHandle {
    outbound: Arc<Outbound>,
    state: Arc<SessionState>,
}

impl EngineHandle {
    pub(crate) fn new(outbound: Arc<Outbound>, state: Arc<SessionState>) -> Self {
        Self { outbound, state }
    }

    pub async fn send_message(&self, message: &ClientMessage) -> Result<(), EngineError> {
        self.outbound.send(message).await
    }

    /// Send `ROOM|COMMAND`, or `ROOM|COMMAND|EXTRA` when `extra` is given
    pub async fn send(
        &self,
        room: &str,
        command: &str,
        extra: Option<&str>,
    ) -> Result<(), EngineError> {
        let mut message = ClientMessage::in_room(room, ClientCommand::Raw(command.to_string()));
        message.extra = extra.map(str::to_string);
        self.send_message(&message).await
    }

    /// Challenge `peer` in `format`.
    ///
    /// Returns `Ok(false)` without sending anything while not logged in.
    pub async fn challenge(&self, peer: &str, format: &str) -> Result<bool, EngineError> {
        if peer.trim().is_empty() || format.trim().is_empty() {
            return Err(EngineError::InvalidChallenge {
                peer: peer.to_string(),
                format: format.to_string(),
            });
        }

        if !self.is_logged_in() {
            tracing::debug!(peer, format, "Not logged in, challenge skipped");
            return Ok(false);
        }

        self.send_message(&ClientMessage::global(ClientCommand::Challenge {
            username: peer.to_string(),
            format: format.to_string(),
        }))
        .await?;
        Ok(true)
    }

    /// Send an accept for `user`'s challenge, unconditionally
    pub async fn accept(&self, user: &str) -> Result<(), EngineError> {
        self.send_message(&ClientMessage::global(ClientCommand::Accept(user.to_string())))
            .await
    }

    /// Leave a session's room
    pub async fn leave(&self, room: &str) -> Result<(), EngineError> {
        self.send_message(&ClientMessage::in_room(room, ClientCommand::Leave))
            .await
    }

    /// Answer a battle request, tagging it with the turn it answers
    pub async fn choose(
        &self,
        room: &str,
        choice: &str,
        turn: Option<u32>,
    ) -> Result<(), EngineError> {
        let mut message = ClientMessage::in_room(room, ClientCommand::Choose(choice.to_string()));
        message.extra = turn.map(|turn| turn.to_string());
        self.send_message(&message).await
    }

    pub async fn change_avatar(&self, avatar: &str) -> Result<(), EngineError> {
        self.send_message(&ClientMessage::global(ClientCommand::Avatar(avatar.to_string())))
            .await
    }

    pub async fn search(&self, format: &str) -> Result<(), EngineError> {
        self.send_message(&ClientMessage::global(ClientCommand::Search(format.to_string())))
            .await
    }

    pub async fn cancel_search(&self) -> Result<(), EngineError> {
        self.send_message(&ClientMessage::global(ClientCommand::CancelSearch))
            .await
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.logged_in()
    }

    /// An accept has been sent and its session has not started yet
    pub fn is_waiting_to_start(&self) -> bool {
        self.state.waiting_to_start()
    }

    pub fn phase(&self) -> EnginePhase {
        self.state.phase()
    }
}
