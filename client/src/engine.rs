use std::collections::HashSet;
use std::sync::Arc;

use pokeagent_protocol::{
    ChallengeState, ClientCommand, ClientMessage, ServerFrame, ServerMessage, parse_server_frame,
    to_user_id,
};

use crate::auth::{Authenticator, HttpAuthenticator, LoginRequest};
use crate::connection::{self, Inbound};
use crate::handle::{EngineHandle, Outbound};
use crate::handler::SessionController;
use crate::state::{EnginePhase, SessionState};
use crate::{EngineConfig, EngineError};

/// Owns one server connection: runs the receive loop, logs in when the
/// server offers a challenge string, accepts matching challenges and hands
/// battle traffic to a [`SessionController`].
pub struct ProtocolEngine<A = HttpAuthenticator> {
    config: EngineConfig,
    authenticator: A,
    state: Arc<SessionState>,
    outbound: Arc<Outbound>,
    inbound: Option<Inbound>,
    /// Battle rooms we have already seen a frame for
    sessions: HashSet<String>,
}

impl ProtocolEngine<HttpAuthenticator> {
    /// Build an engine that logs in through the configured HTTP endpoint
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let authenticator = HttpAuthenticator::new(config.authentication_address()?);
        Self::with_authenticator(config, authenticator)
    }
}

impl<A: Authenticator> ProtocolEngine<A> {
    pub fn with_authenticator(
        config: EngineConfig,
        authenticator: A,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        Ok(Self {
            config,
            authenticator,
            state: Arc::new(SessionState::new()),
            outbound: Arc::new(Outbound::new()),
            inbound: None,
            sessions: HashSet::new(),
        })
    }

    /// Open the websocket connection
    pub async fn connect(&mut self) -> Result<(), EngineError> {
        let url = self.config.websocket_url();
        let (sink, inbound) = connection::connect(&url).await?;

        self.outbound.attach(sink).await;
        self.inbound = Some(inbound);
        self.state.set_phase(EnginePhase::Connected);
        tracing::info!(url = %url, username = %self.config.username, "Connected");
        Ok(())
    }

    /// Get a cloneable handle for sending commands
    pub fn handle(&self) -> EngineHandle {
        EngineHandle::new(self.outbound.clone(), self.state.clone())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn phase(&self) -> EnginePhase {
        self.state.phase()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.logged_in()
    }

    pub fn is_waiting_to_start(&self) -> bool {
        self.state.waiting_to_start()
    }

    /// Run the receive loop until the controller asks to stop or the
    /// connection ends.
    ///
    /// A closed connection is reported as [`EngineError::ConnectionClosed`];
    /// reconnecting is left to the caller.
    pub async fn run<C: SessionController>(
        &mut self,
        controller: &mut C,
    ) -> Result<(), EngineError> {
        let mut inbound = self.inbound.take().ok_or(EngineError::NotConnected)?;

        let result = loop {
            if controller.should_terminate() {
                break Ok(());
            }

            let text = match inbound.next_text().await {
                Ok(Some(text)) => text,
                Ok(None) => break Err(EngineError::ConnectionClosed),
                Err(e) => break Err(e),
            };

            if let Err(e) = self.manage_message(controller, &text).await {
                break Err(e);
            }
        };

        self.state.set_phase(EnginePhase::Terminated);
        if let Err(e) = &result {
            tracing::error!(error = %e, username = %self.config.username, "Receive loop stopped");
        }
        result
    }

    /// Handle one inbound frame. Only handshake and send failures are
    /// returned; anything unrecognized is logged and skipped line by line.
    async fn manage_message<C: SessionController>(
        &mut self,
        controller: &mut C,
        text: &str,
    ) -> Result<(), EngineError> {
        tracing::debug!(username = %self.config.username, "<< {}", text);

        let frame = match parse_server_frame(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, frame = text, "Skipping undecodable frame");
                return Ok(());
            }
        };

        if frame.is_battle() {
            self.manage_battle_frame(controller, &frame).await;
            return Ok(());
        }

        let room = frame.room_id.as_deref();
        for (line, message) in frame.messages() {
            match message {
                Ok(message) => self.manage_server_message(controller, room, message).await?,
                Err(e) => tracing::warn!(
                    error = %e,
                    room = room.unwrap_or(""),
                    message = line,
                    "Skipping undecodable message"
                ),
            }
        }
        Ok(())
    }

    async fn manage_battle_frame<C: SessionController>(
        &mut self,
        controller: &mut C,
        frame: &ServerFrame,
    ) {
        let Some(room) = frame.room_id.as_deref() else {
            return;
        };

        if self.sessions.insert(room.to_string()) {
            self.state.set_waiting_to_start(false);
            tracing::info!(room, "Session started");
            controller.on_session_start(room).await;
        }

        controller.on_battle_message(room, &frame.raw).await;

        let closed = frame.lines.iter().any(|line| line.trim_end() == "|deinit");
        if closed {
            self.sessions.remove(room);
        }
    }

    async fn manage_server_message<C: SessionController>(
        &mut self,
        controller: &mut C,
        room: Option<&str>,
        message: ServerMessage,
    ) -> Result<(), EngineError> {
        match message {
            ServerMessage::Challstr { key_id, challenge } => {
                self.log_in(&key_id, &challenge).await?;
            }
            ServerMessage::UpdateUser { username, .. }
                if to_user_id(&username) == to_user_id(&self.config.username) =>
            {
                if self.state.mark_logged_in() {
                    self.state.set_phase(EnginePhase::LoggedIn);
                    tracing::info!(username = %username, "Logged in");
                    controller.on_logged_in(&username).await;
                }
            }
            ServerMessage::UpdateChallenges(challenges) => {
                self.manage_challenges(controller, &challenges).await?;
            }
            ServerMessage::NameTaken { username, message } => {
                tracing::warn!(username = %username, message = %message, "Name taken");
                controller.on_name_taken(&username, &message).await;
            }
            ServerMessage::UpdateUser { .. }
            | ServerMessage::UpdateSearch(_)
            | ServerMessage::Popup(_) => {}
            ServerMessage::Raw(line) => {
                if !line.is_empty() {
                    tracing::warn!(room = room.unwrap_or(""), message = %line, "Unmanaged message");
                }
            }
        }
        Ok(())
    }

    async fn manage_challenges<C: SessionController>(
        &mut self,
        controller: &mut C,
        challenges: &ChallengeState,
    ) -> Result<(), EngineError> {
        for (user, format) in &challenges.challenges_from {
            if *format == self.config.format {
                self.accept_challenge(controller, user).await?;
            }
        }
        Ok(())
    }

    async fn accept_challenge<C: SessionController>(
        &mut self,
        controller: &mut C,
        user: &str,
    ) -> Result<(), EngineError> {
        if !controller.can_accept_challenge() {
            tracing::debug!(user, "Challenge left pending");
            return Ok(());
        }

        self.state.set_waiting_to_start(true);
        tracing::info!(user, format = %self.config.format, "Accepting challenge");
        self.outbound
            .send(&ClientMessage::global(ClientCommand::Accept(user.to_string())))
            .await
    }

    /// Trade the challenge string for an assertion and claim our name
    async fn log_in(&self, key_id: &str, challenge: &str) -> Result<(), EngineError> {
        let request = LoginRequest::new(
            &self.config.username,
            &self.config.password,
            key_id,
            challenge,
        );
        let assertion = self.authenticator.assertion(&request).await?;

        self.outbound
            .send(&ClientMessage::global(ClientCommand::TrustedLogin {
                username: self.config.username.clone(),
                assertion,
            }))
            .await?;

        if !self.state.logged_in() {
            self.state.set_phase(EnginePhase::AwaitingChallenge);
        }

        if let Some(avatar) = &self.config.avatar {
            self.outbound
                .send(&ClientMessage::global(ClientCommand::Avatar(avatar.clone())))
                .await?;
        }
        Ok(())
    }
}
