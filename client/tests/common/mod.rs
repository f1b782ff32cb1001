#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use pokeagent_client::{Authenticator, EngineConfig, EngineError, LoginRequest, SessionController};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};

pub const WAIT: Duration = Duration::from_secs(5);
pub const QUIET: Duration = Duration::from_millis(200);

/// A single-connection websocket server on the loopback interface.
///
/// Frames pushed with [`Loopback::push`] are sent to the client; frames the
/// client sends are collected for [`Loopback::next_frame`].
pub struct Loopback {
    pub address: String,
    outgoing: Option<mpsc::UnboundedSender<String>>,
    received: mpsc::UnboundedReceiver<String>,
}

impl Loopback {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let (outgoing_tx, mut outgoing_rx) = mpsc::unbounded_channel::<String>();
        let (received_tx, received_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let ws = accept_async(stream).await.unwrap();
            let (mut sink, mut stream) = ws.split();

            loop {
                tokio::select! {
                    frame = outgoing_rx.recv() => match frame {
                        Some(frame) => {
                            if sink.send(Message::Text(frame)).await.is_err() {
                                break;
                            }
                        }
                        None => {
                            let _ = sink.close().await;
                            break;
                        }
                    },
                    message = stream.next() => match message {
                        Some(Ok(Message::Text(text))) => {
                            let _ = received_tx.send(text);
                        }
                        Some(Ok(_)) => {}
                        _ => break,
                    },
                }
            }
        });

        Self {
            address,
            outgoing: Some(outgoing_tx),
            received: received_rx,
        }
    }

    pub fn config(&self, username: &str) -> EngineConfig {
        EngineConfig::new(username, "secret", self.address.clone())
            .with_authentication_address("http://127.0.0.1:9/action.php")
    }

    pub fn push(&self, frame: &str) {
        if let Some(outgoing) = &self.outgoing {
            outgoing.send(frame.to_string()).unwrap();
        }
    }

    /// Close the connection from the server side
    pub fn close(&mut self) {
        self.outgoing = None;
    }

    pub async fn next_frame(&mut self) -> String {
        tokio::time::timeout(WAIT, self.received.recv())
            .await
            .expect("timed out waiting for a client frame")
            .expect("server task ended")
    }

    /// Every frame that arrives until the client goes quiet
    pub async fn drain(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        while let Ok(Some(frame)) = tokio::time::timeout(QUIET, self.received.recv()).await {
            frames.push(frame);
        }
        frames
    }
}

/// Authenticator double that records every challenge string it is given
#[derive(Clone)]
pub struct RecordingAuthenticator {
    pub calls: Arc<Mutex<Vec<String>>>,
    reply: Result<String, String>,
}

impl RecordingAuthenticator {
    pub fn accepting(assertion: &str) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            reply: Ok(assertion.to_string()),
        }
    }

    pub fn rejecting(message: &str) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            reply: Err(message.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Authenticator for RecordingAuthenticator {
    async fn assertion(&self, request: &LoginRequest<'_>) -> Result<String, EngineError> {
        self.calls.lock().unwrap().push(request.challstr.clone());
        self.reply.clone().map_err(EngineError::LoginRejected)
    }
}

/// Controller that records what the engine hands it
#[derive(Default)]
pub struct TestController {
    pub refuse_challenges: bool,
    pub stop_after_login: bool,
    pub stop_after_battle_messages: Option<usize>,
    pub logged_in_as: Option<String>,
    pub sessions: Vec<String>,
    pub battle_messages: Vec<(String, String)>,
    pub names_taken: Vec<String>,
}

impl SessionController for TestController {
    fn can_accept_challenge(&self) -> bool {
        !self.refuse_challenges
    }

    fn should_terminate(&self) -> bool {
        (self.stop_after_login && self.logged_in_as.is_some())
            || self
                .stop_after_battle_messages
                .is_some_and(|limit| self.battle_messages.len() >= limit)
    }

    async fn on_battle_message(&mut self, room: &str, message: &str) {
        self.battle_messages
            .push((room.to_string(), message.to_string()));
    }

    async fn on_logged_in(&mut self, username: &str) {
        self.logged_in_as = Some(username.to_string());
    }

    async fn on_session_start(&mut self, room: &str) {
        self.sessions.push(room.to_string());
    }

    async fn on_name_taken(&mut self, username: &str, _message: &str) {
        self.names_taken.push(username.to_string());
    }
}
