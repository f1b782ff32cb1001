use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid challenge: player {peer:?}, format {format:?}")]
    InvalidChallenge { peer: String, format: String },

    #[error("Not connected")]
    NotConnected,

    #[error("Connection closed")]
    ConnectionClosed,

    /// The authentication server answered with something unusable
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The authentication server refused the credentials
    #[error("Login rejected: {0}")]
    LoginRejected(String),

    #[error("Authentication request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}
