//! Async protocol engine for Pokemon Showdown agents.
//!
//! A [`ProtocolEngine`] owns one websocket connection. Its receive loop logs
//! in when the server sends a challenge string, accepts challenges in the
//! configured format, and forwards every battle frame to a
//! [`SessionController`]. Decision logic sends commands concurrently through
//! cloned [`EngineHandle`]s.
//!
//! ```ignore
//! let config = EngineConfig::new("alice", "hunter2", "localhost:8000")
//!     .with_authentication_address(SHOWDOWN_LOGIN_URL);
//! let mut engine = ProtocolEngine::new(config)?;
//! engine.connect().await?;
//!
//! let mut controller = MyPlayer::new(engine.handle());
//! engine.run(&mut controller).await?;
//! ```

mod auth;
mod config;
mod connection;
mod engine;
mod error;
mod handle;
mod handler;
mod state;

pub use auth::{Authenticator, HttpAuthenticator, LoginRequest, parse_assertion};
pub use config::{DEFAULT_FORMAT, EngineConfig, SHOWDOWN_LOGIN_URL};
pub use engine::ProtocolEngine;
pub use error::EngineError;
pub use handle::EngineHandle;
pub use handler::SessionController;
pub use state::EnginePhase;

pub use pokeagent_protocol::{ClientCommand, ClientMessage, ServerFrame, ServerMessage};
