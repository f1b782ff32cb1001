//! Wire format for the Pokemon Showdown websocket protocol.
//!
//! Inbound frames are split into [`ServerFrame`]s whose lines decode one at a
//! time into typed [`ServerMessage`]s; outbound commands are built as [`ClientMessage`]s and serialized with
//! [`ClientMessage::to_wire_format`].

use thiserror::Error;

pub mod client;
pub mod server;

pub use client::{ClientCommand, ClientMessage};
pub use server::{
    ChallengeState, ServerFrame, ServerMessage, parse_server_frame, parse_server_message,
    to_user_id,
};

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid message format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid JSON payload in {kind}: {source}")]
    InvalidJson {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Empty message")]
    EmptyMessage,
}
