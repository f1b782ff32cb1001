mod global;

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{ParseError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// |challstr|KEYID|CHALLENGE
    Challstr { key_id: String, challenge: String },
    /// |updateuser|USER|NAMED|AVATAR
    UpdateUser {
        username: String,
        named: bool,
        avatar: String,
    },
    /// |nametaken|USERNAME|MESSAGE
    NameTaken { username: String, message: String },
    /// |updatechallenges|JSON
    UpdateChallenges(ChallengeState),
    /// |updatesearch|JSON
    UpdateSearch(serde_json::Value),
    /// |popup|MESSAGE
    Popup(String),
    Raw(String),
}

impl ServerMessage {
    /// Protocol name of the message type, or `None` for raw lines
    pub fn kind(&self) -> Option<&'static str> {
        match self {
            Self::Challstr { .. } => Some("challstr"),
            Self::UpdateUser { .. } => Some("updateuser"),
            Self::NameTaken { .. } => Some("nametaken"),
            Self::UpdateChallenges(_) => Some("updatechallenges"),
            Self::UpdateSearch(_) => Some("updatesearch"),
            Self::Popup(_) => Some("popup"),
            Self::Raw(_) => None,
        }
    }
}

/// Challenges currently pending for the logged in user
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeState {
    /// Challenger username -> format
    #[serde(default)]
    pub challenges_from: BTreeMap<String, String>,
    #[serde(default)]
    pub challenge_to: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerFrame {
    pub room_id: Option<String>,
    /// Message lines after the room header, blank lines dropped
    pub lines: Vec<String>,
    /// The frame exactly as received
    pub raw: String,
}

impl ServerFrame {
    /// Whether this frame belongs to a battle room
    pub fn is_battle(&self) -> bool {
        self.room_id
            .as_deref()
            .is_some_and(|room| room.starts_with("battle-"))
    }

    /// Decode each line on its own, so a malformed line leaves its
    /// siblings intact
    pub fn messages(&self) -> impl Iterator<Item = (&str, Result<ServerMessage>)> + '_ {
        self.lines
            .iter()
            .map(|line| (line.as_str(), parse_server_message(line)))
    }
}

/// Split a complete WebSocket frame into its room header and message lines.
/// Only an empty frame is an error; lines are decoded lazily through
/// [`ServerFrame::messages`].
pub fn parse_server_frame(frame: &str) -> Result<ServerFrame> {
    if frame.trim().is_empty() {
        return Err(ParseError::EmptyMessage);
    }

    let mut lines = frame.lines();
    let mut room_id = None;

    // Check if first line is >ROOMID
    if let Some(first_line) = lines.clone().next()
        && let Some(room) = first_line.strip_prefix('>')
    {
        room_id = Some(room.trim().to_string());
        lines.next();
    }

    let lines = lines
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect();

    Ok(ServerFrame {
        room_id,
        lines,
        raw: frame.to_string(),
    })
}

/// Parse a single line from the server into a ServerMessage
pub fn parse_server_message(line: &str) -> Result<ServerMessage> {
    let line = line.trim_end_matches(['\r', '\n']);

    if line.is_empty() {
        return Ok(ServerMessage::Raw(String::new()));
    }

    if !line.starts_with('|') {
        return Ok(ServerMessage::Raw(line.to_string()));
    }

    let parts: Vec<&str> = line.split('|').collect();

    if parts.len() < 2 {
        return Ok(ServerMessage::Raw(line.to_string()));
    }

    match parts[1] {
        "challstr" => global::parse_challstr(&parts),
        "updateuser" => global::parse_updateuser(&parts),
        "nametaken" => global::parse_nametaken(&parts),
        "updatechallenges" => global::parse_updatechallenges(&parts),
        "updatesearch" => global::parse_updatesearch(&parts),
        "popup" => global::parse_popup(&parts),
        _ => Ok(ServerMessage::Raw(line.to_string())),
    }
}

/// Reduce a display name to the server's user id: lowercase ASCII
/// alphanumerics only, so rank symbols, spacing and case are ignored.
pub fn to_user_id(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
