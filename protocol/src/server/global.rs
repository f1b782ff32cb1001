use super::{ChallengeState, ServerMessage};
use crate::{ParseError, Result};

pub fn parse_challstr(parts: &[&str]) -> Result<ServerMessage> {
    // |challstr|KEYID|CHALLENGE
    if parts.len() < 4 {
        return Err(ParseError::MissingField("challstr tokens".to_string()));
    }

    let key_id = parts[2].to_string();
    // CHALLENGE can contain | characters, so join everything after the key id
    let challenge = parts[3..].join("|");
    if key_id.is_empty() || challenge.is_empty() {
        return Err(ParseError::InvalidFormat(
            "challstr tokens cannot be empty".to_string(),
        ));
    }

    Ok(ServerMessage::Challstr { key_id, challenge })
}

pub fn parse_updateuser(parts: &[&str]) -> Result<ServerMessage> {
    if parts.len() < 3 {
        return Err(ParseError::MissingField("updateuser fields".to_string()));
    }

    let username = parts[2].trim().to_string();
    if username.is_empty() {
        return Err(ParseError::InvalidFormat("empty username".to_string()));
    }

    let named = parts.get(3).is_some_and(|named| *named == "1");
    let avatar = parts.get(4).unwrap_or(&"").to_string();

    Ok(ServerMessage::UpdateUser {
        username,
        named,
        avatar,
    })
}

pub fn parse_nametaken(parts: &[&str]) -> Result<ServerMessage> {
    if parts.len() < 4 {
        return Err(ParseError::MissingField("nametaken fields".to_string()));
    }

    Ok(ServerMessage::NameTaken {
        username: parts[2].to_string(),
        message: parts[3..].join("|"),
    })
}

pub fn parse_popup(parts: &[&str]) -> Result<ServerMessage> {
    if parts.len() < 3 {
        return Err(ParseError::MissingField("popup message".to_string()));
    }

    // MESSAGE can contain | characters
    Ok(ServerMessage::Popup(parts[2..].join("|")))
}

pub fn parse_updatesearch(parts: &[&str]) -> Result<ServerMessage> {
    if parts.len() < 3 {
        return Err(ParseError::MissingField("updatesearch json".to_string()));
    }

    // JSON can contain | characters
    let json_str = parts[2..].join("|");
    let state = serde_json::from_str(&json_str).map_err(|source| ParseError::InvalidJson {
        kind: "updatesearch",
        source,
    })?;

    Ok(ServerMessage::UpdateSearch(state))
}

pub fn parse_updatechallenges(parts: &[&str]) -> Result<ServerMessage> {
    if parts.len() < 3 {
        return Err(ParseError::MissingField("updatechallenges json".to_string()));
    }

    // JSON can contain | characters
    let json_str = parts[2..].join("|");
    let state: ChallengeState =
        serde_json::from_str(&json_str).map_err(|source| ParseError::InvalidJson {
            kind: "updatechallenges",
            source,
        })?;

    Ok(ServerMessage::UpdateChallenges(state))
}
