/// Commands that clients can send to server
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    /// /trn USERNAME,0,ASSERTION
    TrustedLogin { username: String, assertion: String },

    /// /avatar AVATAR
    Avatar(String),

    /// /challenge USERNAME, FORMAT
    Challenge { username: String, format: String },

    /// /accept USERNAME
    Accept(String),

    /// /leave (scoped by the message room)
    Leave,

    /// /search FORMAT
    Search(String),

    /// /cancelsearch
    CancelSearch,

    /// /choose CHOICE
    Choose(String),

    /// Raw command for catch-all
    Raw(String),
}

impl ClientCommand {
    /// Serialize command to protocol format
    pub fn to_protocol_string(&self) -> String {
        match self {
            Self::TrustedLogin {
                username,
                assertion,
            } => format!("/trn {},0,{}", username, assertion),
            Self::Avatar(avatar) => format!("/avatar {}", avatar),
            Self::Challenge { username, format } => format!("/challenge {}, {}", username, format),
            Self::Accept(username) => format!("/accept {}", username),
            Self::Leave => "/leave".to_string(),
            Self::Search(format) => format!("/search {}", format),
            Self::CancelSearch => "/cancelsearch".to_string(),
            Self::Choose(choice) => format!("/choose {}", choice),
            Self::Raw(command) => command.clone(),
        }
    }
}

/// Client message with room context and an optional trailing token
///
/// The trailing token carries things like the turn number a `/choose`
/// answers, which the server reads as a third `|`-separated field.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientMessage {
    pub room_id: String,
    pub command: ClientCommand,
    pub extra: Option<String>,
}

impl ClientMessage {
    /// A command outside of any room (`|COMMAND`)
    pub fn global(command: ClientCommand) -> Self {
        Self::in_room("", command)
    }

    /// A command scoped to a room (`ROOMID|COMMAND`)
    pub fn in_room(room_id: impl Into<String>, command: ClientCommand) -> Self {
        Self {
            room_id: room_id.into(),
            command,
            extra: None,
        }
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = Some(extra.into());
        self
    }

    /// Serialize to wire format: ROOMID|TEXT or ROOMID|TEXT|EXTRA
    pub fn to_wire_format(&self) -> String {
        let text = self.command.to_protocol_string();
        match &self.extra {
            Some(extra) => format!("{}|{}|{}", self.room_id, text, extra),
            None => format!("{}|{}", self.room_id, text),
        }
    }
}
