use std::path::Path;

use serde::Deserialize;

use crate::EngineError;

pub const DEFAULT_FORMAT: &str = "gen7randombattle";

/// Login endpoint of the public Pokemon Showdown server
pub const SHOWDOWN_LOGIN_URL: &str = "https://play.pokemonshowdown.com/action.php";

/// Connection settings for one agent
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// `host[:port]`, or a full `ws://` / `wss://` URL
    pub server_address: String,

    /// Required; checked when the engine is built
    #[serde(default)]
    pub authentication_address: Option<String>,

    #[serde(default)]
    pub avatar: Option<String>,

    /// Challenges in this format are accepted automatically
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

impl EngineConfig {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        server_address: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            server_address: server_address.into(),
            authentication_address: None,
            avatar: None,
            format: default_format(),
        }
    }

    pub fn with_authentication_address(mut self, address: impl Into<String>) -> Self {
        self.authentication_address = Some(address.into());
        self
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json)
            .map_err(|e| EngineError::Configuration(format!("invalid config: {}", e)))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Configuration(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
    }

    /// Websocket endpoint for [`server_address`](Self::server_address)
    pub fn websocket_url(&self) -> String {
        if self.server_address.starts_with("ws://") || self.server_address.starts_with("wss://") {
            self.server_address.clone()
        } else {
            format!("ws://{}/showdown/websocket", self.server_address)
        }
    }

    /// The authentication endpoint, or a configuration error if unset
    pub fn authentication_address(&self) -> Result<&str, EngineError> {
        self.authentication_address
            .as_deref()
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .ok_or_else(|| {
                EngineError::Configuration(
                    "unspecified authentication address".to_string(),
                )
            })
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.username.trim().is_empty() {
            return Err(EngineError::Configuration("empty username".to_string()));
        }
        if self.server_address.trim().is_empty() {
            return Err(EngineError::Configuration("empty server address".to_string()));
        }
        self.authentication_address()?;
        Ok(())
    }
}
