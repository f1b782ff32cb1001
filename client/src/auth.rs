use std::future::Future;

use serde_json::Value;

use crate::EngineError;

/// Credentials plus the server-issued challenge string
#[derive(Debug, Clone, PartialEq)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    /// `KEYID|CHALLENGE`, encoded as `KEYID%7CCHALLENGE` on the wire
    pub challstr: String,
}

impl<'a> LoginRequest<'a> {
    pub fn new(username: &'a str, password: &'a str, key_id: &str, challenge: &str) -> Self {
        Self {
            username,
            password,
            challstr: format!("{}|{}", key_id, challenge),
        }
    }

    /// Form fields posted to the authentication endpoint
    pub fn form(&self) -> [(&str, &str); 4] {
        [
            ("act", "login"),
            ("name", self.username),
            ("pass", self.password),
            ("challstr", &self.challstr),
        ]
    }
}

/// Exchanges a login request for an identity assertion
pub trait Authenticator: Send + Sync {
    fn assertion(
        &self,
        request: &LoginRequest<'_>,
    ) -> impl Future<Output = Result<String, EngineError>> + Send;
}

/// Authenticates against an HTTP login endpoint
#[derive(Debug, Clone)]
pub struct HttpAuthenticator {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAuthenticator {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(endpoint, reqwest::Client::new())
    }

    pub fn with_client(endpoint: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Authenticator for HttpAuthenticator {
    async fn assertion(&self, request: &LoginRequest<'_>) -> Result<String, EngineError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&request.form())
            .send()
            .await?;
        let text = response.text().await?;

        parse_assertion(&text)
    }
}

/// Extract the assertion from a login response body.
///
/// The body is JSON behind a one character prefix (`]` on the public
/// server). Assertions starting with `;;` carry a rejection message.
pub fn parse_assertion(body: &str) -> Result<String, EngineError> {
    let mut chars = body.chars();
    chars.next();

    let json: Value = serde_json::from_str(chars.as_str())
        .map_err(|e| EngineError::Authentication(format!("malformed login response: {}", e)))?;

    let assertion = json
        .get("assertion")
        .and_then(Value::as_str)
        .ok_or_else(|| EngineError::Authentication("login response missing assertion".into()))?;

    if let Some(error_msg) = assertion.strip_prefix(";;") {
        return Err(EngineError::LoginRejected(error_msg.to_string()));
    }

    Ok(assertion.to_string())
}
