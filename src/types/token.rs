//! Token Types
//!
//! OAuth 1.0a token and credential definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Access token and secret belonging to one end user.
///
/// Owned by the host application; the consumer only receives it per call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredentials {
    /// Access token.
    pub token: String,
    /// Access token secret.
    pub secret: String,
}

impl UserCredentials {
    /// Create new user credentials.
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCredentials")
            .field("token", &self.token)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Lifecycle stage of a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// Unauthorized request token.
    Request,
    /// Authorized access token.
    Access,
    /// Not issued by this consumer.
    Unknown,
}

/// Form-encoded token response (`oauth_token=...&oauth_token_secret=...`).
#[derive(Clone, Debug, Default)]
pub struct TokenResponse {
    /// Issued token.
    pub token: Option<String>,
    /// Issued token secret.
    pub secret: Option<String>,
    /// `oauth_callback_confirmed` (request-token responses only).
    pub callback_confirmed: Option<bool>,
    /// Additional fields.
    pub extra: HashMap<String, String>,
}

impl TokenResponse {
    /// Parse a form-encoded response body.
    pub fn parse(body: &str) -> Self {
        let mut response = Self::default();

        for (key, value) in url::form_urlencoded::parse(body.trim().as_bytes()) {
            let value = value.into_owned();
            match key.as_ref() {
                "oauth_token" if !value.is_empty() => response.token = Some(value),
                "oauth_token_secret" => response.secret = Some(value),
                "oauth_callback_confirmed" => {
                    response.callback_confirmed = Some(value.eq_ignore_ascii_case("true"))
                }
                _ => {
                    response.extra.insert(key.into_owned(), value);
                }
            }
        }

        response
    }
}
