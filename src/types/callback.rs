//! Callback Types
//!
//! Parameters the provider sends back after the user approves access.

use url::Url;

/// Callback parameters from the authorization redirect.
#[derive(Clone, Debug, Default)]
pub struct VerifierCallback {
    /// Request token being authorized.
    pub oauth_token: Option<String>,
    /// One-time verifier.
    pub oauth_verifier: Option<String>,
    /// Host-relative path to return the user to.
    pub callback: Option<String>,
}

impl VerifierCallback {
    /// Parse callback parameters from URL.
    pub fn from_url(url: &Url) -> Self {
        let mut params = Self::default();

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "oauth_token" => params.oauth_token = Some(value.into_owned()),
                "oauth_verifier" => params.oauth_verifier = Some(value.into_owned()),
                "callback" => params.callback = Some(value.into_owned()),
                _ => {}
            }
        }

        params
    }

    /// Parse callback parameters from URL string.
    pub fn from_url_str(url_str: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(url_str)?;
        Ok(Self::from_url(&url))
    }

    /// Check if the provider sent both the token and the verifier.
    pub fn is_complete(&self) -> bool {
        self.oauth_token.is_some() && self.oauth_verifier.is_some()
    }
}

/// Redirect produced by the first leg of the handshake.
#[derive(Clone, Debug)]
pub struct AuthorizationRedirect {
    /// Provider authorization URL to send the user's browser to.
    pub url: Url,
    /// Request token embedded in the URL.
    pub request_token: String,
}
