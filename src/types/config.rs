//! Configuration Types
//!
//! Consumer credentials and provider endpoint configuration.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::error::{ConfigurationError, LucidchartError, LucidchartResult};
use crate::types::ImageRequest;

/// Lucidchart service root.
pub const DEFAULT_BASE_URL: &str = "https://www.lucidchart.com/";

/// Default configuration values.
pub const DEFAULT_TIMEOUT_MS: u64 = 30000;
pub const DEFAULT_MAX_RESPONSE_SIZE: usize = 16 * 1024 * 1024;

/// Path of the widget's verification route, relative to the app base URL.
pub const VERIFY_ROUTE: &str = "apps/lucidchart/verify";

/// Lucidchart consumer configuration.
#[derive(Clone, Debug)]
pub struct LucidchartConfig {
    /// Consumer credentials.
    pub consumer: ConsumerCredentials,
    /// Provider endpoints.
    pub provider: ProviderConfig,
    /// Externally reachable base URL of the host application (ends with `/`).
    pub app_base_url: Url,
    /// HTTP timeout.
    pub timeout: Duration,
    /// Largest response body accepted from the provider.
    pub max_response_size: usize,
}

impl LucidchartConfig {
    /// OAuth callback the provider redirects to after user approval.
    ///
    /// `return_url` is carried through as the `callback` query parameter so
    /// the verification route knows where to send the user afterwards.
    pub fn verify_callback(&self, return_url: &str) -> LucidchartResult<Url> {
        let mut url = self.app_base_url.join(VERIFY_ROUTE).map_err(|_| {
            LucidchartError::Configuration(ConfigurationError::InvalidUrl {
                field: "app_base_url".to_string(),
                url: self.app_base_url.to_string(),
            })
        })?;
        url.query_pairs_mut().append_pair("callback", return_url);
        Ok(url)
    }

    /// Resolve a host-relative path against the app base URL.
    pub fn app_url(&self, path: &str) -> String {
        format!("{}{}", self.app_base_url, path.trim_start_matches('/'))
    }
}

/// Consumer credentials issued by Lucidchart.
#[derive(Clone)]
pub struct ConsumerCredentials {
    /// Consumer key.
    pub consumer_key: String,
    /// Consumer secret.
    pub consumer_secret: SecretString,
}

impl ConsumerCredentials {
    /// Create new consumer credentials.
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: SecretString::new(consumer_secret.into()),
        }
    }

    /// Consumer secret value (for signing).
    pub fn secret(&self) -> &str {
        self.consumer_secret.expose_secret()
    }
}

impl std::fmt::Debug for ConsumerCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsumerCredentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .finish()
    }
}

/// Lucidchart endpoint layout.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Service root, e.g. `https://www.lucidchart.com/`.
    pub base_url: Url,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
        }
    }
}

impl ProviderConfig {
    /// Create provider config for a custom service root.
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    fn endpoint(&self, segments: &[&str]) -> LucidchartResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                LucidchartError::Configuration(ConfigurationError::InvalidUrl {
                    field: "base_url".to_string(),
                    url: self.base_url.to_string(),
                })
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `GET /oauth/requestToken`.
    pub fn request_token_endpoint(&self) -> LucidchartResult<Url> {
        self.endpoint(&["oauth", "requestToken"])
    }

    /// `GET /oauth/authorize` (browser redirect target).
    pub fn authorization_endpoint(&self) -> LucidchartResult<Url> {
        self.endpoint(&["oauth", "authorize"])
    }

    /// `GET /oauth/accessToken?oauth_verifier=...`.
    pub fn access_token_endpoint(&self, verifier: &str) -> LucidchartResult<Url> {
        let mut url = self.endpoint(&["oauth", "accessToken"])?;
        url.query_pairs_mut().append_pair("oauth_verifier", verifier);
        Ok(url)
    }

    /// `GET /documents/describe/{id}`.
    pub fn describe_endpoint(&self, document_id: &str) -> LucidchartResult<Url> {
        self.endpoint(&["documents", "describe", document_id])
    }

    /// `GET /documents/image/{id}/{page}/{width}/{square}`.
    pub fn image_endpoint(&self, request: &ImageRequest) -> LucidchartResult<Url> {
        let page = request.page.to_string();
        let width = request.width.to_string();
        let square = if request.square { "1" } else { "0" };
        self.endpoint(&[
            "documents",
            "image",
            request.document_id.as_str(),
            page.as_str(),
            width.as_str(),
            square,
        ])
    }

    /// `GET /api/newDoc?callback=...`.
    pub fn new_document_endpoint(&self, callback: &str) -> LucidchartResult<Url> {
        let mut url = self.endpoint(&["api", "newDoc"])?;
        url.query_pairs_mut().append_pair("callback", callback);
        Ok(url)
    }

    /// `GET /documents/edit/{id}?callback=...`.
    pub fn edit_document_endpoint(&self, document_id: &str, callback: &str) -> LucidchartResult<Url> {
        let mut url = self.endpoint(&["documents", "edit", document_id])?;
        url.query_pairs_mut().append_pair("callback", callback);
        Ok(url)
    }
}
