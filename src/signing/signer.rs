//! OAuth 1.0a request signer.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;
use url::Url;

use super::{authorization_header, compute_signature, signature_base_string};
use super::{OAUTH_VERSION, SIGNATURE_METHOD};
use crate::core::{DefaultNonceSource, HttpMethod, HttpRequest, NonceSource};
use crate::types::ConsumerCredentials;

/// Token presented with a request, together with its secret.
#[derive(Clone, Copy, Debug)]
pub struct TokenContext<'a> {
    /// Request or access token.
    pub token: &'a str,
    /// Matching token secret.
    pub secret: &'a str,
}

/// A signed request ready to be sent or handed to a browser.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Full URL including query string.
    pub url: Url,
    /// Protocol parameters in header order, `oauth_signature` last.
    pub oauth_params: Vec<(String, String)>,
    /// Headers to include (`authorization`).
    pub headers: HashMap<String, String>,
}

impl SignedRequest {
    /// Value of the `Authorization` header.
    pub fn authorization(&self) -> &str {
        self.headers
            .get("authorization")
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Look up a protocol parameter.
    pub fn oauth_param(&self, name: &str) -> Option<&str> {
        self.oauth_params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// The request URL with the protocol parameters moved into the query
    /// string, for redirecting a browser to a signed endpoint.
    pub fn authorized_url(&self) -> Url {
        let mut url = self.url.clone();
        {
            let mut query = url.query_pairs_mut();
            for (k, v) in &self.oauth_params {
                query.append_pair(k, v);
            }
        }
        url
    }

    /// Convert into a transport request.
    pub fn to_http_request(&self, timeout: Duration) -> HttpRequest {
        HttpRequest {
            method: self.method,
            url: self.url.to_string(),
            headers: self.headers.clone(),
            timeout: Some(timeout),
        }
    }
}

/// HMAC-SHA1 signer bound to one set of consumer credentials.
pub struct OAuthSigner<N: NonceSource = DefaultNonceSource> {
    consumer: ConsumerCredentials,
    nonce_source: Arc<N>,
}

impl OAuthSigner<DefaultNonceSource> {
    /// Create a signer with random nonces and wall-clock timestamps.
    pub fn new(consumer: ConsumerCredentials) -> Self {
        Self::with_nonce_source(consumer, Arc::new(DefaultNonceSource::new()))
    }
}

impl<N: NonceSource> OAuthSigner<N> {
    /// Create a signer with a custom nonce source.
    pub fn with_nonce_source(consumer: ConsumerCredentials, nonce_source: Arc<N>) -> Self {
        Self {
            consumer,
            nonce_source,
        }
    }

    /// Consumer key used by this signer.
    pub fn consumer_key(&self) -> &str {
        &self.consumer.consumer_key
    }

    /// Sign a request.
    ///
    /// `token` is `None` only when requesting a request token; the signing
    /// key then ends with an empty token secret. `extra_params` are protocol
    /// parameters such as `oauth_callback` and are signed and sent in the
    /// header.
    pub fn sign(
        &self,
        method: HttpMethod,
        url: Url,
        token: Option<TokenContext<'_>>,
        extra_params: &[(&str, &str)],
    ) -> SignedRequest {
        let mut params: Vec<(String, String)> = vec![
            (
                "oauth_consumer_key".to_string(),
                self.consumer.consumer_key.clone(),
            ),
            ("oauth_nonce".to_string(), self.nonce_source.nonce()),
            (
                "oauth_signature_method".to_string(),
                SIGNATURE_METHOD.to_string(),
            ),
            (
                "oauth_timestamp".to_string(),
                self.nonce_source.timestamp().to_string(),
            ),
            ("oauth_version".to_string(), OAUTH_VERSION.to_string()),
        ];

        if let Some(token) = token {
            params.push(("oauth_token".to_string(), token.token.to_string()));
        }

        params.extend(
            extra_params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );

        let base_string = signature_base_string(method.as_str(), &url, &params);
        trace!(%base_string, "Computed signature base string");

        let token_secret = token.map(|t| t.secret).unwrap_or_default();
        let signature = compute_signature(&base_string, self.consumer.secret(), token_secret);
        params.push(("oauth_signature".to_string(), signature));

        let mut headers = HashMap::new();
        headers.insert("authorization".to_string(), authorization_header(&params));

        SignedRequest {
            method,
            url,
            oauth_params: params,
            headers,
        }
    }
}
