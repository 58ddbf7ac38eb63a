//! OAuth 1.0a request signing.
//!
//! This module implements HMAC-SHA1 signing as described in RFC 5849: the
//! signature base string is built from the method, base URI and normalized
//! parameters, then signed with the consumer secret and token secret.

mod canonical;
mod signer;

pub use canonical::{base_string_uri, normalize_parameters, percent_encode, signature_base_string};
pub use signer::{OAuthSigner, SignedRequest, TokenContext};

use base64::Engine;
use ring::hmac;

/// Signature method identifier.
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";

/// Value of `oauth_version`. OAuth 1.0a keeps the `1.0` wire value.
pub const OAUTH_VERSION: &str = "1.0";

/// Scheme prefix of the `Authorization` header.
pub const AUTHORIZATION_SCHEME: &str = "OAuth";

/// Build the HMAC key: `encode(consumer_secret) & encode(token_secret)`.
///
/// The token secret is empty while requesting a request token.
pub fn signing_key(consumer_secret: &str, token_secret: &str) -> String {
    format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    )
}

/// HMAC-SHA1 over `data`, base64-encoded.
pub fn hmac_sha1_base64(key: &[u8], data: &[u8]) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, key);
    let tag = hmac::sign(&key, data);
    base64::engine::general_purpose::STANDARD.encode(tag.as_ref())
}

/// Sign a base string with the consumer and token secrets.
pub fn compute_signature(base_string: &str, consumer_secret: &str, token_secret: &str) -> String {
    let key = signing_key(consumer_secret, token_secret);
    hmac_sha1_base64(key.as_bytes(), base_string.as_bytes())
}

/// Format protocol parameters as an `Authorization` header value.
pub fn authorization_header<K, V>(oauth_params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let fields = oauth_params
        .iter()
        .map(|(k, v)| {
            format!(
                "{}=\"{}\"",
                percent_encode(k.as_ref()),
                percent_encode(v.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!("{} {}", AUTHORIZATION_SCHEME, fields)
}
