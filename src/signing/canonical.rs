//! Signature base string construction (RFC 5849 Section 3.4.1).

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

/// Everything except the RFC 3986 unreserved set is encoded.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a value as required for OAuth (RFC 5849 Section 3.6).
pub fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Build the base string URI: scheme and host lower-cased, default port
/// dropped, query and fragment removed.
pub fn base_string_uri(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_lowercase();
    let authority = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    };
    format!("{}://{}{}", url.scheme(), authority, url.path())
}

/// Normalize request parameters (RFC 5849 Section 3.4.1.3.2).
///
/// Names and values are encoded first, then sorted by name and by value.
pub fn normalize_parameters<K, V>(params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k.as_ref()), percent_encode(v.as_ref())))
        .collect();

    encoded.sort();

    encoded
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Build the signature base string.
///
/// Query parameters of `url` are merged with `oauth_params`; an
/// `oauth_signature` entry, if present, is skipped.
pub fn signature_base_string<K, V>(method: &str, url: &Url, oauth_params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    params.extend(
        oauth_params
            .iter()
            .filter(|(k, _)| k.as_ref() != "oauth_signature")
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string())),
    );

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(&base_string_uri(url)),
        percent_encode(&normalize_parameters(&params))
    )
}
