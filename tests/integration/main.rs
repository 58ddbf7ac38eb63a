//! Integration tests using WireMock
//!
//! These tests run the consumer and the widget against a fake Lucidchart
//! provider and check what actually goes over the wire.

mod authorization;
mod documents;
mod widget;

use lucidchart_integration::signing::{compute_signature, signature_base_string};
use lucidchart_integration::{lucidchart_config, LucidchartConfig, LucidchartConsumer};
use percent_encoding::percent_decode_str;
use url::Url;
use wiremock::{MockServer, Request};

pub const CONSUMER_KEY: &str = "test-consumer-key";
pub const CONSUMER_SECRET: &str = "test-consumer-secret";
pub const APP_URL: &str = "https://tracker.example.com/";

/// Start a fake provider.
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Configuration pointing at the fake provider.
pub fn test_config(server: &MockServer) -> LucidchartConfig {
    lucidchart_config()
        .consumer_key(CONSUMER_KEY)
        .consumer_secret(CONSUMER_SECRET)
        .base_url(server.uri())
        .app_base_url(APP_URL)
        .build()
        .expect("valid test configuration")
}

/// Consumer with the default transport, pointing at the fake provider.
pub fn test_consumer(server: &MockServer) -> LucidchartConsumer {
    LucidchartConsumer::new(test_config(server)).expect("consumer builds")
}

/// Decode the protocol parameters of an `Authorization: OAuth ...` header.
pub fn oauth_params(request: &Request) -> Vec<(String, String)> {
    let header = request
        .headers
        .get("authorization")
        .expect("authorization header")
        .to_str()
        .expect("ascii header");
    let params = header.strip_prefix("OAuth ").expect("OAuth scheme");

    params
        .split(", ")
        .map(|pair| {
            let (key, value) = pair.split_once('=').expect("key=value");
            let value = value.trim_matches('"');
            (
                percent_decode_str(key).decode_utf8_lossy().into_owned(),
                percent_decode_str(value).decode_utf8_lossy().into_owned(),
            )
        })
        .collect()
}

/// Look up one protocol parameter.
pub fn oauth_param(request: &Request, name: &str) -> Option<String> {
    oauth_params(request)
        .into_iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
}

/// URL the client signed: the recorded request path and query on the
/// server's own address.
pub fn signed_url(server: &MockServer, request: &Request) -> Url {
    let mut url = Url::parse(&server.uri()).expect("server URI");
    url.set_path(request.url.path());
    url.set_query(request.url.query());
    url
}

/// Recompute the signature the provider would expect and compare.
pub fn assert_signed(server: &MockServer, request: &Request, token_secret: &str) {
    let params = oauth_params(request);
    let signature = params
        .iter()
        .find(|(key, _)| key == "oauth_signature")
        .map(|(_, value)| value.clone())
        .expect("oauth_signature");

    let url = signed_url(server, request);
    let base = signature_base_string(request.method.as_str(), &url, &params);
    assert_eq!(
        signature,
        compute_signature(&base, CONSUMER_SECRET, token_secret),
        "signature mismatch for {}",
        url
    );
}
