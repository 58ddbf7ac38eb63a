//! Integration tests for the three-legged authorization flow

use super::*;
use lucidchart_integration::{LucidchartError, ProviderError, TokenError, TokenManager};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn form(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/x-www-form-urlencoded")
        .set_body_string(body)
}

#[tokio::test]
async fn test_full_authorization_flow() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/oauth/requestToken"))
        .and(header_exists("authorization"))
        .respond_with(form(
            "oauth_token=rt-123&oauth_token_secret=rs-456&oauth_callback_confirmed=true",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/oauth/accessToken"))
        .and(query_param("oauth_verifier", "ver-789"))
        .respond_with(form("oauth_token=at-abc&oauth_token_secret=as-def"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let consumer = test_consumer(&mock_server);

    let redirect = consumer
        .begin_authorization("apps/lucidchart/newdocument/PRJ/1/42")
        .await
        .unwrap();
    assert_eq!(redirect.request_token, "rt-123");
    assert_eq!(redirect.url.path(), "/oauth/authorize");
    assert!(redirect
        .url
        .query_pairs()
        .any(|(k, v)| k == "oauth_token" && v == "rt-123"));

    let credentials = consumer
        .complete_authorization("rt-123", "ver-789")
        .await
        .unwrap()
        .expect("access token issued");
    assert_eq!(credentials.token, "at-abc");
    assert_eq!(credentials.secret, "as-def");

    let manager = consumer.token_manager();
    assert!(matches!(
        manager.get_secret("rt-123"),
        Err(LucidchartError::Token(TokenError::UnknownToken { .. }))
    ));
    assert_eq!(manager.get_secret("at-abc").unwrap(), "as-def");

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    // Request token: consumer credentials only, with the callback.
    assert_signed(&mock_server, &requests[0], "");
    assert!(oauth_param(&requests[0], "oauth_token").is_none());
    assert_eq!(
        oauth_param(&requests[0], "oauth_consumer_key").as_deref(),
        Some(CONSUMER_KEY)
    );
    assert_eq!(
        oauth_param(&requests[0], "oauth_version").as_deref(),
        Some("1.0")
    );
    let callback = Url::parse(&oauth_param(&requests[0], "oauth_callback").unwrap()).unwrap();
    assert_eq!(
        callback.as_str(),
        "https://tracker.example.com/apps/lucidchart/verify?callback=apps%2Flucidchart%2Fnewdocument%2FPRJ%2F1%2F42"
    );

    // Access token: signed with the request token secret.
    assert_signed(&mock_server, &requests[1], "rs-456");
    assert_eq!(
        oauth_param(&requests[1], "oauth_token").as_deref(),
        Some("rt-123")
    );
}

#[tokio::test]
async fn test_access_token_response_without_token() {
    let mock_server = setup_mock_server().await;

    Mock::given(path("/oauth/requestToken"))
        .respond_with(form("oauth_token=rt-1&oauth_token_secret=rs-1"))
        .mount(&mock_server)
        .await;
    Mock::given(path("/oauth/accessToken"))
        .respond_with(form(""))
        .mount(&mock_server)
        .await;

    let consumer = test_consumer(&mock_server);
    consumer.begin_authorization("home").await.unwrap();

    let result = consumer.complete_authorization("rt-1", "v").await.unwrap();
    assert!(result.is_none());
    assert_eq!(consumer.token_manager().get_secret("rt-1").unwrap(), "rs-1");
}

#[tokio::test]
async fn test_unknown_request_token_sends_nothing() {
    let mock_server = setup_mock_server().await;
    let consumer = test_consumer(&mock_server);

    let result = consumer.complete_authorization("forged", "v").await;
    assert!(matches!(
        result,
        Err(LucidchartError::Token(TokenError::UnknownToken { .. }))
    ));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_request_token_rejected() {
    let mock_server = setup_mock_server().await;

    Mock::given(path("/oauth/requestToken"))
        .respond_with(ResponseTemplate::new(401).set_body_string("oauth_problem=consumer_key_unknown"))
        .mount(&mock_server)
        .await;

    let consumer = test_consumer(&mock_server);
    let error = consumer.begin_authorization("home").await.unwrap_err();

    match &error {
        LucidchartError::Provider(ProviderError::Status { status, body }) => {
            assert_eq!(*status, 401);
            assert_eq!(body, "oauth_problem=consumer_key_unknown");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(error.needs_reauth());
    assert!(consumer.token_manager().is_empty());
}

#[tokio::test]
async fn test_request_token_timeout() {
    let mock_server = setup_mock_server().await;

    Mock::given(path("/oauth/requestToken"))
        .respond_with(form("oauth_token=rt&oauth_token_secret=rs").set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let config = lucidchart_config()
        .consumer_key(CONSUMER_KEY)
        .consumer_secret(CONSUMER_SECRET)
        .base_url(mock_server.uri())
        .app_base_url(APP_URL)
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let consumer = LucidchartConsumer::new(config).unwrap();

    let result = consumer.begin_authorization("home").await;
    assert!(matches!(
        result,
        Err(LucidchartError::Provider(ProviderError::Timeout { .. }))
    ));
}
