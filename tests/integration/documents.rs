//! Integration tests for the document endpoints

use super::*;
use lucidchart_integration::{
    ImageRequest, LucidchartError, ProtocolError, ProviderError, UserCredentials,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

const DESCRIBE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<response>
  <document>
    <documentId>doc-42</documentId>
    <title>Order Pipeline</title>
    <editUrl>https://www.lucidchart.com/documents/edit/doc-42</editUrl>
    <viewUrl>https://www.lucidchart.com/documents/view/doc-42</viewUrl>
    <version>7</version>
    <pageCount>4</pageCount>
  </document>
</response>"#;

fn user() -> UserCredentials {
    UserCredentials::new("at-abc", "as-def")
}

#[tokio::test]
async fn test_describe_document() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/documents/describe/doc-42"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/xml")
                .set_body_string(DESCRIBE_XML),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let consumer = test_consumer(&mock_server);
    let document = consumer.describe_document("doc-42", &user()).await.unwrap();

    assert_eq!(document.id, "doc-42");
    assert_eq!(document.name, "Order Pipeline");
    assert_eq!(document.version, "7");
    assert_eq!(document.page_count, 4);

    let requests = mock_server.received_requests().await.unwrap();
    assert_signed(&mock_server, &requests[0], "as-def");
    assert_eq!(
        oauth_param(&requests[0], "oauth_token").as_deref(),
        Some("at-abc")
    );
    assert_eq!(
        oauth_param(&requests[0], "oauth_signature_method").as_deref(),
        Some("HMAC-SHA1")
    );
}

#[tokio::test]
async fn test_describe_document_malformed_xml() {
    let mock_server = setup_mock_server().await;

    Mock::given(path("/documents/describe/doc-42"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<response><document>"))
        .mount(&mock_server)
        .await;

    let consumer = test_consumer(&mock_server);
    let result = consumer.describe_document("doc-42", &user()).await;

    assert!(matches!(
        result,
        Err(LucidchartError::Protocol(ProtocolError::MalformedResponse { .. }))
    ));
}

#[tokio::test]
async fn test_document_image() {
    let mock_server = setup_mock_server().await;
    let png: Vec<u8> = vec![0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

    Mock::given(method("GET"))
        .and(path("/documents/image/doc-42/0/128/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(png.clone()),
        )
        .mount(&mock_server)
        .await;

    let consumer = test_consumer(&mock_server);
    let image = consumer
        .document_image(&ImageRequest::thumbnail("doc-42"), &user())
        .await
        .unwrap();

    assert_eq!(image.as_ref(), png.as_slice());
    let requests = mock_server.received_requests().await.unwrap();
    assert_signed(&mock_server, &requests[0], "as-def");
}

#[tokio::test]
async fn test_revoked_access_token() {
    let mock_server = setup_mock_server().await;

    Mock::given(path("/documents/describe/doc-42"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token_revoked"))
        .mount(&mock_server)
        .await;

    let consumer = test_consumer(&mock_server);
    let error = consumer
        .describe_document("doc-42", &user())
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        LucidchartError::Provider(ProviderError::Status { status: 401, .. })
    ));
    assert!(error.needs_reauth());
}

#[tokio::test]
async fn test_redirect_is_not_followed() {
    let mock_server = setup_mock_server().await;

    Mock::given(path("/documents/image/doc-42/0/500/0"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", "https://elsewhere.example.com/"),
        )
        .mount(&mock_server)
        .await;

    let consumer = test_consumer(&mock_server);
    let result = consumer
        .document_image(&ImageRequest::preview("doc-42"), &user())
        .await;

    assert!(matches!(
        result,
        Err(LucidchartError::Provider(ProviderError::Status { status: 302, .. }))
    ));
}

#[tokio::test]
async fn test_signed_browser_urls() {
    let mock_server = setup_mock_server().await;
    let consumer = test_consumer(&mock_server);

    let url = consumer
        .new_document_url("apps/lucidchart/editdocument/PRJ/1/42", &user())
        .unwrap();
    assert!(url.as_str().starts_with(&mock_server.uri()));
    assert_eq!(url.path(), "/api/newDoc");

    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert_eq!(
        pairs[0],
        (
            "callback".to_string(),
            "https://tracker.example.com/apps/lucidchart/editdocument/PRJ/1/42".to_string()
        )
    );
    let signature = pairs
        .iter()
        .find(|(k, _)| k == "oauth_signature")
        .map(|(_, v)| v.clone())
        .unwrap();

    // The signature covers the endpoint URL before the protocol parameters
    // were moved into the query.
    let mut signed_url = url.clone();
    signed_url
        .query_pairs_mut()
        .clear()
        .append_pair("callback", &pairs[0].1);
    let oauth: Vec<(String, String)> = pairs
        .iter()
        .filter(|(k, _)| k.starts_with("oauth_"))
        .cloned()
        .collect();
    let base = signature_base_string("GET", &signed_url, &oauth);
    assert_eq!(signature, compute_signature(&base, CONSUMER_SECRET, "as-def"));

    let edit = consumer
        .edit_document_url("doc-42", "apps/lucidchart/editdocument/PRJ/1/42", &user())
        .unwrap();
    assert_eq!(edit.path(), "/documents/edit/doc-42");
}
