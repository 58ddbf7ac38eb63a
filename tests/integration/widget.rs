//! Integration tests for the issue widget

use super::*;
use lucidchart_integration::storage::{AttachmentStore, CredentialStore};
use lucidchart_integration::{
    LucidchartWidget, MockHostStore, WidgetApp, WidgetRequest, WidgetResponse, WidgetStores,
};
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

async fn create_widget(mock_server: &MockServer) -> (LucidchartWidget, Arc<MockHostStore>) {
    let store = Arc::new(MockHostStore::new());
    let template = lucidchart_config()
        .base_url(mock_server.uri())
        .app_base_url(APP_URL);
    let widget = LucidchartWidget::new(template, WidgetStores::shared(store.clone())).unwrap();
    widget.load_config().await.unwrap();
    (widget, store)
}

fn redirect_url(response: &WidgetResponse) -> Url {
    Url::parse(response.redirect_target().expect("redirect")).expect("absolute URL")
}

#[tokio::test]
async fn test_attach_diagram_end_to_end() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/oauth/requestToken"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("oauth_token=rt-1&oauth_token_secret=rs-1"),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/oauth/accessToken"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("oauth_token=at-1&oauth_token_secret=as-1"),
        )
        .mount(&mock_server)
        .await;
    Mock::given(path("/documents/describe/doc-9"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<response><document><documentId>doc-9</documentId><title>Sequence</title></document></response>",
        ))
        .mount(&mock_server)
        .await;
    Mock::given(path("/documents/image/doc-9/0/500/0"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"full".to_vec()))
        .mount(&mock_server)
        .await;
    Mock::given(path("/documents/image/doc-9/0/128/1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"thumb".to_vec()))
        .mount(&mock_server)
        .await;

    let (widget, store) = create_widget(&mock_server).await;

    // Not configured yet.
    let response = widget
        .on_request(WidgetRequest::new("alice", "apps/lucidchart/newdocument/PRJ/1/42"))
        .await
        .unwrap();
    assert_eq!(response.redirect_target(), Some("~/configure"));

    let response = widget
        .on_request(
            WidgetRequest::new("admin", "apps/lucidchart/configure")
                .with_param("consumerKey", CONSUMER_KEY)
                .with_param("consumerSecret", CONSUMER_SECRET),
        )
        .await
        .unwrap();
    assert_eq!(response, WidgetResponse::success());

    // No user credentials: off to the provider.
    let response = widget
        .on_request(WidgetRequest::new("alice", "apps/lucidchart/newdocument/PRJ/1/42"))
        .await
        .unwrap();
    let authorize = redirect_url(&response);
    assert_eq!(authorize.path(), "/oauth/authorize");
    let callback = authorize
        .query_pairs()
        .find(|(k, _)| k == "oauth_callback")
        .map(|(_, v)| v.into_owned())
        .unwrap();

    // The provider sends the browser back to the verify route.
    let mut verify = Url::parse(&callback).unwrap();
    verify
        .query_pairs_mut()
        .append_pair("oauth_token", "rt-1")
        .append_pair("oauth_verifier", "ver-1");
    let response = widget
        .on_request(WidgetRequest::from_url("alice", &verify))
        .await
        .unwrap();
    assert_eq!(
        response.redirect_target(),
        Some("https://tracker.example.com/apps/lucidchart/newdocument/PRJ/1/42")
    );
    assert_eq!(
        CredentialStore::get(store.as_ref(), "alice").await.unwrap(),
        Some(lucidchart_integration::UserCredentials::new("at-1", "as-1"))
    );

    // Now the editor opens directly.
    let response = widget
        .on_request(WidgetRequest::new("alice", "apps/lucidchart/newdocument/PRJ/1/42"))
        .await
        .unwrap();
    let editor = redirect_url(&response);
    assert_eq!(editor.path(), "/api/newDoc");
    assert!(editor.query_pairs().any(|(k, v)| k == "oauth_token" && v == "at-1"));

    // Lucidchart returns to the save route once the diagram is saved.
    let response = widget
        .on_request(
            WidgetRequest::new("alice", "apps/lucidchart/editdocument/PRJ/1/42")
                .with_param("documentId", "doc-9"),
        )
        .await
        .unwrap();
    assert_eq!(
        response,
        WidgetResponse::IssuePage {
            project_id: 1,
            project_code: "PRJ".to_string(),
            issue_id: 42,
        }
    );

    let attachments = AttachmentStore::get(store.as_ref(), 42).await.unwrap();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0].name, "Sequence");

    let response = widget
        .on_request(WidgetRequest::new(
            "bob",
            "apps/lucidchart/thumbnail/lucidchart/lucidchart/42/DOC-9",
        ))
        .await
        .unwrap();
    assert_eq!(response, WidgetResponse::png(b"thumb".to_vec()));

    let requests = mock_server.received_requests().await.unwrap();
    let describe = requests
        .iter()
        .find(|r| r.url.path() == "/documents/describe/doc-9")
        .unwrap();
    assert_signed(&mock_server, describe, "as-1");
}

#[tokio::test]
async fn test_configuration_survives_restart() {
    let mock_server = setup_mock_server().await;
    let (widget, store) = create_widget(&mock_server).await;

    widget
        .on_request(
            WidgetRequest::new("admin", "configure")
                .with_param("consumerKey", CONSUMER_KEY)
                .with_param("consumerSecret", CONSUMER_SECRET),
        )
        .await
        .unwrap();

    let template = lucidchart_config()
        .base_url(mock_server.uri())
        .app_base_url(APP_URL);
    let restarted = LucidchartWidget::new(template, WidgetStores::shared(store)).unwrap();
    assert!(restarted.needs_configuration());

    restarted.load_config().await.unwrap();
    let consumer = restarted.consumer().unwrap();
    assert_eq!(consumer.config().consumer.consumer_key, CONSUMER_KEY);
}
