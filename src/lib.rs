//! Lucidchart Integration Module
//!
//! Attaches Lucidchart diagrams to issues of a host issue tracker, built on an
//! OAuth 1.0a consumer.
//!
//! # Features
//!
//! - Three-legged authorization (RFC 5849 Section 2)
//! - HMAC-SHA1 request signing (RFC 5849 Section 3)
//! - In-memory token manager for request and access token secrets
//! - Document description, page image, new document and editor URLs
//! - Issue widget routes over host-provided stores
//!
//! # Example
//!
//! ```rust,ignore
//! use lucidchart_integration::{lucidchart_config, LucidchartConsumer, UserCredentials};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = lucidchart_config()
//!         .consumer_key("my-consumer-key")
//!         .consumer_secret("my-consumer-secret")
//!         .app_base_url("https://tracker.example.com/")
//!         .build()?;
//!
//!     let consumer = LucidchartConsumer::new(config)?;
//!
//!     // Leg 1: send the user's browser to the provider.
//!     let redirect = consumer.begin_authorization("apps/lucidchart/newdocument/PRJ/1/42").await?;
//!     println!("Authorize at: {}", redirect.url);
//!
//!     // Leg 3: the provider redirected back with a verifier.
//!     if let Some(user) = consumer.complete_authorization(&redirect.request_token, "verifier").await? {
//!         let document = consumer.describe_document("document-id", &user).await?;
//!         println!("{} has {} pages", document.name, document.page_count);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: configuration, token, document and callback types
//! - `error`: error hierarchy
//! - `core`: HTTP transport and nonce generation
//! - `signing`: signature base string and HMAC-SHA1 signer
//! - `token`: token manager
//! - `flows`: three-legged authorization flow
//! - `xml`: describe response parsing
//! - `storage`: host store interfaces
//! - `builders`: fluent configuration builder
//! - `client`: high-level consumer
//! - `widget`: issue widget routes

pub mod builders;
pub mod client;
pub mod core;
pub mod error;
pub mod flows;
pub mod signing;
pub mod storage;
pub mod token;
pub mod types;
pub mod widget;
pub mod xml;

// Re-export main client
pub use client::{lucidchart_consumer, LucidchartConsumer};

// Re-export builders
pub use builders::{lucidchart_config, LucidchartConfigBuilder};

// Re-export errors
pub use error::{
    create_error_from_response, get_user_message, ConfigurationError, LucidchartError,
    LucidchartResult, ProtocolError, ProviderError, RouteError, StorageError, TokenError,
};

// Re-export types
pub use types::{
    // Config
    ConsumerCredentials, LucidchartConfig, ProviderConfig, DEFAULT_BASE_URL,
    // Token
    TokenKind, TokenResponse, UserCredentials,
    // Document
    Attachment, DocumentDescription, ImageRequest,
    // Callback
    AuthorizationRedirect, VerifierCallback,
    // Settings
    WidgetSettings,
};

// Re-export core components
pub use core::{
    // Transport
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, MockHttpTransport,
    ReqwestHttpTransport,
    // Nonce
    DefaultNonceSource, MockNonceSource, NonceSource,
};

// Re-export signing
pub use signing::{OAuthSigner, SignedRequest, TokenContext};

// Re-export flows
pub use flows::{AuthorizationFlow, AuthorizationFlowImpl, MockAuthorizationFlow};

// Re-export token management
pub use token::{InMemoryTokenManager, MockTokenManager, TokenManager};

// Re-export storage
pub use storage::{
    AttachmentStore, CredentialStore, InMemoryAttachmentStore, InMemoryCredentialStore,
    InMemorySettingsStore, MockHostStore, SettingsStore,
};

// Re-export widget
pub use widget::{LucidchartWidget, WidgetApp, WidgetRequest, WidgetResponse, WidgetRoute, WidgetStores};
