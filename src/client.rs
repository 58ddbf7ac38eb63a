//! Lucidchart Consumer
//!
//! High-level OAuth 1.0a consumer combining the authorization flow, request
//! signing and the document endpoints.

use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

use crate::core::{
    DefaultNonceSource, HttpMethod, HttpTransport, NonceSource, ReqwestHttpTransport,
};
use crate::error::{create_error_from_response, malformed, LucidchartError};
use crate::flows::{AuthorizationFlow, AuthorizationFlowImpl};
use crate::signing::{OAuthSigner, SignedRequest, TokenContext};
use crate::token::{InMemoryTokenManager, TokenManager};
use crate::types::{
    AuthorizationRedirect, DocumentDescription, ImageRequest, LucidchartConfig, UserCredentials,
    VerifierCallback,
};
use crate::xml::parse_document_description;

/// OAuth 1.0a consumer bound to one set of consumer credentials.
///
/// Reconfiguring the consumer key or secret means building a new consumer;
/// pending request tokens do not carry over.
pub struct LucidchartConsumer<
    T: HttpTransport = ReqwestHttpTransport,
    M: TokenManager = InMemoryTokenManager,
    N: NonceSource = DefaultNonceSource,
> {
    config: LucidchartConfig,
    transport: Arc<T>,
    token_manager: Arc<M>,
    signer: Arc<OAuthSigner<N>>,
    flow: AuthorizationFlowImpl<T, M, N>,
}

impl LucidchartConsumer<ReqwestHttpTransport, InMemoryTokenManager, DefaultNonceSource> {
    /// Create a consumer with default implementations.
    pub fn new(config: LucidchartConfig) -> Result<Self, LucidchartError> {
        let transport = ReqwestHttpTransport::with_options(config.timeout, config.max_response_size)?;
        Ok(Self::with_components(
            config,
            transport,
            InMemoryTokenManager::new(),
            DefaultNonceSource::new(),
        ))
    }
}

impl<T: HttpTransport, M: TokenManager, N: NonceSource> LucidchartConsumer<T, M, N> {
    /// Create a consumer with custom implementations.
    pub fn with_components(
        config: LucidchartConfig,
        transport: T,
        token_manager: M,
        nonce_source: N,
    ) -> Self {
        Self::from_shared(
            config,
            Arc::new(transport),
            Arc::new(token_manager),
            Arc::new(nonce_source),
        )
    }

    /// Create a consumer from shared components.
    ///
    /// Used when consumers are rebuilt on reconfiguration but keep the same
    /// transport and nonce source.
    pub fn from_shared(
        config: LucidchartConfig,
        transport: Arc<T>,
        token_manager: Arc<M>,
        nonce_source: Arc<N>,
    ) -> Self {
        let signer = Arc::new(OAuthSigner::with_nonce_source(
            config.consumer.clone(),
            nonce_source,
        ));
        let flow = AuthorizationFlowImpl::with_signer(
            config.clone(),
            transport.clone(),
            token_manager.clone(),
            signer.clone(),
        );

        Self {
            config,
            transport,
            token_manager,
            signer,
            flow,
        }
    }

    /// Get the consumer configuration.
    pub fn config(&self) -> &LucidchartConfig {
        &self.config
    }

    /// Get the token manager.
    pub fn token_manager(&self) -> &M {
        &self.token_manager
    }

    // ========== Authorization ==========

    /// Obtain a request token and build the provider redirect.
    pub async fn begin_authorization(
        &self,
        return_url: &str,
    ) -> Result<AuthorizationRedirect, LucidchartError> {
        self.flow.begin_authorization(return_url).await
    }

    /// Exchange an authorized request token for access credentials.
    pub async fn complete_authorization(
        &self,
        request_token: &str,
        verifier: &str,
    ) -> Result<Option<UserCredentials>, LucidchartError> {
        self.flow.complete_authorization(request_token, verifier).await
    }

    /// Complete authorization from the provider's redirect parameters.
    pub async fn handle_callback(
        &self,
        callback: &VerifierCallback,
    ) -> Result<Option<UserCredentials>, LucidchartError> {
        self.flow.handle_callback(callback).await
    }

    // ========== Signed requests ==========

    /// Sign a request to a protected resource with the user's access token.
    ///
    /// The secret is looked up through a token manager seeded with only this
    /// user's credentials, so pending request tokens held by the consumer are
    /// never consulted.
    pub fn build_signed_request(
        &self,
        method: HttpMethod,
        endpoint: Url,
        credentials: &UserCredentials,
    ) -> Result<SignedRequest, LucidchartError> {
        let user_tokens = InMemoryTokenManager::for_user(credentials)?;
        let secret = user_tokens.get_secret(&credentials.token)?;

        Ok(self.signer.sign(
            method,
            endpoint,
            Some(TokenContext {
                token: &credentials.token,
                secret: &secret,
            }),
            &[],
        ))
    }

    /// Fetch a protected resource and return the raw body.
    pub async fn fetch_resource(
        &self,
        endpoint: Url,
        credentials: &UserCredentials,
    ) -> Result<Bytes, LucidchartError> {
        self.fetch_with_headers(endpoint, credentials, &[]).await
    }

    async fn fetch_with_headers(
        &self,
        endpoint: Url,
        credentials: &UserCredentials,
        headers: &[(&str, &str)],
    ) -> Result<Bytes, LucidchartError> {
        let signed = self.build_signed_request(HttpMethod::Get, endpoint, credentials)?;
        let mut request = signed.to_http_request(self.config.timeout);
        request
            .headers
            .extend(headers.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        debug!(url = %request.url, "Fetching protected resource");
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(create_error_from_response(response.status, &response.body));
        }

        Ok(response.body)
    }

    // ========== Documents ==========

    /// Fetch document metadata.
    pub async fn describe_document(
        &self,
        document_id: &str,
        credentials: &UserCredentials,
    ) -> Result<DocumentDescription, LucidchartError> {
        let endpoint = self.config.provider.describe_endpoint(document_id)?;
        let body = self
            .fetch_with_headers(endpoint, credentials, &[("accept", "application/xml")])
            .await?;
        let xml = std::str::from_utf8(&body)
            .map_err(|e| malformed(format!("document description is not UTF-8: {e}")))?;

        parse_document_description(xml)
    }

    /// Fetch a rendered page image.
    pub async fn document_image(
        &self,
        request: &ImageRequest,
        credentials: &UserCredentials,
    ) -> Result<Bytes, LucidchartError> {
        let endpoint = self.config.provider.image_endpoint(request)?;
        let image = self.fetch_resource(endpoint, credentials).await?;

        debug!(
            document_id = %request.document_id,
            width = request.width,
            size = image.len(),
            "Fetched document image"
        );
        Ok(image)
    }

    /// Signed browser URL that opens the editor on a new document.
    ///
    /// `callback` is a host-relative path; the provider sends the user there
    /// with a `documentId` parameter once the document is saved.
    pub fn new_document_url(
        &self,
        callback: &str,
        credentials: &UserCredentials,
    ) -> Result<Url, LucidchartError> {
        let callback = self.config.app_url(callback);
        let endpoint = self.config.provider.new_document_endpoint(&callback)?;
        let url = self
            .build_signed_request(HttpMethod::Get, endpoint, credentials)?
            .authorized_url();

        info!("Built new document URL");
        Ok(url)
    }

    /// Signed browser URL that opens the editor on an existing document.
    pub fn edit_document_url(
        &self,
        document_id: &str,
        callback: &str,
        credentials: &UserCredentials,
    ) -> Result<Url, LucidchartError> {
        let callback = self.config.app_url(callback);
        let endpoint = self
            .config
            .provider
            .edit_document_endpoint(document_id, &callback)?;
        let url = self
            .build_signed_request(HttpMethod::Get, endpoint, credentials)?
            .authorized_url();

        info!(document_id, "Built edit document URL");
        Ok(url)
    }
}

/// Create a consumer with default implementations.
pub fn lucidchart_consumer(config: LucidchartConfig) -> Result<LucidchartConsumer, LucidchartError> {
    LucidchartConsumer::new(config)
}
