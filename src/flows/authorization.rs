//! Three-legged Authorization Flow
//!
//! RFC 5849 Section 2 - Redirection-Based Authorization.
//!
//! 1. Obtain a request token (signed with consumer credentials only).
//! 2. Send the user's browser to the provider's authorization endpoint.
//! 3. Exchange the request token and verifier for an access token.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use url::Url;

use crate::core::{DefaultNonceSource, HttpMethod, HttpTransport, NonceSource};
use crate::error::{create_error_from_response, malformed, LucidchartError, RouteError};
use crate::signing::{OAuthSigner, SignedRequest, TokenContext};
use crate::token::TokenManager;
use crate::types::{
    AuthorizationRedirect, LucidchartConfig, TokenResponse, UserCredentials, VerifierCallback,
};

/// Authorization flow interface.
#[async_trait]
pub trait AuthorizationFlow: Send + Sync {
    /// Obtain a request token and build the provider redirect.
    ///
    /// `return_url` is the host-relative path the user lands on once the
    /// handshake completes.
    async fn begin_authorization(
        &self,
        return_url: &str,
    ) -> Result<AuthorizationRedirect, LucidchartError>;

    /// Exchange an authorized request token for access credentials.
    ///
    /// Returns `None` when the provider answers without a token.
    async fn complete_authorization(
        &self,
        request_token: &str,
        verifier: &str,
    ) -> Result<Option<UserCredentials>, LucidchartError>;

    /// Complete the flow from the provider's redirect parameters.
    async fn handle_callback(
        &self,
        callback: &VerifierCallback,
    ) -> Result<Option<UserCredentials>, LucidchartError> {
        let request_token = callback.oauth_token.as_deref().ok_or_else(|| {
            LucidchartError::Route(RouteError::MissingParameter {
                name: "oauth_token".to_string(),
            })
        })?;
        let verifier = callback.oauth_verifier.as_deref().ok_or_else(|| {
            LucidchartError::Route(RouteError::MissingParameter {
                name: "oauth_verifier".to_string(),
            })
        })?;

        self.complete_authorization(request_token, verifier).await
    }
}

/// Authorization flow implementation.
pub struct AuthorizationFlowImpl<T: HttpTransport, M: TokenManager, N: NonceSource = DefaultNonceSource>
{
    config: LucidchartConfig,
    transport: Arc<T>,
    token_manager: Arc<M>,
    signer: Arc<OAuthSigner<N>>,
}

impl<T: HttpTransport, M: TokenManager> AuthorizationFlowImpl<T, M> {
    /// Create new authorization flow.
    pub fn new(config: LucidchartConfig, transport: Arc<T>, token_manager: Arc<M>) -> Self {
        let signer = Arc::new(OAuthSigner::new(config.consumer.clone()));
        Self::with_signer(config, transport, token_manager, signer)
    }
}

impl<T: HttpTransport, M: TokenManager, N: NonceSource> AuthorizationFlowImpl<T, M, N> {
    /// Create authorization flow sharing an existing signer.
    pub fn with_signer(
        config: LucidchartConfig,
        transport: Arc<T>,
        token_manager: Arc<M>,
        signer: Arc<OAuthSigner<N>>,
    ) -> Self {
        Self {
            config,
            transport,
            token_manager,
            signer,
        }
    }

    /// Token manager backing this flow.
    pub fn token_manager(&self) -> &Arc<M> {
        &self.token_manager
    }

    /// Signed request for a new request token.
    pub fn build_request_token_request(
        &self,
        return_url: &str,
    ) -> Result<SignedRequest, LucidchartError> {
        let url = self.config.provider.request_token_endpoint()?;
        let callback = self.config.verify_callback(return_url)?;
        Ok(self.signer.sign(
            HttpMethod::Get,
            url,
            None,
            &[("oauth_callback", callback.as_str())],
        ))
    }

    /// Provider URL the user's browser is redirected to.
    pub fn build_authorization_url(
        &self,
        request_token: &str,
        return_url: &str,
    ) -> Result<Url, LucidchartError> {
        let callback = self.config.verify_callback(return_url)?;
        let mut url = self.config.provider.authorization_endpoint()?;
        url.query_pairs_mut()
            .append_pair("oauth_token", request_token)
            .append_pair("oauth_callback", callback.as_str());
        Ok(url)
    }

    /// Signed access token request.
    ///
    /// Fails with an unknown-token error if the request token was never
    /// stored by this flow's token manager.
    pub fn build_access_token_request(
        &self,
        request_token: &str,
        verifier: &str,
    ) -> Result<SignedRequest, LucidchartError> {
        let secret = self.token_manager.get_secret(request_token)?;
        let url = self.config.provider.access_token_endpoint(verifier)?;
        Ok(self.signer.sign(
            HttpMethod::Get,
            url,
            Some(TokenContext {
                token: request_token,
                secret: &secret,
            }),
            &[],
        ))
    }

    async fn send_token_request(
        &self,
        request: SignedRequest,
    ) -> Result<TokenResponse, LucidchartError> {
        let response = self
            .transport
            .send(request.to_http_request(self.config.timeout))
            .await?;

        if !response.is_success() {
            return Err(create_error_from_response(response.status, &response.body));
        }

        Ok(TokenResponse::parse(&response.text()))
    }
}

#[async_trait]
impl<T: HttpTransport, M: TokenManager, N: NonceSource> AuthorizationFlow
    for AuthorizationFlowImpl<T, M, N>
{
    async fn begin_authorization(
        &self,
        return_url: &str,
    ) -> Result<AuthorizationRedirect, LucidchartError> {
        let request = self.build_request_token_request(return_url)?;
        let response = self.send_token_request(request).await?;

        let token = response
            .token
            .ok_or_else(|| malformed("request token response has no oauth_token"))?;
        let secret = response
            .secret
            .ok_or_else(|| malformed("request token response has no oauth_token_secret"))?;

        if response.callback_confirmed == Some(false) {
            warn!(request_token = %token, "Provider did not confirm the callback");
        }

        self.token_manager.store_request_token(&token, &secret)?;
        let url = self.build_authorization_url(&token, return_url)?;

        info!(request_token = %token, "Obtained request token");
        Ok(AuthorizationRedirect {
            url,
            request_token: token,
        })
    }

    async fn complete_authorization(
        &self,
        request_token: &str,
        verifier: &str,
    ) -> Result<Option<UserCredentials>, LucidchartError> {
        let request = self.build_access_token_request(request_token, verifier)?;
        let response = self.send_token_request(request).await?;

        let Some(access_token) = response.token else {
            warn!(request_token, "Access token response has no oauth_token");
            return Ok(None);
        };
        let access_secret = response
            .secret
            .ok_or_else(|| malformed("access token response has no oauth_token_secret"))?;

        self.token_manager
            .exchange(request_token, &access_token, &access_secret)?;
        let secret = self.token_manager.get_secret(&access_token)?;

        debug!(request_token, access_token = %access_token, "Exchanged request token");
        Ok(Some(UserCredentials::new(access_token, secret)))
    }
}

/// Mock authorization flow for testing.
#[derive(Default)]
pub struct MockAuthorizationFlow {
    begin_history: Mutex<Vec<String>>,
    complete_history: Mutex<Vec<(String, String)>>,
    next_credentials: Mutex<Option<Option<UserCredentials>>>,
    next_error: Mutex<Option<LucidchartError>>,
}

impl MockAuthorizationFlow {
    /// Create new mock flow.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the next `complete_authorization` result.
    pub fn set_next_credentials(&self, credentials: Option<UserCredentials>) -> &Self {
        *self.next_credentials.lock().unwrap() = Some(credentials);
        self
    }

    /// Set next error.
    pub fn set_next_error(&self, error: LucidchartError) -> &Self {
        *self.next_error.lock().unwrap() = Some(error);
        self
    }

    /// Return URLs passed to `begin_authorization`.
    pub fn get_begin_history(&self) -> Vec<String> {
        self.begin_history.lock().unwrap().clone()
    }

    /// `(request_token, verifier)` pairs passed to `complete_authorization`.
    pub fn get_complete_history(&self) -> Vec<(String, String)> {
        self.complete_history.lock().unwrap().clone()
    }

    fn check_error(&self) -> Result<(), LucidchartError> {
        match self.next_error.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AuthorizationFlow for MockAuthorizationFlow {
    async fn begin_authorization(
        &self,
        return_url: &str,
    ) -> Result<AuthorizationRedirect, LucidchartError> {
        self.begin_history
            .lock()
            .unwrap()
            .push(return_url.to_string());
        self.check_error()?;

        let mut url = Url::parse("https://mock.example.com/oauth/authorize")
            .map_err(|e| malformed(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("oauth_token", "mock-request-token")
            .append_pair("callback", return_url);

        Ok(AuthorizationRedirect {
            url,
            request_token: "mock-request-token".to_string(),
        })
    }

    async fn complete_authorization(
        &self,
        request_token: &str,
        verifier: &str,
    ) -> Result<Option<UserCredentials>, LucidchartError> {
        self.complete_history
            .lock()
            .unwrap()
            .push((request_token.to_string(), verifier.to_string()));
        self.check_error()?;

        Ok(self
            .next_credentials
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| {
                Some(UserCredentials::new(
                    "mock-access-token",
                    "mock-access-secret",
                ))
            }))
    }
}

/// Create mock authorization flow for testing.
pub fn create_mock_authorization_flow() -> MockAuthorizationFlow {
    MockAuthorizationFlow::new()
}
