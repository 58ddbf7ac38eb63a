//! Token Manager
//!
//! Short-lived in-memory mapping from token to token secret.
//!
//! Request tokens are stored with upsert semantics: the provider never
//! re-issues a token, and a repeated store for the same token only happens
//! when a flow is restarted, in which case the newest secret wins. The strict
//! [`TokenManager::insert_token`] is reserved for seeding a fresh manager from
//! persisted user credentials.

use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

use crate::error::{LucidchartError, TokenError};
use crate::types::{TokenKind, UserCredentials};

/// Token manager interface.
pub trait TokenManager: Send + Sync {
    /// Store a newly issued request token, replacing any previous secret.
    fn store_request_token(&self, token: &str, secret: &str) -> Result<(), LucidchartError>;

    /// Insert a token, failing if it is already present.
    fn insert_token(&self, token: &str, secret: &str) -> Result<(), LucidchartError>;

    /// Look up the secret for a request or access token.
    fn get_secret(&self, token: &str) -> Result<String, LucidchartError>;

    /// Replace a request token with the access token it was exchanged for.
    ///
    /// A missing request token is not an error; the access token is still
    /// inserted.
    fn exchange(
        &self,
        request_token: &str,
        access_token: &str,
        access_secret: &str,
    ) -> Result<(), LucidchartError>;

    /// Classify a token. Not supported: always fails.
    fn classify(&self, token: &str) -> Result<TokenKind, LucidchartError>;
}

/// In-memory token manager.
#[derive(Default)]
pub struct InMemoryTokenManager {
    secrets: Mutex<HashMap<String, String>>,
}

impl InMemoryTokenManager {
    /// Create an empty token manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager holding only the given user's access token.
    pub fn for_user(credentials: &UserCredentials) -> Result<Self, LucidchartError> {
        let manager = Self::new();
        manager.insert_token(&credentials.token, &credentials.secret)?;
        Ok(manager)
    }

    /// Number of tokens currently held.
    pub fn len(&self) -> usize {
        self.secrets.lock().unwrap().len()
    }

    /// Check if no tokens are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TokenManager for InMemoryTokenManager {
    fn store_request_token(&self, token: &str, secret: &str) -> Result<(), LucidchartError> {
        let replaced = self
            .secrets
            .lock()
            .unwrap()
            .insert(token.to_string(), secret.to_string())
            .is_some();
        debug!(token, replaced, "Stored request token");
        Ok(())
    }

    fn insert_token(&self, token: &str, secret: &str) -> Result<(), LucidchartError> {
        let mut secrets = self.secrets.lock().unwrap();
        if secrets.contains_key(token) {
            return Err(LucidchartError::Token(TokenError::DuplicateToken {
                token: token.to_string(),
            }));
        }
        secrets.insert(token.to_string(), secret.to_string());
        Ok(())
    }

    fn get_secret(&self, token: &str) -> Result<String, LucidchartError> {
        self.secrets
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or_else(|| {
                LucidchartError::Token(TokenError::UnknownToken {
                    token: token.to_string(),
                })
            })
    }

    fn exchange(
        &self,
        request_token: &str,
        access_token: &str,
        access_secret: &str,
    ) -> Result<(), LucidchartError> {
        let mut secrets = self.secrets.lock().unwrap();
        let expired = secrets.remove(request_token).is_some();
        secrets.insert(access_token.to_string(), access_secret.to_string());
        debug!(request_token, access_token, expired, "Exchanged request token");
        Ok(())
    }

    fn classify(&self, _token: &str) -> Result<TokenKind, LucidchartError> {
        Err(LucidchartError::Token(TokenError::NotSupported {
            operation: "classify".to_string(),
        }))
    }
}

/// Mock token manager for testing.
///
/// Behaves like the in-memory manager, records every call and can be told
/// to fail the next operation.
#[derive(Default)]
pub struct MockTokenManager {
    inner: InMemoryTokenManager,
    store_history: Mutex<Vec<(String, String)>>,
    exchange_history: Mutex<Vec<(String, String)>>,
    lookup_history: Mutex<Vec<String>>,
    next_error: Mutex<Option<LucidchartError>>,
}

impl MockTokenManager {
    /// Create new mock token manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set next error to return.
    pub fn set_next_error(&self, error: LucidchartError) -> &Self {
        *self.next_error.lock().unwrap() = Some(error);
        self
    }

    /// Pre-populate a token.
    pub fn add_token(&self, token: &str, secret: &str) -> &Self {
        let _ = self.inner.store_request_token(token, secret);
        self
    }

    /// Get store history as `(token, secret)` pairs.
    pub fn get_store_history(&self) -> Vec<(String, String)> {
        self.store_history.lock().unwrap().clone()
    }

    /// Get exchange history as `(request_token, access_token)` pairs.
    pub fn get_exchange_history(&self) -> Vec<(String, String)> {
        self.exchange_history.lock().unwrap().clone()
    }

    /// Get secret lookup history.
    pub fn get_lookup_history(&self) -> Vec<String> {
        self.lookup_history.lock().unwrap().clone()
    }

    fn check_error(&self) -> Result<(), LucidchartError> {
        match self.next_error.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl TokenManager for MockTokenManager {
    fn store_request_token(&self, token: &str, secret: &str) -> Result<(), LucidchartError> {
        self.check_error()?;
        self.store_history
            .lock()
            .unwrap()
            .push((token.to_string(), secret.to_string()));
        self.inner.store_request_token(token, secret)
    }

    fn insert_token(&self, token: &str, secret: &str) -> Result<(), LucidchartError> {
        self.check_error()?;
        self.inner.insert_token(token, secret)
    }

    fn get_secret(&self, token: &str) -> Result<String, LucidchartError> {
        self.check_error()?;
        self.lookup_history.lock().unwrap().push(token.to_string());
        self.inner.get_secret(token)
    }

    fn exchange(
        &self,
        request_token: &str,
        access_token: &str,
        access_secret: &str,
    ) -> Result<(), LucidchartError> {
        self.check_error()?;
        self.exchange_history
            .lock()
            .unwrap()
            .push((request_token.to_string(), access_token.to_string()));
        self.inner.exchange(request_token, access_token, access_secret)
    }

    fn classify(&self, token: &str) -> Result<TokenKind, LucidchartError> {
        self.inner.classify(token)
    }
}

/// Create in-memory token manager.
pub fn create_token_manager() -> InMemoryTokenManager {
    InMemoryTokenManager::new()
}

/// Create mock token manager for testing.
pub fn create_mock_token_manager() -> MockTokenManager {
    MockTokenManager::new()
}
