//! Error Types
//!
//! Error hierarchy for the OAuth 1.0a consumer and the Lucidchart widget.

use std::time::Duration;
use thiserror::Error;

/// Root error type for the Lucidchart integration.
#[derive(Error, Debug)]
pub enum LucidchartError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Route error: {0}")]
    Route(#[from] RouteError),
}

impl LucidchartError {
    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "LUCID_CONFIG",
            Self::Token(_) => "LUCID_TOKEN",
            Self::Provider(_) => "LUCID_PROVIDER",
            Self::Protocol(_) => "LUCID_PROTOCOL",
            Self::Storage(_) => "LUCID_STORAGE",
            Self::Route(_) => "LUCID_ROUTE",
        }
    }

    /// Check if the user has to go through the authorization flow again.
    pub fn needs_reauth(&self) -> bool {
        match self {
            Self::Token(TokenError::UnknownToken { .. }) => true,
            Self::Provider(ProviderError::Status { status, .. }) => *status == 401,
            _ => false,
        }
    }

    /// Check if the host should send the administrator to the setup screen.
    pub fn needs_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Missing consumer credentials: {field}")]
    MissingCredentials { field: String },

    #[error("Invalid URL for {field}: {url}")]
    InvalidUrl { field: String, url: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Token manager error.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Unknown token: {token}")]
    UnknownToken { token: String },

    #[error("Token already stored: {token}")]
    DuplicateToken { token: String },

    #[error("Operation not supported: {operation}")]
    NotSupported { operation: String },
}

/// Provider (Lucidchart) error.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider returned HTTP {status}")]
    Status { status: u16, body: String },

    #[error("Request timeout after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Connection failed: {message}")]
    Connection { message: String },
}

impl ProviderError {
    /// HTTP status carried by the error, if the provider answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Protocol/response parsing error.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("Response too large: {size} bytes")]
    ResponseTooLarge { size: usize },
}

/// Host store error.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Read failed: {message}")]
    ReadFailed { message: String },

    #[error("Write failed: {message}")]
    WriteFailed { message: String },
}

/// Widget routing error.
#[derive(Error, Debug)]
pub enum RouteError {
    #[error("Unknown route: {route}")]
    UnknownRoute { route: String },

    #[error("Missing parameter: {name}")]
    MissingParameter { name: String },

    #[error("Invalid parameter {name}: {value}")]
    InvalidParameter { name: String, value: String },
}

/// Result type for Lucidchart operations.
pub type LucidchartResult<T> = Result<T, LucidchartError>;

/// Shorthand for a malformed-response error.
pub fn malformed(message: impl Into<String>) -> LucidchartError {
    LucidchartError::Protocol(ProtocolError::MalformedResponse {
        message: message.into(),
    })
}

/// Create error from a non-success HTTP response.
pub fn create_error_from_response(status: u16, body: &[u8]) -> LucidchartError {
    LucidchartError::Provider(ProviderError::Status {
        status,
        body: String::from_utf8_lossy(body).into_owned(),
    })
}

/// Get user-friendly error message.
pub fn get_user_message(error: &LucidchartError) -> String {
    match error {
        LucidchartError::Configuration(_) => {
            "Lucidchart has not been configured yet. Please ask an administrator to enter the consumer key and secret."
                .to_string()
        }
        LucidchartError::Token(TokenError::UnknownToken { .. }) => {
            "Your Lucidchart authorization has expired. Please connect again.".to_string()
        }
        LucidchartError::Provider(ProviderError::Timeout { .. }) => {
            "Lucidchart did not respond in time. Please try again.".to_string()
        }
        LucidchartError::Provider(ProviderError::Status { status: 401, .. }) => {
            "Lucidchart rejected the request. Please connect your account again.".to_string()
        }
        LucidchartError::Provider(_) => {
            "Lucidchart is temporarily unavailable. Please try again later.".to_string()
        }
        _ => "A Lucidchart error occurred. Please try again.".to_string(),
    }
}
