//! Configuration Builder
//!
//! Fluent builder for Lucidchart consumer configuration.

use std::time::Duration;
use url::Url;

use crate::error::{ConfigurationError, LucidchartError};
use crate::types::{
    ConsumerCredentials, LucidchartConfig, ProviderConfig, DEFAULT_BASE_URL,
    DEFAULT_MAX_RESPONSE_SIZE, DEFAULT_TIMEOUT_MS,
};

/// Environment variable holding the consumer key.
pub const ENV_CONSUMER_KEY: &str = "LUCIDCHART_CONSUMER_KEY";
/// Environment variable holding the consumer secret.
pub const ENV_CONSUMER_SECRET: &str = "LUCIDCHART_CONSUMER_SECRET";
/// Environment variable holding the host application's base URL.
pub const ENV_APP_URL: &str = "LUCIDCHART_APP_URL";
/// Environment variable overriding the Lucidchart service root.
pub const ENV_BASE_URL: &str = "LUCIDCHART_BASE_URL";

/// Lucidchart configuration builder.
#[derive(Clone, Default)]
pub struct LucidchartConfigBuilder {
    consumer_key: Option<String>,
    consumer_secret: Option<String>,
    base_url: Option<String>,
    app_base_url: Option<String>,
    timeout: Option<Duration>,
    max_response_size: Option<usize>,
}

impl LucidchartConfigBuilder {
    /// Create new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the builder from `LUCIDCHART_*` environment variables.
    ///
    /// Values set afterwards through the fluent setters take precedence.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            consumer_key: var(ENV_CONSUMER_KEY),
            consumer_secret: var(ENV_CONSUMER_SECRET),
            base_url: var(ENV_BASE_URL),
            app_base_url: var(ENV_APP_URL),
            ..Self::default()
        }
    }

    /// Set consumer key.
    pub fn consumer_key(mut self, consumer_key: impl Into<String>) -> Self {
        self.consumer_key = Some(consumer_key.into());
        self
    }

    /// Set consumer secret.
    pub fn consumer_secret(mut self, consumer_secret: impl Into<String>) -> Self {
        self.consumer_secret = Some(consumer_secret.into());
        self
    }

    /// Override the Lucidchart service root.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the host application's externally reachable base URL.
    pub fn app_base_url(mut self, app_base_url: impl Into<String>) -> Self {
        self.app_base_url = Some(app_base_url.into());
        self
    }

    /// Set request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the largest accepted response body.
    pub fn max_response_size(mut self, max_response_size: usize) -> Self {
        self.max_response_size = Some(max_response_size);
        self
    }

    /// Build the configuration.
    ///
    /// Blank consumer credentials are rejected: the flow must not be
    /// attempted until an administrator has configured them.
    pub fn build(self) -> Result<LucidchartConfig, LucidchartError> {
        let consumer_key = required(self.consumer_key, "consumer_key")?;
        let consumer_secret = required(self.consumer_secret, "consumer_secret")?;

        let app_base_url = self.app_base_url.ok_or_else(|| {
            LucidchartError::Configuration(ConfigurationError::InvalidConfig {
                message: "app_base_url is required to build OAuth callbacks".to_string(),
            })
        })?;
        let app_base_url = parse_base_url("app_base_url", &app_base_url)?;

        let base_url = parse_base_url(
            "base_url",
            self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
        )?;

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_millis(DEFAULT_TIMEOUT_MS));
        if timeout.is_zero() {
            return Err(LucidchartError::Configuration(
                ConfigurationError::InvalidConfig {
                    message: "timeout must be greater than zero".to_string(),
                },
            ));
        }

        Ok(LucidchartConfig {
            consumer: ConsumerCredentials::new(consumer_key, consumer_secret),
            provider: ProviderConfig::new(base_url),
            app_base_url,
            timeout,
            max_response_size: self.max_response_size.unwrap_or(DEFAULT_MAX_RESPONSE_SIZE),
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, LucidchartError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            LucidchartError::Configuration(ConfigurationError::MissingCredentials {
                field: field.to_string(),
            })
        })
}

/// Parse an absolute http(s) URL and make sure its path ends with `/`.
fn parse_base_url(field: &str, raw: &str) -> Result<Url, LucidchartError> {
    let invalid = || {
        LucidchartError::Configuration(ConfigurationError::InvalidUrl {
            field: field.to_string(),
            url: raw.to_string(),
        })
    };

    let mut url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Create a new Lucidchart configuration builder.
pub fn lucidchart_config() -> LucidchartConfigBuilder {
    LucidchartConfigBuilder::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_success() {
        let config = LucidchartConfigBuilder::new()
            .consumer_key("key")
            .consumer_secret("secret")
            .app_base_url("https://tracker.example.com/gemini")
            .build()
            .unwrap();

        assert_eq!(config.consumer.consumer_key, "key");
        assert_eq!(config.consumer.secret(), "secret");
        assert_eq!(
            config.app_base_url.as_str(),
            "https://tracker.example.com/gemini/"
        );
        assert_eq!(
            config.provider.base_url.as_str(),
            "https://www.lucidchart.com/"
        );
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builder_missing_consumer_key() {
        let result = LucidchartConfigBuilder::new()
            .consumer_secret("secret")
            .app_base_url("https://tracker.example.com/")
            .build();

        assert!(matches!(
            result,
            Err(LucidchartError::Configuration(
                ConfigurationError::MissingCredentials { ref field }
            )) if field == "consumer_key"
        ));
    }

    #[test]
    fn test_builder_blank_secret_is_missing() {
        let result = LucidchartConfigBuilder::new()
            .consumer_key("key")
            .consumer_secret("   ")
            .app_base_url("https://tracker.example.com/")
            .build();

        assert!(result.unwrap_err().needs_configuration());
    }

    #[test]
    fn test_builder_rejects_relative_app_url() {
        let result = LucidchartConfigBuilder::new()
            .consumer_key("key")
            .consumer_secret("secret")
            .app_base_url("/gemini/")
            .build();

        assert!(matches!(
            result,
            Err(LucidchartError::Configuration(ConfigurationError::InvalidUrl { .. }))
        ));
    }

    #[test]
    fn test_builder_from_env_with_overrides() {
        // The only test touching LUCIDCHART_* variables.
        std::env::set_var(ENV_CONSUMER_KEY, "env-key");
        std::env::set_var(ENV_CONSUMER_SECRET, "env-secret");
        std::env::set_var(ENV_APP_URL, "https://env.example.com/tracker");
        std::env::set_var(ENV_BASE_URL, "http://127.0.0.1:9000");

        let from_env = LucidchartConfigBuilder::from_env().build();
        let overridden = LucidchartConfigBuilder::from_env()
            .consumer_key("fluent-key")
            .app_base_url("https://fluent.example.com/")
            .build();

        std::env::set_var(ENV_CONSUMER_SECRET, "");
        let blank_secret = LucidchartConfigBuilder::from_env().build();

        for name in [ENV_CONSUMER_KEY, ENV_CONSUMER_SECRET, ENV_APP_URL, ENV_BASE_URL] {
            std::env::remove_var(name);
        }

        let from_env = from_env.unwrap();
        assert_eq!(from_env.consumer.consumer_key, "env-key");
        assert_eq!(from_env.consumer.secret(), "env-secret");
        assert_eq!(from_env.app_base_url.as_str(), "https://env.example.com/tracker/");
        assert_eq!(from_env.provider.base_url.as_str(), "http://127.0.0.1:9000/");

        let overridden = overridden.unwrap();
        assert_eq!(overridden.consumer.consumer_key, "fluent-key");
        assert_eq!(overridden.consumer.secret(), "env-secret");
        assert_eq!(overridden.app_base_url.as_str(), "https://fluent.example.com/");

        assert!(matches!(
            blank_secret,
            Err(LucidchartError::Configuration(
                ConfigurationError::MissingCredentials { ref field }
            )) if field == "consumer_secret"
        ));
    }

    #[test]
    fn test_verify_callback() {
        let config = lucidchart_config()
            .consumer_key("key")
            .consumer_secret("secret")
            .app_base_url("https://tracker.example.com/gemini/")
            .build()
            .unwrap();

        let callback = config
            .verify_callback("apps/lucidchart/newdocument/P/1/2")
            .unwrap();
        assert_eq!(
            callback.as_str(),
            "https://tracker.example.com/gemini/apps/lucidchart/verify?callback=apps%2Flucidchart%2Fnewdocument%2FP%2F1%2F2"
        );
        assert_eq!(
            config.app_url("/project/P"),
            "https://tracker.example.com/gemini/project/P"
        );
    }
}
