//! Widget Settings
//!
//! Consumer credentials as entered by an administrator and persisted by the host.

use serde::{Deserialize, Serialize};

use crate::types::ConsumerCredentials;

/// Persisted widget settings.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSettings {
    /// Lucidchart consumer key.
    pub consumer_key: String,
    /// Lucidchart consumer secret.
    pub consumer_secret: String,
}

impl WidgetSettings {
    /// Create new settings.
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
        }
    }

    /// Both values have been entered.
    pub fn is_complete(&self) -> bool {
        !self.consumer_key.trim().is_empty() && !self.consumer_secret.trim().is_empty()
    }

    /// Consumer credentials for signing.
    pub fn consumer(&self) -> ConsumerCredentials {
        ConsumerCredentials::new(self.consumer_key.trim(), self.consumer_secret.trim())
    }
}

impl std::fmt::Debug for WidgetSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetSettings")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .finish()
    }
}
