//! Nonce Source
//!
//! Nonce and timestamp generation for request signing.

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::Mutex;

/// Nonce/timestamp source interface (for dependency injection).
pub trait NonceSource: Send + Sync {
    /// Generate a fresh single-use nonce.
    fn nonce(&self) -> String;

    /// Current time in seconds since the Unix epoch.
    fn timestamp(&self) -> i64;
}

/// Random nonces and wall-clock timestamps.
pub struct DefaultNonceSource {
    length: usize,
}

impl DefaultNonceSource {
    /// Create nonce source with the default nonce length (32).
    pub fn new() -> Self {
        Self::with_length(32)
    }

    /// Create nonce source with a custom nonce length.
    ///
    /// # Panics
    /// Panics if length is below 8.
    pub fn with_length(length: usize) -> Self {
        assert!(length >= 8, "nonce length must be at least 8");
        Self { length }
    }
}

impl Default for DefaultNonceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl NonceSource for DefaultNonceSource {
    fn nonce(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }

    fn timestamp(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Fixed nonce source for testing.
pub struct MockNonceSource {
    nonce: Mutex<String>,
    timestamp: Mutex<i64>,
    issued: Mutex<u32>,
}

impl MockNonceSource {
    /// Create mock nonce source returning the given values.
    pub fn new(nonce: impl Into<String>, timestamp: i64) -> Self {
        Self {
            nonce: Mutex::new(nonce.into()),
            timestamp: Mutex::new(timestamp),
            issued: Mutex::new(0),
        }
    }

    /// Change the nonce returned from now on.
    pub fn set_nonce(&self, nonce: impl Into<String>) -> &Self {
        *self.nonce.lock().unwrap() = nonce.into();
        self
    }

    /// Change the timestamp returned from now on.
    pub fn set_timestamp(&self, timestamp: i64) -> &Self {
        *self.timestamp.lock().unwrap() = timestamp;
        self
    }

    /// Number of nonces handed out.
    pub fn issued(&self) -> u32 {
        *self.issued.lock().unwrap()
    }
}

impl Default for MockNonceSource {
    fn default() -> Self {
        Self::new("mock-nonce", 1_191_242_096)
    }
}

impl NonceSource for MockNonceSource {
    fn nonce(&self) -> String {
        *self.issued.lock().unwrap() += 1;
        self.nonce.lock().unwrap().clone()
    }

    fn timestamp(&self) -> i64 {
        *self.timestamp.lock().unwrap()
    }
}
