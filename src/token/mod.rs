//! Token Management
//!
//! In-memory storage of request and access token secrets.
//!
//! A request token lives here between the first leg of the handshake and the
//! access token exchange; access tokens are seeded back in from persisted user
//! credentials when a resource request needs them.

pub mod manager;

pub use manager::{
    create_mock_token_manager, create_token_manager, InMemoryTokenManager, MockTokenManager,
    TokenManager,
};
