//! Core Components
//!
//! Core infrastructure for provider requests.

pub mod nonce;
pub mod transport;

pub use nonce::*;
pub use transport::*;
