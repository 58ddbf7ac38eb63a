//! Lucidchart Types
//!
//! Core type definitions for the OAuth 1.0a consumer and document API.

pub mod callback;
pub mod config;
pub mod document;
pub mod settings;
pub mod token;

pub use callback::*;
pub use config::*;
pub use document::*;
pub use settings::*;
pub use token::*;
