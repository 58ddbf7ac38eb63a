//! Builders
//!
//! Fluent builder patterns for consumer configuration.

pub mod config;

pub use config::{lucidchart_config, LucidchartConfigBuilder};
