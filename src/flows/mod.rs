//! Authorization Flows
//!
//! OAuth 1.0a three-legged authorization against the Lucidchart provider.

pub mod authorization;

pub use authorization::{
    create_mock_authorization_flow, AuthorizationFlow, AuthorizationFlowImpl,
    MockAuthorizationFlow,
};
