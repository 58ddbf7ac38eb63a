//! Issue Widget
//!
//! Host-facing capability that attaches Lucidchart diagrams to issues. The
//! host forwards lifecycle and route requests; responses describe what the
//! host should do (redirect, JSON, file download) without any rendering.

pub mod app;
pub mod routes;

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use url::Url;

use crate::error::{LucidchartError, RouteError};

pub use app::{LucidchartWidget, WidgetStores};
pub use routes::{WidgetRoute, APP_ROUTE_PREFIX};

/// Host redirect to the widget's settings page.
pub const CONFIGURE_REDIRECT: &str = "~/configure";

/// Host redirect to the application root.
pub const HOME_REDIRECT: &str = "~/";

/// Lifecycle hooks the host calls on a widget.
#[async_trait]
pub trait WidgetApp: Send + Sync {
    /// Load persisted settings at startup.
    async fn load_config(&self) -> Result<(), LucidchartError>;

    /// Handle a routed request.
    async fn on_request(&self, request: WidgetRequest) -> Result<WidgetResponse, LucidchartError>;
}

/// A request routed to the widget by the host.
#[derive(Clone, Debug, Default)]
pub struct WidgetRequest {
    /// Current host user.
    pub user_id: String,
    /// Route path, with or without the `apps/lucidchart/` prefix.
    pub path: String,
    /// Query and form parameters.
    pub params: HashMap<String, String>,
}

impl WidgetRequest {
    /// Create a request without parameters.
    pub fn new(user_id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            path: path.into(),
            params: HashMap::new(),
        }
    }

    /// Create a request from a full host URL.
    pub fn from_url(user_id: impl Into<String>, url: &Url) -> Self {
        Self {
            user_id: user_id.into(),
            path: url.path().to_string(),
            params: url.query_pairs().into_owned().collect(),
        }
    }

    /// Add a parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Parameter by case-insensitive name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Required parameter by case-insensitive name.
    pub fn require_param(&self, name: &str) -> Result<&str, LucidchartError> {
        self.param(name).ok_or_else(|| {
            LucidchartError::Route(RouteError::MissingParameter {
                name: name.to_string(),
            })
        })
    }

    /// Parse the route path.
    pub fn route(&self) -> Result<WidgetRoute, LucidchartError> {
        WidgetRoute::parse(&self.path)
    }
}

/// What the host should do in response to a widget request.
#[derive(Clone, Debug, PartialEq)]
pub enum WidgetResponse {
    /// Redirect the browser. `~/` denotes the host application root.
    Redirect(String),
    /// JSON body.
    Json(serde_json::Value),
    /// File download.
    File {
        content_type: String,
        bytes: Bytes,
    },
    /// Navigate to an issue page.
    IssuePage {
        project_id: u64,
        project_code: String,
        issue_id: u64,
    },
    /// No content.
    Empty,
}

impl WidgetResponse {
    /// Standard JSON success body.
    pub fn success() -> Self {
        Self::Json(serde_json::json!({ "success": true }))
    }

    /// PNG download.
    pub fn png(bytes: impl Into<Bytes>) -> Self {
        Self::File {
            content_type: "image/png".to_string(),
            bytes: bytes.into(),
        }
    }

    /// Redirect target, if this is a redirect.
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Redirect(target) => Some(target),
            _ => None,
        }
    }
}
