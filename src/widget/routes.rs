//! Widget route table.

use crate::error::{LucidchartError, RouteError};

/// Path prefix under which the host mounts the widget.
pub const APP_ROUTE_PREFIX: &str = "apps/lucidchart/";

/// A parsed widget route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WidgetRoute {
    /// `configure`
    Configure,
    /// `authenticate`
    Authenticate,
    /// `verify`
    Verify,
    /// `newdocument/{project_code}/{project_id}/{issue_id}`
    NewDocument {
        project_code: String,
        project_id: u64,
        issue_id: u64,
    },
    /// `viewdocument/{project_code}/{project_id}/{issue_id}/{document_id}`
    ViewDocument {
        project_code: String,
        project_id: u64,
        issue_id: u64,
        document_id: String,
    },
    /// `editdocument/{project_code}/{project_id}/{issue_id}`
    EditDocument {
        project_code: String,
        project_id: u64,
        issue_id: u64,
    },
    /// `deletedocument`
    DeleteDocument,
    /// `thumbnail/{app_id}/{control_id}/{issue_id}/{document_id}`
    Thumbnail { issue_id: u64, document_id: String },
    /// `image/{app_id}/{control_id}/{issue_id}/{document_id}`
    Image { issue_id: u64, document_id: String },
}

impl WidgetRoute {
    /// Parse a route path. Route names are case-insensitive.
    pub fn parse(path: &str) -> Result<Self, LucidchartError> {
        let trimmed = path.trim_matches('/');
        let relative = strip_prefix_ignore_case(trimmed, APP_ROUTE_PREFIX).unwrap_or(trimmed);
        let segments: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();

        let unknown = || {
            LucidchartError::Route(RouteError::UnknownRoute {
                route: path.to_string(),
            })
        };

        let Some((name, args)) = segments.split_first() else {
            return Err(unknown());
        };

        let route = match (name.to_ascii_lowercase().as_str(), args) {
            ("configure", []) => Self::Configure,
            // Legacy links carry the consumer key and secret as segments.
            ("authenticate", _) => Self::Authenticate,
            ("verify", []) => Self::Verify,
            ("newdocument", [code, project_id, issue_id]) => Self::NewDocument {
                project_code: code.to_string(),
                project_id: parse_id("projectid", project_id)?,
                issue_id: parse_id("issueid", issue_id)?,
            },
            ("viewdocument", [code, project_id, issue_id, document_id]) => Self::ViewDocument {
                project_code: code.to_string(),
                project_id: parse_id("projectid", project_id)?,
                issue_id: parse_id("issueid", issue_id)?,
                document_id: document_id.to_string(),
            },
            ("editdocument", [code, project_id, issue_id]) => Self::EditDocument {
                project_code: code.to_string(),
                project_id: parse_id("projectid", project_id)?,
                issue_id: parse_id("issueid", issue_id)?,
            },
            ("deletedocument", []) => Self::DeleteDocument,
            ("thumbnail", [_app_id, _control_id, issue_id, document_id]) => Self::Thumbnail {
                issue_id: parse_id("issueid", issue_id)?,
                document_id: document_id.to_string(),
            },
            ("image", [_app_id, _control_id, issue_id, document_id]) => Self::Image {
                issue_id: parse_id("issueid", issue_id)?,
                document_id: document_id.to_string(),
            },
            _ => return Err(unknown()),
        };

        Ok(route)
    }

    /// Canonical path of this route relative to the host root.
    pub fn path(&self) -> String {
        let relative = match self {
            Self::Configure => "configure".to_string(),
            Self::Authenticate => "authenticate".to_string(),
            Self::Verify => "verify".to_string(),
            Self::NewDocument {
                project_code,
                project_id,
                issue_id,
            } => format!("newdocument/{project_code}/{project_id}/{issue_id}"),
            Self::ViewDocument {
                project_code,
                project_id,
                issue_id,
                document_id,
            } => format!("viewdocument/{project_code}/{project_id}/{issue_id}/{document_id}"),
            Self::EditDocument {
                project_code,
                project_id,
                issue_id,
            } => format!("editdocument/{project_code}/{project_id}/{issue_id}"),
            Self::DeleteDocument => "deletedocument".to_string(),
            Self::Thumbnail {
                issue_id,
                document_id,
            } => format!("thumbnail/lucidchart/lucidchart/{issue_id}/{document_id}"),
            Self::Image {
                issue_id,
                document_id,
            } => format!("image/lucidchart/lucidchart/{issue_id}/{document_id}"),
        };
        format!("{APP_ROUTE_PREFIX}{relative}")
    }
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &value[prefix.len()..])
}

/// Parse a numeric id parameter.
pub fn parse_id(name: &str, value: &str) -> Result<u64, LucidchartError> {
    value.trim().parse().map_err(|_| {
        LucidchartError::Route(RouteError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
        })
    })
}
