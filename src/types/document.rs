//! Document Types
//!
//! Lucidchart document metadata, image requests and issue attachments.

use serde::{Deserialize, Serialize};

/// Document metadata returned by `/documents/describe/{id}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDescription {
    /// Document identifier (`documentid`).
    pub id: String,
    /// Document title (`title`).
    pub name: String,
    /// Editor URL (`editurl`).
    pub edit_url: String,
    /// Viewer URL (`viewurl`).
    pub view_url: String,
    /// Document version (`version`).
    pub version: String,
    /// Number of pages (`pagecount`).
    pub page_count: u32,
}

/// Rendered page request for `/documents/image/...`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRequest {
    /// Document identifier.
    pub document_id: String,
    /// Zero-based page index.
    pub page: u32,
    /// Image width in pixels.
    pub width: u32,
    /// Crop to a square.
    pub square: bool,
}

impl ImageRequest {
    /// Width of the full-size image stored with an attachment.
    pub const PREVIEW_WIDTH: u32 = 500;
    /// Width of the square thumbnail stored with an attachment.
    pub const THUMBNAIL_WIDTH: u32 = 128;

    /// First page at preview size.
    pub fn preview(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            page: 0,
            width: Self::PREVIEW_WIDTH,
            square: false,
        }
    }

    /// First page as a square thumbnail.
    pub fn thumbnail(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            page: 0,
            width: Self::THUMBNAIL_WIDTH,
            square: true,
        }
    }
}

/// A diagram attached to an issue.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Lucidchart document identifier.
    pub document_id: String,
    /// Document title at the time it was saved.
    pub name: String,
    /// Preview image (PNG).
    pub image_bytes: Vec<u8>,
    /// Thumbnail image (PNG).
    pub thumbnail_bytes: Vec<u8>,
}

impl Attachment {
    /// Document ids compare case-insensitively.
    pub fn matches(&self, document_id: &str) -> bool {
        self.document_id.eq_ignore_ascii_case(document_id)
    }
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("document_id", &self.document_id)
            .field("name", &self.name)
            .field("image_bytes", &self.image_bytes.len())
            .field("thumbnail_bytes", &self.thumbnail_bytes.len())
            .finish()
    }
}

/// Insert or refresh an attachment, keyed by case-insensitive document id.
pub fn upsert_attachment(attachments: &mut Vec<Attachment>, attachment: Attachment) {
    match attachments
        .iter_mut()
        .find(|existing| existing.matches(&attachment.document_id))
    {
        Some(existing) => {
            existing.name = attachment.name;
            existing.image_bytes = attachment.image_bytes;
            existing.thumbnail_bytes = attachment.thumbnail_bytes;
        }
        None => attachments.push(attachment),
    }
}

/// Remove every attachment for `document_id`. Returns how many were removed.
pub fn remove_attachments(attachments: &mut Vec<Attachment>, document_id: &str) -> usize {
    let before = attachments.len();
    attachments.retain(|attachment| !attachment.matches(document_id));
    before - attachments.len()
}
