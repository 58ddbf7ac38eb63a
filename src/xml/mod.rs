//! XML parsing utilities for Lucidchart responses.
//!
//! The describe endpoint wraps the document in a root element whose first
//! child carries the fields, e.g.
//!
//! ```xml
//! <response>
//!   <document>
//!     <documentId>abc</documentId>
//!     <title>Flow</title>
//!     <pageCount>2</pageCount>
//!   </document>
//! </response>
//! ```
//!
//! Field names are matched case-insensitively and unknown fields are ignored.

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::error::{malformed, LucidchartError};
use crate::types::DocumentDescription;

/// Depth of the element that holds the document fields.
const DOCUMENT_DEPTH: usize = 2;

/// Parse a `/documents/describe/{id}` response.
pub fn parse_document_description(xml: &str) -> Result<DocumentDescription, LucidchartError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut document = DocumentDescription::default();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut seen_document = false;
    let mut in_document = false;
    let mut current_field: Option<String> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_lowercase();
                match depth {
                    1 => seen_root = true,
                    DOCUMENT_DEPTH if !seen_document => {
                        seen_document = true;
                        in_document = true;
                    }
                    3 if in_document => {
                        current_field = Some(name);
                        text.clear();
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_lowercase();
                match depth + 1 {
                    1 => seen_root = true,
                    DOCUMENT_DEPTH if !seen_document => seen_document = true,
                    3 if in_document => apply_field(&mut document, &name, ""),
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                if current_field.is_some() {
                    let value = e
                        .unescape()
                        .map_err(|err| malformed(format!("invalid XML text: {err}")))?;
                    text.push_str(&value);
                }
            }
            Ok(Event::CData(e)) => {
                if current_field.is_some() {
                    text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::End(_)) => {
                if depth == 3 {
                    if let Some(field) = current_field.take() {
                        apply_field(&mut document, &field, &text);
                    }
                }
                if depth == DOCUMENT_DEPTH {
                    in_document = false;
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(malformed(format!(
                    "invalid XML at position {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    if !seen_root {
        return Err(malformed("document description is empty"));
    }
    if !seen_document {
        return Err(malformed("document description has no document element"));
    }
    if depth != 0 {
        return Err(malformed("document description is truncated"));
    }

    debug!(
        document_id = %document.id,
        page_count = document.page_count,
        "Parsed document description"
    );
    Ok(document)
}

fn apply_field(document: &mut DocumentDescription, name: &str, value: &str) {
    match name {
        "documentid" => document.id = value.to_string(),
        "title" => document.name = value.to_string(),
        "editurl" => document.edit_url = value.to_string(),
        "viewurl" => document.view_url = value.to_string(),
        "version" => document.version = value.to_string(),
        // Unparseable counts read as zero.
        "pagecount" => document.page_count = value.trim().parse().unwrap_or(0),
        _ => {}
    }
}
