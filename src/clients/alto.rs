//! ALTO page-text retrieval and extraction
//!
//! ALTO files exist in several schema versions. Text lives in the `CONTENT`
//! attribute of `String` elements; the namespace of those elements depends on
//! the version, and some files carry no namespace at all.

use crate::http::HttpClient;
use crate::{RaError, Result};
use thiserror::Error;

/// Known ALTO namespaces, in lookup priority order
pub const ALTO_NAMESPACES: [&str; 3] = [
    "http://www.loc.gov/standards/alto/ns-v4#",
    "http://www.loc.gov/standards/alto/ns-v3#",
    "http://www.loc.gov/standards/alto/ns-v2#",
];

/// Failure to read an ALTO document
#[derive(Debug, Error)]
pub enum AltoError {
    #[error("document is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),
}

/// Extracts the page text from an ALTO document
///
/// Namespaces are tried in priority order (v4, v3, v2); the first one with
/// at least one `String` element wins. Documents without any namespaced
/// `String` element are retried without a namespace.
///
/// # Returns
///
/// * `Ok(Some(text))` - The non-empty `CONTENT` values joined by single spaces;
///   `""` when `String` elements exist but none carries text (blank page)
/// * `Ok(None)` - No `String` element at all (unrecognized schema)
/// * `Err(AltoError)` - The bytes are not well-formed XML
///
/// # Examples
///
/// ```
/// use ra_transcripts::clients::extract_text;
///
/// let xml = br#"<alto xmlns="http://www.loc.gov/standards/alto/ns-v4#">
///     <String CONTENT="a"/><String CONTENT=""/>
/// </alto>"#;
/// assert_eq!(extract_text(xml).unwrap().as_deref(), Some("a"));
/// ```
pub fn extract_text(xml: &[u8]) -> std::result::Result<Option<String>, AltoError> {
    let content = std::str::from_utf8(xml)?;
    let content = content.trim_start_matches('\u{feff}');

    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(content, options)?;

    for namespace in ALTO_NAMESPACES.iter().copied().map(Some).chain([None]) {
        if let Some(text) = collect_strings(&doc, namespace) {
            return Ok(Some(text));
        }
    }

    Ok(None)
}

/// Joins the `CONTENT` of every `String` element in `namespace`, or `None`
/// if there are no such elements
fn collect_strings(doc: &roxmltree::Document, namespace: Option<&str>) -> Option<String> {
    let mut found = false;
    let mut parts = Vec::new();

    for node in doc.descendants().filter(|node| node.is_element()) {
        let tag = node.tag_name();
        if tag.name() != "String" || tag.namespace() != namespace {
            continue;
        }
        found = true;
        if let Some(content) = node.attribute("CONTENT").filter(|c| !c.is_empty()) {
            parts.push(content);
        }
    }

    found.then(|| parts.join(" ").trim().to_string())
}

/// What an ALTO URL yielded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AltoPage {
    /// HTTP 404: the page (or the whole document) has no transcription
    Missing,
    /// Parsed text; empty for a blank page
    Text(String),
    /// Well-formed XML without any `String` element
    Unrecognized,
}

/// Fetches and parses ALTO documents
#[derive(Debug, Clone)]
pub struct AltoClient {
    http: HttpClient,
}

impl AltoClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Fetches one ALTO document and extracts its text
    ///
    /// A 404 is reported as [`AltoPage::Missing`], not as an error. Malformed
    /// XML is an [`RaError::Xml`].
    pub async fn fetch_page(&self, url: &str) -> Result<AltoPage> {
        let body = match self.http.get_optional_xml(url).await? {
            Some(body) => body,
            None => return Ok(AltoPage::Missing),
        };

        match extract_text(&body) {
            Ok(Some(text)) => Ok(AltoPage::Text(text)),
            Ok(None) => {
                tracing::warn!("No ALTO text elements in {}", url);
                Ok(AltoPage::Unrecognized)
            }
            Err(error) => Err(RaError::Xml {
                url: url.to_string(),
                message: error.to_string(),
            }),
        }
    }
}
