//! OAI-PMH `GetRecord` client with EAD metadata extraction

use roxmltree::{Document, Node};

use crate::http::HttpClient;
use crate::models::DocumentMetadata;
use crate::url::{last_path_segment, manifest_id_from_url};
use crate::{RaError, Result};

pub const OAI_NS: &str = "http://www.openarchives.org/OAI/2.0/";
pub const EAD_NS: &str = "urn:isbn:1-931666-22-9";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Metadata format requested from the repository
pub const METADATA_PREFIX: &str = "oai_ape_ead";

/// OAI-PMH error code for unknown identifiers
pub const ID_DOES_NOT_EXIST: &str = "idDoesNotExist";

/// Header fields plus EAD metadata of one record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OaiRecord {
    pub identifier: String,
    pub datestamp: Option<String>,
    pub metadata: DocumentMetadata,
}

impl OaiRecord {
    /// Manifest identifier for IIIF/ALTO access
    ///
    /// Prefers the `MANIFEST` link; falls back to the last path segment of
    /// the viewer link.
    pub fn manifest_id(&self) -> Option<String> {
        if let Some(id) = self
            .metadata
            .iiif_manifest
            .as_deref()
            .and_then(manifest_id_from_url)
        {
            return Some(id);
        }
        self.metadata
            .nad_link
            .as_deref()
            .and_then(last_path_segment)
            .map(str::to_string)
    }
}

fn ead<'a>(name: &'a str) -> (&'static str, &'a str) {
    (EAD_NS, name)
}

/// Concatenated, whitespace-normalized text of a node and its descendants
fn node_text(node: Node) -> Option<String> {
    let text: Vec<&str> = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .flat_map(str::split_whitespace)
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text.join(" "))
    }
}

fn find_text(root: Node, name: (&str, &str)) -> Option<String> {
    root.descendants()
        .find(|n| n.has_tag_name(name))
        .and_then(node_text)
}

fn dao_link(ead_root: Node, role: &str) -> Option<String> {
    ead_root
        .descendants()
        .filter(|n| n.has_tag_name(ead("dao")))
        .find(|n| n.attribute((XLINK_NS, "role")) == Some(role))
        .and_then(|n| n.attribute((XLINK_NS, "href")))
        .map(str::to_string)
}

/// Parses a `GetRecord` response
///
/// # Returns
///
/// * `Ok(record)` - The first record with its EAD fields
/// * `Err(RaError::OaiPmh)` - The response carries an OAI-PMH `error` element
/// * `Err(RaError::Xml)` - Malformed XML or no record element
pub fn parse_record(xml: &[u8], url: &str) -> Result<OaiRecord> {
    let xml_error = |message: String| RaError::Xml {
        url: url.to_string(),
        message,
    };

    let content = std::str::from_utf8(xml).map_err(|e| xml_error(e.to_string()))?;
    let doc = Document::parse(content.trim_start_matches('\u{feff}'))
        .map_err(|e| xml_error(e.to_string()))?;

    if let Some(error) = doc
        .descendants()
        .find(|n| n.has_tag_name((OAI_NS, "error")))
    {
        return Err(RaError::OaiPmh {
            code: error.attribute("code").unwrap_or("unknown").to_string(),
            message: node_text(error).unwrap_or_else(|| "No error message".to_string()),
        });
    }

    let record = doc
        .descendants()
        .find(|n| n.has_tag_name((OAI_NS, "record")))
        .ok_or_else(|| xml_error("No record found in OAI-PMH response".to_string()))?;

    let header = record
        .children()
        .find(|n| n.has_tag_name((OAI_NS, "header")));
    let identifier = header
        .and_then(|h| find_text(h, (OAI_NS, "identifier")))
        .unwrap_or_default();
    let datestamp = header.and_then(|h| find_text(h, (OAI_NS, "datestamp")));

    let mut metadata = DocumentMetadata {
        identifier: Some(identifier.clone()).filter(|id| !id.is_empty()),
        datestamp: datestamp.clone(),
        ..DocumentMetadata::default()
    };

    if let Some(ead_root) = record.descendants().find(|n| n.has_tag_name(ead("ead"))) {
        metadata.title = find_text(ead_root, ead("unittitle"));
        metadata.unitid = find_text(ead_root, ead("unitid"));
        metadata.date = find_text(ead_root, ead("unitdate"));
        metadata.repository = find_text(ead_root, ead("repository"));
        metadata.description = ead_root
            .descendants()
            .find(|n| n.has_tag_name(ead("scopecontent")))
            .and_then(|scope| {
                let paragraphs: Vec<String> = scope
                    .descendants()
                    .filter(|n| n.has_tag_name(ead("p")))
                    .filter_map(node_text)
                    .collect();
                if paragraphs.is_empty() {
                    None
                } else {
                    Some(paragraphs.join(" "))
                }
            });
        metadata.iiif_manifest = dao_link(ead_root, "MANIFEST");
        metadata.iiif_image = dao_link(ead_root, "IMAGE");
        metadata.nad_link = dao_link(ead_root, "TEXT").or_else(|| {
            ead_root
                .descendants()
                .find(|n| n.has_tag_name(ead("dao")))
                .and_then(|n| n.attribute((XLINK_NS, "href")))
                .map(str::to_string)
        });
    }

    Ok(OaiRecord {
        identifier,
        datestamp,
        metadata,
    })
}

/// Client for the OAI-PMH endpoint
#[derive(Debug, Clone)]
pub struct OaiPmhClient {
    http: HttpClient,
    base_url: String,
}

impl OaiPmhClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetches one record by identifier (a reference code)
    pub async fn get_record(&self, identifier: &str) -> Result<OaiRecord> {
        let params = [
            ("verb", "GetRecord".to_string()),
            ("identifier", identifier.to_string()),
            ("metadataPrefix", METADATA_PREFIX.to_string()),
        ];

        let body = self.http.get_xml(&self.base_url, &params).await?;
        let record = parse_record(&body, &self.base_url)?;
        tracing::debug!(
            "OAI-PMH record {} (manifest: {:?})",
            record.identifier,
            record.manifest_id()
        );
        Ok(record)
    }
}
