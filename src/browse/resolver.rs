//! Reference code to manifest identifier resolution
//!
//! Resolution walks an ordered fallback chain:
//! 1. Search API record with the exact reference code (manifest link, or the
//!    first manifest of the record's IIIF collection)
//! 2. OAI-PMH EAD record (manifest link, or the viewer link)
//! 3. Otherwise the document is not digitized; metadata is still returned

use crate::clients::{Clients, Record, ID_DOES_NOT_EXIST};
use crate::models::DocumentMetadata;
use crate::url::manifest_id_from_url;
use crate::{RaError, Result};

/// Outcome of resolving a reference code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Pages can be fetched with this manifest id
    Digitized {
        manifest_id: String,
        metadata: Option<DocumentMetadata>,
    },
    /// The document exists but has no images or transcriptions
    NotDigitized { metadata: DocumentMetadata },
    /// Neither service knows the reference code
    NotFound,
}

impl Resolution {
    pub fn manifest_id(&self) -> Option<&str> {
        match self {
            Self::Digitized { manifest_id, .. } => Some(manifest_id),
            _ => None,
        }
    }
}

/// Metadata carried by a search record
fn record_metadata(record: &Record) -> DocumentMetadata {
    let meta = &record.metadata;
    DocumentMetadata {
        identifier: Some(record.id.clone()).filter(|id| !id.is_empty()),
        title: record.caption.clone(),
        unitid: meta.reference_code.clone(),
        date: meta.date.clone(),
        repository: meta
            .archival_institution
            .first()
            .map(|i| i.caption.clone())
            .filter(|c| !c.is_empty()),
        description: None,
        hierarchy: meta.hierarchy.iter().map(|h| h.caption.clone()).collect(),
        note: meta.note.clone(),
        datestamp: None,
        iiif_manifest: record.manifest_link().map(str::to_string),
        iiif_image: None,
        nad_link: record.links.as_ref().and_then(|l| l.html.clone()),
    }
}

/// Fills fields missing from `primary` with values from `fallback`
fn merge_metadata(mut primary: DocumentMetadata, fallback: DocumentMetadata) -> DocumentMetadata {
    macro_rules! fill {
        ($($field:ident),*) => {
            $(if primary.$field.is_none() { primary.$field = fallback.$field; })*
        };
    }
    fill!(
        identifier,
        title,
        unitid,
        date,
        repository,
        description,
        note,
        datestamp,
        iiif_manifest,
        iiif_image,
        nad_link
    );
    if primary.hierarchy.is_empty() {
        primary.hierarchy = fallback.hierarchy;
    }
    primary
}

/// Step 1: search API lookup
///
/// Returns the record's metadata, and its manifest id when one is found.
async fn resolve_via_search(
    clients: &Clients,
    reference_code: &str,
) -> Result<Option<(DocumentMetadata, Option<String>)>> {
    let Some(record) = clients.search.find_by_reference_code(reference_code).await? else {
        return Ok(None);
    };
    let metadata = record_metadata(&record);

    if let Some(id) = record.manifest_link().and_then(manifest_id_from_url) {
        return Ok(Some((metadata, Some(id))));
    }

    let manifest_id = match clients.iiif.first_manifest_id(&record.id).await {
        Ok(id) => id,
        Err(error) => {
            tracing::warn!("IIIF lookup for {} failed: {}", record.id, error);
            None
        }
    };
    Ok(Some((metadata, manifest_id)))
}

fn is_unknown_identifier(error: &RaError) -> bool {
    match error {
        RaError::OaiPmh { code, .. } => code == ID_DOES_NOT_EXIST,
        RaError::Status { status, .. } => *status == 404,
        _ => false,
    }
}

/// Resolves a reference code to a manifest identifier
///
/// # Returns
///
/// * `Ok(Resolution::Digitized)` - A manifest id was found
/// * `Ok(Resolution::NotDigitized)` - Metadata exists but no manifest
/// * `Ok(Resolution::NotFound)` - Nothing is known about the reference code
/// * `Err(RaError)` - The OAI-PMH lookup failed and the search API gave nothing
pub async fn resolve_manifest_id(clients: &Clients, reference_code: &str) -> Result<Resolution> {
    let search_metadata = match resolve_via_search(clients, reference_code).await {
        Ok(Some((metadata, Some(manifest_id)))) => {
            tracing::debug!("Resolved {} via search API: {}", reference_code, manifest_id);
            return Ok(Resolution::Digitized {
                manifest_id,
                metadata: Some(metadata),
            });
        }
        Ok(Some((metadata, None))) => Some(metadata),
        Ok(None) => None,
        Err(error) => {
            tracing::warn!(
                "Search API lookup for {} failed, trying OAI-PMH: {}",
                reference_code,
                error
            );
            None
        }
    };

    let record = match clients.oai.get_record(reference_code).await {
        Ok(record) => record,
        Err(error) => {
            return match search_metadata {
                Some(metadata) => {
                    tracing::warn!("OAI-PMH lookup for {} failed: {}", reference_code, error);
                    Ok(Resolution::NotDigitized { metadata })
                }
                None if is_unknown_identifier(&error) => Ok(Resolution::NotFound),
                None => Err(error),
            };
        }
    };

    let manifest_id = record.manifest_id();
    let metadata = match search_metadata {
        Some(fallback) => merge_metadata(record.metadata, fallback),
        None => record.metadata,
    };

    Ok(match manifest_id {
        Some(manifest_id) => {
            tracing::debug!("Resolved {} via OAI-PMH: {}", reference_code, manifest_id);
            Resolution::Digitized {
                manifest_id,
                metadata: Some(metadata),
            }
        }
        None => {
            tracing::info!("{} has no manifest; treating as not digitized", reference_code);
            Resolution::NotDigitized { metadata }
        }
    })
}
