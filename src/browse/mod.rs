//! Browse operation: full page transcriptions for one document
//!
//! This module contains:
//! - The identifier resolver (reference code to manifest id)
//! - The sequential page fetcher with its early-exit rule
//! - The [`browse`] operation tying them together

mod fetcher;
mod resolver;

pub use fetcher::{fetch_pages, PageFetch, MAX_CONSECUTIVE_FAILURES};
pub use resolver::{resolve_manifest_id, Resolution};

use tracing::Instrument;

use crate::clients::Clients;
use crate::config::BrowseConfig;
use crate::models::BrowseResult;
use crate::pages::{parse_page_range, DEFAULT_TOTAL_PAGES};
use crate::{RaError, Result};

/// Parameters of one browse call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseRequest {
    pub reference_code: String,
    /// Page specification (`"1-3,5"`); `None` or a blank one selects the first pages
    pub pages: Option<String>,
    /// Search term carried into viewer links
    pub highlight_term: Option<String>,
    /// Upper bound on pages fetched
    pub max_pages: usize,
    /// Highest addressable page number
    pub total_pages: u32,
}

impl BrowseRequest {
    pub fn new(reference_code: impl Into<String>) -> Self {
        Self {
            reference_code: reference_code.into(),
            pages: None,
            highlight_term: None,
            max_pages: 20,
            total_pages: DEFAULT_TOTAL_PAGES,
        }
    }

    pub fn with_pages(mut self, pages: impl Into<String>) -> Self {
        self.pages = Some(pages.into());
        self
    }

    pub fn with_highlight(mut self, term: impl Into<String>) -> Self {
        self.highlight_term = Some(term.into());
        self
    }

    /// Applies the configured page cap and page-number bound
    pub fn with_config(mut self, config: &BrowseConfig) -> Self {
        self.max_pages = config.max_pages;
        self.total_pages = config.max_page_number;
        self
    }

    /// Checks the request and selects the page numbers, before any I/O
    pub fn page_numbers(&self) -> Result<Vec<u32>> {
        if self.reference_code.trim().is_empty() {
            return Err(RaError::Validation("Reference code is empty".to_string()));
        }
        if self.max_pages == 0 {
            return Err(RaError::Validation("max_pages must be at least 1".to_string()));
        }

        let mut pages = parse_page_range(self.pages.as_deref(), self.total_pages)?;
        pages.truncate(self.max_pages);
        Ok(pages)
    }
}

/// Retrieves page transcriptions for one document
///
/// # Returns
///
/// * `Ok(result)` with contexts - Digitized document; pages that could not
///   be fetched are listed in `failures`
/// * `Ok(result)` without contexts and with `manifest_id == None` - The
///   document is not digitized; `metadata` describes it
/// * `Err(RaError::Validation)` - Bad page specification (no request made)
/// * `Err(RaError::DocumentNotFound)` - Nothing is known about the reference code
pub async fn browse(clients: &Clients, request: &BrowseRequest) -> Result<BrowseResult> {
    let page_numbers = request.page_numbers()?;
    let span = tracing::info_span!(
        "browse",
        reference_code = request.reference_code.trim(),
        pages = page_numbers.len()
    );

    browse_pages(clients, request, page_numbers)
        .instrument(span)
        .await
}

async fn browse_pages(
    clients: &Clients,
    request: &BrowseRequest,
    page_numbers: Vec<u32>,
) -> Result<BrowseResult> {
    let reference_code = request.reference_code.trim();
    let resolution = resolve_manifest_id(clients, reference_code).await?;

    let mut result = BrowseResult {
        contexts: Vec::new(),
        reference_code: reference_code.to_string(),
        pages_requested: request.pages.clone().unwrap_or_default(),
        page_numbers,
        manifest_id: None,
        metadata: None,
        failures: Vec::new(),
        stopped_early: false,
    };

    match resolution {
        Resolution::NotFound => {
            return Err(RaError::DocumentNotFound {
                reference_code: reference_code.to_string(),
            })
        }
        Resolution::NotDigitized { metadata } => {
            result.metadata = Some(metadata);
        }
        Resolution::Digitized {
            manifest_id,
            metadata,
        } => {
            let span = tracing::debug_span!(
                "fetch_pages",
                manifest_id = manifest_id.as_str(),
                pages = result.page_numbers.len()
            );
            let fetch = fetch_pages(
                clients,
                &manifest_id,
                &result.page_numbers,
                reference_code,
                request.highlight_term.as_deref(),
            )
            .instrument(span)
            .await;

            result.contexts = fetch.contexts;
            result.failures = fetch.failures;
            result.stopped_early = fetch.stopped_early;
            result.manifest_id = Some(manifest_id);
            result.metadata = metadata;
        }
    }

    tracing::info!(
        "Browse {}: {} pages returned, {} skipped",
        reference_code,
        result.contexts.len(),
        result.failures.len()
    );
    Ok(result)
}
