use serde::Serialize;

use super::DocumentMetadata;

/// Transcribed text of one digitized page
///
/// `full_text == ""` is a digitized but blank page. A page that is not
/// digitized never gets a `PageContext`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageContext {
    pub page_number: u32,
    pub page_id: String,
    pub reference_code: String,
    pub full_text: String,
    pub alto_url: String,
    pub image_url: Option<String>,
    pub bildvisning_url: Option<String>,
}

impl PageContext {
    pub fn is_blank(&self) -> bool {
        self.full_text.trim().is_empty()
    }
}

/// Why a requested page produced no context
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PageFailureReason {
    /// ALTO returned 404
    Missing,
    /// No ALTO URL could be derived from the manifest id
    NoAltoUrl,
    /// ALTO existed but had no recognizable text elements
    Unrecognized,
    /// Transport or parse error
    Error(String),
}

/// A requested page that was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFailure {
    pub page_number: u32,
    pub reason: PageFailureReason,
}

/// Outcome of one browse call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrowseResult {
    pub contexts: Vec<PageContext>,
    pub reference_code: String,
    /// Page specification as given by the caller (empty for the default)
    pub pages_requested: String,
    /// Page numbers selected for fetching, after the page cap
    pub page_numbers: Vec<u32>,
    /// `None` for material that is not digitized
    pub manifest_id: Option<String>,
    pub metadata: Option<DocumentMetadata>,
    pub failures: Vec<PageFailure>,
    /// Fetching stopped after consecutive failed pages with no success
    pub stopped_early: bool,
}

impl BrowseResult {
    pub fn is_digitized(&self) -> bool {
        self.manifest_id.is_some()
    }

    /// Requested pages not fetched because of the early stop
    pub fn pages_not_attempted(&self) -> usize {
        self.page_numbers
            .len()
            .saturating_sub(self.contexts.len() + self.failures.len())
    }

    pub fn blank_pages(&self) -> usize {
        self.contexts.iter().filter(|c| c.is_blank()).count()
    }
}
