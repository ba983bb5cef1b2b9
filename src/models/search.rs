use serde::Serialize;

/// One page hit inside one document
///
/// Produced from a single snippet/page pair of a search response. After
/// creation only the URL and `full_text` fields are filled in (by context
/// enrichment).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// Record identifier (PID) of the document
    pub document_id: String,
    pub title: String,
    /// Empty when the record carries no reference code
    pub reference_code: String,
    pub page_number: u32,
    /// Upstream page identifier with leading underscores removed
    pub page_id: String,
    /// Snippet text with HTML tags stripped
    pub snippet_text: String,
    pub score: f64,
    pub date: Option<String>,
    pub institution: Option<String>,
    pub hierarchy: Vec<String>,
    pub note: Option<String>,
    /// Total hits the upstream index reports for this document
    pub document_total_hits: Option<u32>,

    pub alto_url: Option<String>,
    pub image_url: Option<String>,
    pub bildvisning_url: Option<String>,
    /// Page text, present only after enrichment
    pub full_text: Option<String>,

    /// Neighbouring page added for context rather than matched by the query
    pub is_context: bool,
}

impl SearchHit {
    /// Key used to group hits by document: reference code, or the record id
    /// when the reference code is missing
    pub fn document_key(&self) -> &str {
        if self.reference_code.is_empty() {
            &self.document_id
        } else {
            &self.reference_code
        }
    }

    /// Placeholder hit for a neighbouring page of `self`'s document
    pub fn context_page(&self, page_number: u32) -> Self {
        Self {
            page_number,
            page_id: crate::pages::format_page_number(page_number),
            snippet_text: String::new(),
            score: 0.0,
            alto_url: None,
            image_url: None,
            bildvisning_url: None,
            full_text: None,
            is_context: true,
            ..self.clone()
        }
    }
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub hits: Vec<SearchHit>,
    /// Documents matching the query upstream
    pub total_hits: u64,
    pub keyword: String,
    pub offset: u32,
    pub limit: u32,
    /// Documents the upstream API returned for this page, after truncation
    pub documents_returned: usize,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
