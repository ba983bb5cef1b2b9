//! Search operation and result post-processing
//!
//! This module contains:
//! - The [`search`] operation (query, truncate, flatten into page hits)
//! - Grouping of hits by document with per-document counts
//! - Pagination metadata
//! - Context enrichment and neighbouring-page padding

mod enrich;
mod pagination;
mod summary;

pub use enrich::{enrich_hits, expand_with_padding};
pub use pagination::{pagination_info, PaginationInfo};
pub use summary::{summarize, DocumentGroup, SearchSummary};

use tracing::Instrument;

use crate::clients::{record_hits, Clients, SearchQuery};
use crate::models::SearchResult;
use crate::Result;

/// Runs a search and flattens the records into page hits
///
/// Records beyond `query.max` are dropped, and each document keeps at most
/// `query.max_snippets_per_document` page hits.
///
/// # Returns
///
/// * `Ok(SearchResult)` - Hits in upstream order (possibly empty)
/// * `Err(RaError::Validation)` - Unsupported parameter combination (no request made)
/// * `Err(RaError)` - The search API failed after retries or returned malformed JSON
pub async fn search(clients: &Clients, query: &SearchQuery) -> Result<SearchResult> {
    query.validate()?;
    let keyword = query.keyword.clone().unwrap_or_default();
    let span = tracing::info_span!("search", keyword = keyword.as_str(), offset = query.offset);

    run_search(clients, query, keyword).instrument(span).await
}

async fn run_search(clients: &Clients, query: &SearchQuery, keyword: String) -> Result<SearchResult> {
    let response = clients.search.search(query).await?;

    let hits: Vec<_> = response
        .items
        .iter()
        .flat_map(|record| record_hits(record, query.max_snippets_per_document))
        .collect();

    tracing::info!(
        "Search '{}': {} page hits in {} documents ({} total)",
        keyword,
        hits.len(),
        response.items.len(),
        response.total_hits
    );

    Ok(SearchResult {
        documents_returned: response.items.len(),
        hits,
        total_hits: response.total_hits,
        keyword,
        offset: query.offset,
        limit: query.max,
    })
}

/// Transcribed-text search with the common parameters
pub async fn search_transcribed(
    clients: &Clients,
    keyword: &str,
    offset: u32,
    max_results: u32,
    max_snippets_per_document: Option<u32>,
) -> Result<SearchResult> {
    let query = SearchQuery {
        offset,
        max: max_results,
        max_snippets_per_document,
        ..SearchQuery::transcribed(keyword)
    };
    search(clients, &query).await
}

impl SearchResult {
    /// Hits grouped by document
    pub fn summary(&self) -> SearchSummary<'_> {
        summarize(&self.hits)
    }

    /// Pagination metadata for this page
    pub fn pagination(&self) -> PaginationInfo {
        let unique_docs = self.summary().total_documents;
        pagination_info(
            unique_docs,
            self.hits.len(),
            self.total_hits,
            self.offset,
            self.limit,
        )
    }
}
