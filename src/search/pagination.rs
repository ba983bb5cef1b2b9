/// Pagination metadata for one page of search results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationInfo {
    pub has_more: bool,
    pub next_offset: Option<u32>,
    /// 1-based index of the first document on this page
    pub range_start: u32,
    /// 1-based index of the last document on this page
    pub range_end: u32,
}

/// Computes pagination metadata
///
/// A page is considered full when it holds `limit` documents or `limit`
/// page hits; more results exist when the page is full and the upstream
/// total exceeds the hits returned.
///
/// Counting hits as well as documents is what makes a page of 45 documents
/// carrying 50 hits at limit 50 report more results.
///
/// # Arguments
///
/// * `unique_docs` - Distinct documents on this page
/// * `hits_returned` - Page hits on this page
/// * `total_hits` - Upstream total
/// * `offset` - Offset the page was requested with
/// * `limit` - Documents requested per page
pub fn pagination_info(
    unique_docs: usize,
    hits_returned: usize,
    total_hits: u64,
    offset: u32,
    limit: u32,
) -> PaginationInfo {
    let limit_usize = limit as usize;
    let page_full = limit > 0 && (unique_docs >= limit_usize || hits_returned >= limit_usize);
    let has_more = page_full && total_hits > hits_returned as u64;

    let range_start = match limit {
        0 => offset.saturating_add(1),
        _ => ((offset / limit) * limit).saturating_add(1),
    };
    let docs = u32::try_from(unique_docs).unwrap_or(u32::MAX);
    let range_end = match docs {
        0 => range_start - 1,
        _ => range_start.saturating_add(docs - 1),
    };

    PaginationInfo {
        has_more,
        next_offset: has_more.then(|| offset.saturating_add(limit)),
        range_start,
        range_end,
    }
}
