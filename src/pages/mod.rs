//! Page numbering: range specifications and page identifiers

mod range;

pub use range::{parse_page_range, PageRangeError, DEFAULT_PAGE_COUNT, DEFAULT_TOTAL_PAGES};

/// Zero-pads a page number to the five digits used in upstream file names
pub fn format_page_number(page: u32) -> String {
    format!("{:05}", page)
}

/// Builds the page identifier `{id}_{page:05}` used by the search API
pub fn page_id(manifest_id: &str, page: u32) -> String {
    format!("{}_{}", manifest_id, format_page_number(page))
}

/// Extracts the page number from a page identifier
///
/// The number is the segment after the last underscore, with leading
/// zeros removed (`R0001213_00066` is page 66).
///
/// # Examples
///
/// ```
/// use ra_transcripts::pages::page_id_to_number;
///
/// assert_eq!(page_id_to_number("R0001213_00066"), Some(66));
/// assert_eq!(page_id_to_number("_00001"), Some(1));
/// assert_eq!(page_id_to_number("no-number"), None);
/// ```
pub fn page_id_to_number(page_id: &str) -> Option<u32> {
    let last = page_id.rsplit('_').next()?;
    let digits = last.trim_start_matches('0');
    if digits.is_empty() {
        // all zeros ("00000") or empty
        return if last.is_empty() { None } else { Some(0) };
    }
    digits.parse().ok()
}
