use std::collections::BTreeSet;
use thiserror::Error;

use crate::RaError;

/// Pages returned when no page specification is given
pub const DEFAULT_PAGE_COUNT: u32 = 20;

/// Upper bound assumed when the document length is unknown
pub const DEFAULT_TOTAL_PAGES: u32 = 1000;

/// Errors produced while parsing a page specification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageRangeError {
    #[error("Invalid page specification: {}", tokens.join(", "))]
    Invalid { tokens: Vec<String> },
}

impl From<PageRangeError> for RaError {
    fn from(error: PageRangeError) -> Self {
        RaError::Validation(error.to_string())
    }
}

/// Parses a page specification into a sorted, de-duplicated page list
///
/// The specification is comma-separated; each token is either a single
/// page (`5`) or an inclusive range (`1-3`). Pages are 1-based.
///
/// - No specification, or a blank one, selects the first `min(total_pages, 20)` pages.
/// - Range ends past `total_pages` are clamped; single pages past it are dropped.
/// - Values below 1 and non-numeric tokens are collected as invalid.
/// - Empty tokens are skipped.
///
/// # Arguments
///
/// * `spec` - The page specification, if any
/// * `total_pages` - Highest addressable page number
///
/// # Returns
///
/// * `Ok(pages)` - Sorted page numbers (possibly empty)
/// * `Err(PageRangeError)` - No valid page was found and at least one token was invalid
///
/// # Examples
///
/// ```
/// use ra_transcripts::pages::parse_page_range;
///
/// assert_eq!(parse_page_range(Some("1-3,5"), 10).unwrap(), vec![1, 2, 3, 5]);
/// assert_eq!(parse_page_range(Some("1-100"), 10).unwrap().len(), 10);
/// assert!(parse_page_range(Some("0,-1"), 10).is_err());
/// ```
pub fn parse_page_range(spec: Option<&str>, total_pages: u32) -> Result<Vec<u32>, PageRangeError> {
    let spec = match spec.map(str::trim) {
        Some(spec) if !spec.is_empty() => spec,
        _ => return Ok((1..=total_pages.min(DEFAULT_PAGE_COUNT)).collect()),
    };

    let mut pages = BTreeSet::new();
    let mut invalid = Vec::new();

    for token in spec.split(',').map(str::trim) {
        if token.is_empty() {
            continue;
        }

        match parse_token(token) {
            Some(Token::Range(start, end)) => {
                if start < 1 || end < 1 {
                    invalid.push(token.to_string());
                    continue;
                }
                let end = end.min(i64::from(total_pages));
                for page in start..=end {
                    pages.insert(page as u32);
                }
            }
            Some(Token::Single(page)) => {
                if page < 1 {
                    invalid.push(token.to_string());
                } else if page <= i64::from(total_pages) {
                    pages.insert(page as u32);
                }
            }
            None => invalid.push(token.to_string()),
        }
    }

    if pages.is_empty() && !invalid.is_empty() {
        return Err(PageRangeError::Invalid { tokens: invalid });
    }

    Ok(pages.into_iter().collect())
}

enum Token {
    Single(i64),
    Range(i64, i64),
}

fn parse_token(token: &str) -> Option<Token> {
    match token.split_once('-') {
        Some((start, end)) => {
            let start = start.trim().parse().ok()?;
            let end = end.trim().parse().ok()?;
            Some(Token::Range(start, end))
        }
        None => token.parse().ok().map(Token::Single),
    }
}
