use crate::clients::{AltoPage, Clients};
use crate::models::{PageContext, PageFailure, PageFailureReason};
use crate::pages::format_page_number;
use crate::url::PageUrls;

/// Failed pages in a row, with nothing fetched yet, before giving up
pub const MAX_CONSECUTIVE_FAILURES: usize = 3;

/// Pages fetched for one manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFetch {
    pub contexts: Vec<PageContext>,
    pub failures: Vec<PageFailure>,
    pub stopped_early: bool,
}

/// Fetches page texts one at a time, in the order given
///
/// Every page that yields parsed ALTO becomes a [`PageContext`], blank pages
/// included. Any other outcome is a failure: a missing ALTO file (404), an
/// underivable ALTO URL, unrecognized ALTO, or a request that failed after
/// its retries. Once [`MAX_CONSECUTIVE_FAILURES`] pages in a row have failed
/// before any page succeeded, the remaining pages are not requested.
pub async fn fetch_pages(
    clients: &Clients,
    manifest_id: &str,
    page_numbers: &[u32],
    reference_code: &str,
    highlight_term: Option<&str>,
) -> PageFetch {
    let mut fetch = PageFetch::default();
    let mut consecutive_failures = 0usize;

    for &page_number in page_numbers {
        let urls = PageUrls::build(&clients.endpoints, manifest_id, page_number, highlight_term);

        let reason = match &urls.alto {
            None => PageFailureReason::NoAltoUrl,
            Some(alto_url) => match clients.alto.fetch_page(alto_url).await {
                Ok(AltoPage::Text(full_text)) => {
                    consecutive_failures = 0;
                    fetch.contexts.push(PageContext {
                        page_number,
                        page_id: format_page_number(page_number),
                        reference_code: reference_code.to_string(),
                        full_text,
                        alto_url: alto_url.clone(),
                        image_url: urls.image,
                        bildvisning_url: urls.bildvisning,
                    });
                    continue;
                }
                Ok(AltoPage::Missing) => PageFailureReason::Missing,
                Ok(AltoPage::Unrecognized) => PageFailureReason::Unrecognized,
                Err(error) => {
                    tracing::warn!("Skipping page {} of {}: {}", page_number, reference_code, error);
                    PageFailureReason::Error(error.to_string())
                }
            },
        };

        fetch.failures.push(PageFailure {
            page_number,
            reason,
        });

        consecutive_failures += 1;
        if fetch.contexts.is_empty() && consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
            tracing::info!(
                "First {} pages of {} failed; assuming no transcriptions",
                consecutive_failures,
                reference_code
            );
            fetch.stopped_early = true;
            break;
        }
    }

    tracing::debug!(
        "Fetched {} of {} pages for {} ({} failed)",
        fetch.contexts.len(),
        page_numbers.len(),
        reference_code,
        fetch.failures.len()
    );
    fetch
}
