//! Plain-text rendering of browse and search plans

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

use crate::config::EndpointConfig;
use crate::models::{DocumentMetadata, PageContext};
use crate::search::PaginationInfo;
use crate::session::{BrowsePlan, PageEntry, SearchPlan};
use crate::url::bildvisaren_url;

/// Characters per token used for the response size estimate
pub const CHARS_PER_TOKEN: usize = 4;

/// Appended when output is cut to the token budget
pub const TRUNCATION_NOTICE: &str = "\n\n[Response truncated due to size limits]";

pub const NOT_DIGITISED_NOTICE: &str =
    "⚠️ This material is not digitised or transcribed - no page images or text available.";

static EXISTING_HIGHLIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*[^*]+\*\*").expect("valid highlight regex"));

/// Wraps case-insensitive occurrences of `keyword` in `**`
///
/// Text that already carries `**` markers (as upstream snippets do) is
/// returned unchanged.
///
/// # Examples
///
/// ```
/// use ra_transcripts::output::highlight_keyword;
///
/// assert_eq!(highlight_keyword("Stockholm och stockholm", "STOCKHOLM"),
///            "**Stockholm** och **stockholm**");
/// assert_eq!(highlight_keyword("redan **markerad**", "redan"), "redan **markerad**");
/// ```
pub fn highlight_keyword(text: &str, keyword: &str) -> String {
    let keyword = keyword.trim();
    if keyword.is_empty() || EXISTING_HIGHLIGHT_RE.is_match(text) {
        return text.to_string();
    }

    match RegexBuilder::new(&regex::escape(keyword))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re.replace_all(text, "**${0}**").into_owned(),
        Err(error) => {
            tracing::debug!("Cannot highlight '{}': {}", keyword, error);
            text.to_string()
        }
    }
}

/// Cuts `text` to roughly `max_tokens` tokens
///
/// The estimate is one token per [`CHARS_PER_TOKEN`] characters. Text over
/// budget keeps its first `max_tokens * CHARS_PER_TOKEN` characters followed
/// by [`TRUNCATION_NOTICE`].
pub fn truncate_to_token_budget(text: &str, max_tokens: usize) -> String {
    let chars = text.chars().count();
    if chars / CHARS_PER_TOKEN <= max_tokens {
        return text.to_string();
    }

    let mut truncated: String = text.chars().take(max_tokens * CHARS_PER_TOKEN).collect();
    truncated.push_str(TRUNCATION_NOTICE);
    truncated
}

fn push_metadata(out: &mut String, metadata: &DocumentMetadata) {
    for (label, value) in metadata.display_fields() {
        out.push_str(&format!("   {}: {}\n", label, value));
    }
    if !metadata.hierarchy.is_empty() {
        out.push_str(&format!("   Hierarchy: {}\n", metadata.hierarchy.join(" > ")));
    }
}

fn push_page(out: &mut String, context: &PageContext, highlight: Option<&str>) {
    out.push_str(&format!("📄 Page {}\n", context.page_number));
    if context.is_blank() {
        out.push_str("   (blank page)\n");
    } else {
        let text = match highlight {
            Some(term) => highlight_keyword(&context.full_text, term),
            None => context.full_text.clone(),
        };
        out.push_str(&format!("{}\n", text));
    }
    out.push_str(&format!("   ALTO: {}\n", context.alto_url));
    if let Some(image) = &context.image_url {
        out.push_str(&format!("   Image: {}\n", image));
    }
    if let Some(viewer) = &context.bildvisning_url {
        out.push_str(&format!("   Viewer: {}\n", viewer));
    }
    out.push('\n');
}

/// Renders a browse plan
pub fn render_browse(plan: &BrowsePlan<'_>, highlight: Option<&str>, endpoints: &EndpointConfig) -> String {
    let result = plan.result;
    let mut out = String::new();

    out.push_str(&format!("📚 {}\n", result.reference_code));
    if let Some(metadata) = &result.metadata {
        push_metadata(&mut out, metadata);
        if let Some(viewer) = metadata
            .iiif_manifest
            .as_deref()
            .and_then(|manifest| bildvisaren_url(endpoints, manifest))
        {
            out.push_str(&format!("   Bildvisaren: {}\n", viewer));
        }
    }
    out.push('\n');

    if !result.is_digitized() {
        out.push_str(NOT_DIGITISED_NOTICE);
        out.push('\n');
        return out;
    }

    if result.contexts.is_empty() {
        out.push_str("No page text found for the requested pages");
        if result.stopped_early {
            out.push_str(" (stopped after the first pages had no transcription)");
        }
        out.push_str(".\n");
        return out;
    }

    for entry in &plan.entries {
        match entry {
            PageEntry::Full(context) => push_page(&mut out, context, highlight),
            PageEntry::Stub { page_number } => out.push_str(&format!(
                "📄 Page {} (previously shown in this session)\n\n",
                page_number
            )),
        }
    }

    let previously_shown = plan.previously_shown();
    if previously_shown > 0 {
        out.push_str(&format!(
            "Pages loaded: {} ({} new, {} previously shown)\n",
            plan.entries.len(),
            plan.new_pages(),
            previously_shown
        ));
    } else {
        out.push_str(&format!("Pages loaded: {}\n", plan.entries.len()));
    }

    if !result.failures.is_empty() {
        out.push_str(&format!("Pages skipped: {}\n", result.failures.len()));
    }
    let not_attempted = result.pages_not_attempted();
    if result.stopped_early && not_attempted > 0 {
        out.push_str(&format!("Pages not attempted: {}\n", not_attempted));
    }
    out
}

/// Renders a search plan with its pagination hints
pub fn render_search(plan: &SearchPlan<'_>, pagination: &PaginationInfo) -> String {
    let result = plan.result;
    let summary = result.summary();
    let mut out = String::new();

    if result.is_empty() {
        out.push_str(&format!("No results for '{}'.\n", result.keyword));
        return out;
    }

    out.push_str(&format!(
        "Found {} page hits in {} documents ({} total matching documents)\n",
        summary.total_page_hits, summary.total_documents, result.total_hits
    ));
    out.push_str(&format!(
        "Showing documents {}-{}\n\n",
        pagination.range_start, pagination.range_end
    ));

    for document in &plan.documents {
        let group = &document.group;
        out.push_str(&format!("📚 {} ({})", group.key, group.hit_count_label()));
        if document.partially_seen {
            out.push_str(" (previously shown, new pages only)");
        }
        out.push('\n');
        out.push_str(&format!("   {}\n", group.title()));
        if let Some(first) = group.first() {
            if let Some(date) = &first.date {
                out.push_str(&format!("   Date: {}\n", date));
            }
            if let Some(institution) = &first.institution {
                out.push_str(&format!("   Institution: {}\n", institution));
            }
        }

        for hit in &document.hits {
            if hit.is_context {
                out.push_str(&format!("   Page {} (context)\n", hit.page_number));
            } else {
                let snippet = highlight_keyword(&hit.snippet_text, &result.keyword);
                out.push_str(&format!("   Page {}: {}\n", hit.page_number, snippet.trim()));
            }
            if let Some(viewer) = &hit.bildvisning_url {
                out.push_str(&format!("      Viewer: {}\n", viewer));
            }
        }
        out.push('\n');
    }

    if plan.omitted_documents > 0 {
        out.push_str(&format!(
            "({} previously shown document(s) omitted)\n",
            plan.omitted_documents
        ));
    }
    if plan.not_displayed > 0 {
        out.push_str(&format!(
            "({} more document(s) with new pages not displayed)\n",
            plan.not_displayed
        ));
    }
    if let Some(next) = pagination.next_offset {
        out.push_str(&format!("More results available: use --offset {}\n", next));
    }
    out
}
