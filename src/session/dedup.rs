use std::collections::{BTreeSet, HashMap};

use crate::models::{BrowseResult, PageContext, SearchHit, SearchResult};
use crate::search::{summarize, DocumentGroup};

/// Pages already shown per reference code
///
/// Grows monotonically while a session lasts; entries are never removed.
/// Owned by the caller and only mutated through the `plan_*` methods and
/// [`DedupState::mark_seen`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupState {
    seen: HashMap<String, BTreeSet<u32>>,
}

impl DedupState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_seen(&self, reference_code: &str, page: u32) -> bool {
        self.seen
            .get(reference_code)
            .is_some_and(|pages| pages.contains(&page))
    }

    pub fn seen_pages(&self, reference_code: &str) -> Option<&BTreeSet<u32>> {
        self.seen.get(reference_code)
    }

    /// Records pages as shown
    pub fn mark_seen<I>(&mut self, reference_code: &str, pages: I)
    where
        I: IntoIterator<Item = u32>,
    {
        let mut pages = pages.into_iter().peekable();
        if pages.peek().is_none() {
            return;
        }
        self.seen
            .entry(reference_code.to_string())
            .or_default()
            .extend(pages);
    }

    /// Documents with at least one shown page
    pub fn document_count(&self) -> usize {
        self.seen.len()
    }

    pub fn page_count(&self) -> usize {
        self.seen.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Plans a browse result: new pages in full, seen pages as stubs
    ///
    /// Every page in the result is marked as shown afterwards.
    pub fn plan_browse<'a>(&mut self, result: &'a BrowseResult) -> BrowsePlan<'a> {
        let code = result.reference_code.as_str();
        let entries: Vec<PageEntry<'a>> = result
            .contexts
            .iter()
            .map(|context| {
                if self.is_seen(code, context.page_number) {
                    PageEntry::Stub {
                        page_number: context.page_number,
                    }
                } else {
                    PageEntry::Full(context)
                }
            })
            .collect();

        self.mark_seen(code, result.contexts.iter().map(|c| c.page_number));

        BrowsePlan { result, entries }
    }

    /// Plans a search result
    ///
    /// Documents whose pages were all shown before are omitted and counted.
    /// Documents with some new pages keep only those. At most `max_display`
    /// documents are planned; omitted documents do not count toward that
    /// limit. Only planned pages are marked as shown.
    pub fn plan_search<'a>(&mut self, result: &'a SearchResult, max_display: usize) -> SearchPlan<'a> {
        let summary = summarize(&result.hits);
        let mut documents = Vec::new();
        let mut omitted_documents = 0usize;
        let mut not_displayed = 0usize;

        for group in summary.groups {
            let new_hits: Vec<&'a SearchHit> = group
                .hits
                .iter()
                .copied()
                .filter(|hit| !self.is_seen(group.key, hit.page_number))
                .collect();

            if new_hits.is_empty() {
                omitted_documents += 1;
                continue;
            }
            if documents.len() >= max_display {
                not_displayed += 1;
                continue;
            }

            let partially_seen = new_hits.len() < group.hits.len();
            self.mark_seen(group.key, new_hits.iter().map(|hit| hit.page_number));
            documents.push(PlannedDocument {
                group,
                hits: new_hits,
                partially_seen,
            });
        }

        SearchPlan {
            result,
            documents,
            omitted_documents,
            not_displayed,
        }
    }
}

/// One page of a browse plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEntry<'a> {
    /// Not shown before: render in full
    Full(&'a PageContext),
    /// Shown before in this session: render a one-line stub
    Stub { page_number: u32 },
}

/// Rendering plan for one browse result
#[derive(Debug, Clone, PartialEq)]
pub struct BrowsePlan<'a> {
    pub result: &'a BrowseResult,
    pub entries: Vec<PageEntry<'a>>,
}

impl BrowsePlan<'_> {
    pub fn new_pages(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, PageEntry::Full(_)))
            .count()
    }

    pub fn previously_shown(&self) -> usize {
        self.entries.len() - self.new_pages()
    }
}

/// A document selected for display
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedDocument<'a> {
    /// All hits of the document in this result
    pub group: DocumentGroup<'a>,
    /// Hits not shown before
    pub hits: Vec<&'a SearchHit>,
    /// Some of the document's pages were shown before
    pub partially_seen: bool,
}

/// Rendering plan for one search result
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan<'a> {
    pub result: &'a SearchResult,
    pub documents: Vec<PlannedDocument<'a>>,
    /// Documents skipped because every page was shown before
    pub omitted_documents: usize,
    /// Documents with new pages beyond the display limit
    pub not_displayed: usize,
}
