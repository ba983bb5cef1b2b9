use std::collections::HashMap;

use crate::models::SearchHit;

/// Hits of one document, in the order they were returned
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentGroup<'a> {
    /// Reference code, or the record id when the reference code is missing
    pub key: &'a str,
    pub hits: Vec<&'a SearchHit>,
}

impl<'a> DocumentGroup<'a> {
    pub fn first(&self) -> Option<&'a SearchHit> {
        self.hits.first().copied()
    }

    pub fn title(&self) -> &'a str {
        self.first().map_or("(No title)", |hit| hit.title.as_str())
    }

    /// Page hits returned for this document
    pub fn shown(&self) -> usize {
        self.hits.iter().filter(|hit| !hit.is_context).count()
    }

    /// Hits the upstream index reports for this document
    pub fn total(&self) -> Option<u32> {
        self.first().and_then(|hit| hit.document_total_hits)
    }

    /// True when the upstream cap returned fewer hits than exist
    pub fn is_truncated(&self) -> bool {
        self.total().is_some_and(|total| total as usize > self.shown())
    }

    /// "3 pages" or "3 shown (12 total)"
    pub fn hit_count_label(&self) -> String {
        let shown = self.shown();
        match self.total() {
            Some(total) if self.is_truncated() => format!("{} shown ({} total)", shown, total),
            _ if shown == 1 => "1 page".to_string(),
            _ => format!("{} pages", shown),
        }
    }

    pub fn page_numbers(&self) -> Vec<u32> {
        self.hits.iter().map(|hit| hit.page_number).collect()
    }
}

/// Hits grouped by document, in order of first appearance
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSummary<'a> {
    pub groups: Vec<DocumentGroup<'a>>,
    pub total_documents: usize,
    pub total_page_hits: usize,
}

impl<'a> SearchSummary<'a> {
    pub fn group(&self, key: &str) -> Option<&DocumentGroup<'a>> {
        self.groups.iter().find(|group| group.key == key)
    }
}

/// Groups hits by document
///
/// # Examples
///
/// ```
/// # fn example(hits: &[ra_transcripts::SearchHit]) {
/// use ra_transcripts::search::summarize;
///
/// let summary = summarize(hits);
/// for group in &summary.groups {
///     println!("{}: {}", group.key, group.hit_count_label());
/// }
/// # }
/// ```
pub fn summarize(hits: &[SearchHit]) -> SearchSummary<'_> {
    let mut groups: Vec<DocumentGroup<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for hit in hits {
        let key = hit.document_key();
        match index.get(key) {
            Some(&i) => groups[i].hits.push(hit),
            None => {
                index.insert(key, groups.len());
                groups.push(DocumentGroup {
                    key,
                    hits: vec![hit],
                });
            }
        }
    }

    SearchSummary {
        total_documents: groups.len(),
        total_page_hits: hits.iter().filter(|hit| !hit.is_context).count(),
        groups,
    }
}
