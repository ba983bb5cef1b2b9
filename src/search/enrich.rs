//! Context enrichment for search hits
//!
//! Enrichment attaches page URLs and full page text to hits; padding adds
//! the neighbouring pages of each hit so a reader sees the surrounding text.

use std::collections::BTreeSet;

use crate::clients::{AltoPage, Clients};
use crate::models::SearchHit;
use crate::url::PageUrls;

/// Groups hits by a key, keeping first-occurrence order
fn group_by_key<'a, K, F>(hits: &'a [SearchHit], key: F) -> Vec<(K, Vec<&'a SearchHit>)>
where
    K: PartialEq,
    F: Fn(&'a SearchHit) -> K,
{
    let mut groups: Vec<(K, Vec<&'a SearchHit>)> = Vec::new();
    for hit in hits {
        let k = key(hit);
        match groups.iter_mut().find(|(existing, _)| *existing == k) {
            Some((_, members)) => members.push(hit),
            None => groups.push((k, vec![hit])),
        }
    }
    groups
}

/// Fills URLs and page text for the first `max_pages` hits
///
/// Each document's IIIF collection is looked up once; its first manifest
/// provides the page URLs. When the page text cannot be fetched (no
/// manifest, no ALTO, blank page) the snippet text is used instead. Hits
/// past `max_pages` are dropped.
pub async fn enrich_hits(
    clients: &Clients,
    hits: &[SearchHit],
    max_pages: usize,
    search_term: Option<&str>,
) -> Vec<SearchHit> {
    let selected = &hits[..hits.len().min(max_pages)];
    let mut enriched = Vec::with_capacity(selected.len());
    let mut without_manifest = 0usize;

    for (document_id, document_hits) in group_by_key(selected, |hit| hit.document_id.as_str()) {
        let manifest_id = match clients.iiif.first_manifest_id(document_id).await {
            Ok(id) => id,
            Err(error) => {
                tracing::warn!("IIIF lookup for {} failed: {}", document_id, error);
                None
            }
        };

        for hit in document_hits {
            let mut hit = hit.clone();
            let urls = PageUrls::build(
                &clients.endpoints,
                manifest_id.as_deref().unwrap_or(document_id),
                hit.page_number,
                search_term,
            );

            let page_text = match (&manifest_id, &urls.alto) {
                (Some(_), Some(alto_url)) => match clients.alto.fetch_page(alto_url).await {
                    Ok(AltoPage::Text(text)) if !text.is_empty() => Some(text),
                    Ok(_) => None,
                    Err(error) => {
                        tracing::debug!("No page text for {}: {}", alto_url, error);
                        None
                    }
                },
                _ => None,
            };
            if manifest_id.is_none() {
                without_manifest += 1;
            }

            hit.full_text = Some(page_text.unwrap_or_else(|| hit.snippet_text.clone()));
            hit.alto_url = urls.alto;
            hit.image_url = urls.image;
            hit.bildvisning_url = urls.bildvisning;
            enriched.push(hit);
        }
    }

    tracing::debug!(
        "Enriched {} hits ({} without manifest)",
        enriched.len(),
        without_manifest
    );
    enriched
}

/// Adds neighbouring pages around every hit
///
/// For each document, pages `page - padding ..= page + padding` (page > 0)
/// are included. Existing hits are kept as they are; missing pages become
/// context placeholders. The result is sorted by document and page.
pub fn expand_with_padding(hits: &[SearchHit], padding: u32) -> Vec<SearchHit> {
    if padding == 0 {
        return hits.to_vec();
    }

    let mut expanded = Vec::new();
    let documents = group_by_key(hits, |hit| (hit.document_id.as_str(), hit.reference_code.as_str()));

    for (_, document_hits) in documents {
        let mut pages = BTreeSet::new();
        for hit in &document_hits {
            if hit.page_number == 0 {
                pages.insert(0);
                continue;
            }
            let first = hit.page_number.saturating_sub(padding).max(1);
            let last = hit.page_number.saturating_add(padding);
            pages.extend(first..=last);
        }

        for page in pages {
            match document_hits.iter().find(|hit| hit.page_number == page) {
                Some(existing) => expanded.push((*existing).clone()),
                None => expanded.push(document_hits[0].context_page(page)),
            }
        }
    }

    expanded.sort_by(|a, b| {
        (&a.document_id, &a.reference_code, a.page_number).cmp(&(
            &b.document_id,
            &b.reference_code,
            b.page_number,
        ))
    });
    expanded
}
