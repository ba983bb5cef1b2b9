//! Search API client (`/api/records`)
//!
//! The response types mirror the upstream JSON closely; everything optional
//! upstream is optional here so partial records still deserialize.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

use crate::http::HttpClient;
use crate::models::SearchHit;
use crate::pages::page_id_to_number;
use crate::{RaError, Result};

/// Titles longer than this are shortened with "..."
pub const MAX_TITLE_CHARS: usize = 100;

/// Sort orders accepted by the search API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sort {
    #[default]
    Relevance,
    TimeAsc,
    TimeDesc,
    AlphaAsc,
    AlphaDesc,
}

impl Sort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::TimeAsc => "timeAsc",
            Self::TimeDesc => "timeDesc",
            Self::AlphaAsc => "alphaAsc",
            Self::AlphaDesc => "alphaDesc",
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sort {
    type Err = RaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "relevance" => Ok(Self::Relevance),
            "timeAsc" => Ok(Self::TimeAsc),
            "timeDesc" => Ok(Self::TimeDesc),
            "alphaAsc" => Ok(Self::AlphaAsc),
            "alphaDesc" => Ok(Self::AlphaDesc),
            other => Err(RaError::Validation(format!(
                "Unknown sort order '{}' (expected relevance, timeAsc, timeDesc, alphaAsc or alphaDesc)",
                other
            ))),
        }
    }
}

/// Which field the keyword is matched against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchMode {
    /// Full text of transcribed pages (`transcribed_text`)
    #[default]
    Transcribed,
    /// Catalogue metadata (`text`)
    Metadata,
}

/// Parameters of one search API call
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub keyword: Option<String>,
    pub mode: SearchMode,
    pub only_digitised: bool,
    pub name: Option<String>,
    pub place: Option<String>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub sort: Sort,
    /// Documents per page (`max`)
    pub max: u32,
    pub offset: u32,
    /// Page hits kept per document; applied client-side
    pub max_snippets_per_document: Option<u32>,
}

impl SearchQuery {
    /// Transcribed-text search restricted to digitised material
    pub fn transcribed(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            mode: SearchMode::Transcribed,
            only_digitised: true,
            name: None,
            place: None,
            year_min: None,
            year_max: None,
            sort: Sort::Relevance,
            max: 25,
            offset: 0,
            max_snippets_per_document: None,
        }
    }

    /// Metadata search for an exact reference code
    pub fn reference_code(reference_code: &str) -> Self {
        Self {
            mode: SearchMode::Metadata,
            only_digitised: false,
            max: 5,
            ..Self::transcribed(format!("\"{}\"", reference_code))
        }
    }

    /// Rejects parameter combinations the API does not support
    pub fn validate(&self) -> Result<()> {
        let has = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());

        if !has(&self.keyword) && !has(&self.name) && !has(&self.place) {
            return Err(RaError::Validation(
                "Provide at least one of keyword, name or place".to_string(),
            ));
        }
        if self.mode == SearchMode::Transcribed && has(&self.keyword) && !self.only_digitised {
            return Err(RaError::Validation(
                "Transcribed-text search requires only digitised materials; use metadata search instead"
                    .to_string(),
            ));
        }
        if self.max == 0 {
            return Err(RaError::Validation("max must be at least 1".to_string()));
        }
        if let (Some(min), Some(max)) = (self.year_min, self.year_max) {
            if min > max {
                return Err(RaError::Validation(format!(
                    "year_min ({}) is after year_max ({})",
                    min, max
                )));
            }
        }
        Ok(())
    }

    /// Query parameters in the order the API documents them
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("max", self.max.to_string()),
            ("offset", self.offset.to_string()),
            ("sort", self.sort.to_string()),
        ];

        if self.only_digitised {
            params.push(("only_digitised_materials", "true".to_string()));
        }
        if let Some(keyword) = self.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
            let field = match self.mode {
                SearchMode::Transcribed => "transcribed_text",
                SearchMode::Metadata => "text",
            };
            params.push((field, keyword.to_string()));
        }
        if let Some(name) = &self.name {
            params.push(("name", name.clone()));
        }
        if let Some(place) = &self.place {
            params.push(("place", place.clone()));
        }
        if let Some(year) = self.year_min {
            params.push(("year_min", year.to_string()));
        }
        if let Some(year) = self.year_max {
            params.push(("year_max", year.to_string()));
        }
        params
    }
}

/// `/api/records` response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsResponse {
    #[serde(default)]
    pub items: Vec<Record>,
    #[serde(default)]
    pub total_hits: u64,
    /// Records in this response
    pub hits: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(default)]
    pub id: String,
    pub object_type: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub caption: Option<String>,
    #[serde(default)]
    pub metadata: RecordMetadata,
    pub transcribed_text: Option<TranscribedText>,
    #[serde(rename = "_links")]
    pub links: Option<RecordLinks>,
}

impl Record {
    pub fn title(&self) -> &str {
        self.caption.as_deref().unwrap_or("(No title)")
    }

    /// First image link, which points at the record's IIIF manifest
    pub fn manifest_link(&self) -> Option<&str> {
        self.links.as_ref()?.image.first().map(String::as_str)
    }

    pub fn total_hits(&self) -> u32 {
        self.transcribed_text.as_ref().map_or(0, |t| t.num_total)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetadata {
    pub reference_code: Option<String>,
    pub date: Option<String>,
    #[serde(default)]
    pub hierarchy: Vec<Caption>,
    #[serde(default)]
    pub archival_institution: Vec<Caption>,
    #[serde(default)]
    pub provenance: Vec<Caption>,
    pub note: Option<String>,
}

/// Captioned link used by hierarchy, institution and provenance entries
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Caption {
    #[serde(default)]
    pub caption: String,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribedText {
    #[serde(default)]
    pub num_total: u32,
    #[serde(default)]
    pub snippets: Vec<Snippet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snippet {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub pages: Vec<PageRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageRef {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordLinks {
    #[serde(default)]
    pub image: Vec<String>,
    pub html: Option<String>,
}

static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid html tag regex"));

/// Removes HTML tags from snippet text
pub fn strip_html(text: &str) -> String {
    HTML_TAG_RE.replace_all(text, "").into_owned()
}

fn shorten_title(title: &str) -> String {
    if title.chars().count() > MAX_TITLE_CHARS {
        let mut short: String = title.chars().take(MAX_TITLE_CHARS).collect();
        short.push_str("...");
        short
    } else {
        title.to_string()
    }
}

/// Flattens one record into page hits, keeping at most `max_hits`
pub fn record_hits(record: &Record, max_hits: Option<u32>) -> Vec<SearchHit> {
    let Some(transcribed) = &record.transcribed_text else {
        return Vec::new();
    };

    let metadata = &record.metadata;
    let title = shorten_title(record.title());
    let institution = metadata
        .archival_institution
        .first()
        .map(|i| i.caption.clone())
        .filter(|c| !c.is_empty());
    let hierarchy: Vec<String> = metadata
        .hierarchy
        .iter()
        .map(|level| level.caption.clone())
        .collect();
    let limit = max_hits.map_or(usize::MAX, |m| m as usize);

    transcribed
        .snippets
        .iter()
        .flat_map(|snippet| snippet.pages.iter().map(move |page| (snippet, page)))
        .take(limit)
        .map(|(snippet, page)| {
            let page_id = page.id.trim_start_matches('_').to_string();
            SearchHit {
                document_id: record.id.clone(),
                title: title.clone(),
                reference_code: metadata.reference_code.clone().unwrap_or_default(),
                page_number: page_id_to_number(&page_id).unwrap_or(0),
                page_id,
                snippet_text: strip_html(&snippet.text),
                score: snippet.score,
                date: metadata.date.clone(),
                institution: institution.clone(),
                hierarchy: hierarchy.clone(),
                note: metadata.note.clone(),
                document_total_hits: Some(transcribed.num_total),
                alto_url: None,
                image_url: None,
                bildvisning_url: None,
                full_text: None,
                is_context: false,
            }
        })
        .collect()
}

/// Client for the records endpoint
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: HttpClient,
    base_url: String,
}

impl SearchClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Runs one query
    ///
    /// The API may return more records than `max`; the response is
    /// truncated to `max` records here.
    pub async fn search(&self, query: &SearchQuery) -> Result<RecordsResponse> {
        query.validate()?;

        tracing::debug!(
            "Search {:?} keyword={:?} max={} offset={}",
            query.mode,
            query.keyword,
            query.max,
            query.offset
        );
        let mut response: RecordsResponse =
            self.http.get_json(&self.base_url, &query.params()).await?;

        let max = query.max as usize;
        if response.items.len() > max {
            tracing::debug!(
                "Search API returned {} records for max={}, truncating",
                response.items.len(),
                max
            );
            response.items.truncate(max);
        }

        tracing::info!(
            "Search returned {} records ({} total)",
            response.items.len(),
            response.total_hits
        );
        Ok(response)
    }

    /// Finds the record whose reference code is exactly `reference_code`
    pub async fn find_by_reference_code(&self, reference_code: &str) -> Result<Option<Record>> {
        let response = self
            .search(&SearchQuery::reference_code(reference_code))
            .await?;

        Ok(response
            .items
            .into_iter()
            .find(|record| record.metadata.reference_code.as_deref() == Some(reference_code)))
    }
}
