//! IIIF collection client
//!
//! Collections may nest sub-collections to an arbitrary depth. They are
//! explored with a worklist and a visited set, bounded by a maximum depth.

use std::collections::{HashSet, VecDeque};

use serde::Deserialize;
use serde_json::Value;

use crate::config::EndpointConfig;
use crate::http::HttpClient;
use crate::url::{collection_url, manifest_id_from_url};
use crate::{RaError, Result};

/// Sub-collection levels explored below the root
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Language preference for label maps
const LABEL_LANGUAGES: [&str; 3] = ["sv", "en", "none"];

#[derive(Debug, Clone, Default, Deserialize)]
struct CollectionDocument {
    #[serde(default)]
    label: Value,
    #[serde(default)]
    items: Vec<CollectionItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CollectionItem {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    label: Value,
}

/// A manifest listed in a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRef {
    /// Manifest identifier (without `arkis!`)
    pub id: String,
    pub label: String,
    pub url: String,
}

/// A collection and every manifest reachable from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IiifCollection {
    pub url: String,
    pub title: String,
    /// Manifests in discovery order (root items first)
    pub manifests: Vec<ManifestRef>,
    /// Sub-collection URLs that were visited
    pub sub_collections: Vec<String>,
}

impl IiifCollection {
    pub fn first_manifest(&self) -> Option<&ManifestRef> {
        self.manifests.first()
    }
}

/// Picks a display string from an IIIF label
///
/// Plain strings are returned as-is. Language maps prefer `sv`, then `en`,
/// then `none`, then the first language present. List values yield their
/// first entry.
pub fn extract_label(label: &Value, default: &str) -> String {
    let first = |value: &Value| -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Array(values) => values.first().and_then(|v| v.as_str()).map(str::to_string),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    };

    let label = match label {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(map) => LABEL_LANGUAGES
            .iter()
            .find_map(|lang| map.get(*lang))
            .or_else(|| map.values().next())
            .and_then(first),
        Value::Array(_) => first(label),
        _ => None,
    };

    label
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Client for IIIF collections
#[derive(Debug, Clone)]
pub struct IiifClient {
    http: HttpClient,
    endpoints: EndpointConfig,
    max_depth: usize,
}

impl IiifClient {
    pub fn new(http: HttpClient, endpoints: EndpointConfig) -> Self {
        Self {
            http,
            endpoints,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    async fn fetch_collection(&self, url: &str) -> Result<Option<CollectionDocument>> {
        let body = match self
            .http
            .get_optional(url, &[("Accept", "application/json")])
            .await?
        {
            Some(body) => body,
            None => return Ok(None),
        };
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|source| RaError::Json {
                url: url.to_string(),
                source,
            })
    }

    /// Explores the collection of a record and everything nested below it
    ///
    /// # Returns
    ///
    /// * `Ok(Some(collection))` - The root collection exists
    /// * `Ok(None)` - No collection for this identifier (404 or malformed id)
    /// * `Err(RaError)` - The root collection could not be fetched or parsed
    ///
    /// Failures below the root are logged and skipped.
    pub async fn get_collection(&self, pid: &str) -> Result<Option<IiifCollection>> {
        let Some(root_url) = collection_url(&self.endpoints, pid) else {
            return Ok(None);
        };
        let Some(root) = self.fetch_collection(&root_url).await? else {
            return Ok(None);
        };

        let mut collection = IiifCollection {
            url: root_url.clone(),
            title: extract_label(&root.label, "Unknown Collection"),
            manifests: Vec::new(),
            sub_collections: Vec::new(),
        };

        let mut visited: HashSet<String> = HashSet::from([root_url]);
        let mut worklist: VecDeque<(Vec<CollectionItem>, usize)> = VecDeque::new();
        worklist.push_back((root.items, 0));

        while let Some((items, depth)) = worklist.pop_front() {
            for item in items {
                match item.kind.as_str() {
                    "Manifest" => {
                        let id = manifest_id_from_url(&item.id).unwrap_or_else(|| item.id.clone());
                        collection.manifests.push(ManifestRef {
                            id,
                            label: extract_label(&item.label, "Untitled"),
                            url: item.id,
                        });
                    }
                    "Collection" => {
                        if depth >= self.max_depth || !visited.insert(item.id.clone()) {
                            continue;
                        }
                        match self.fetch_collection(&item.id).await {
                            Ok(Some(sub)) => {
                                collection.sub_collections.push(item.id);
                                worklist.push_back((sub.items, depth + 1));
                            }
                            Ok(None) => {
                                tracing::debug!("Sub-collection {} not found", item.id)
                            }
                            Err(error) => {
                                tracing::warn!("Skipping sub-collection {}: {}", item.id, error)
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        tracing::debug!(
            "Collection {} has {} manifests",
            collection.url,
            collection.manifests.len()
        );
        Ok(Some(collection))
    }

    /// Identifier of the first manifest in the record's collection
    pub async fn first_manifest_id(&self, pid: &str) -> Result<Option<String>> {
        Ok(self
            .get_collection(pid)
            .await?
            .and_then(|c| c.first_manifest().map(|m| m.id.clone())))
    }
}
