//! URL generation for the upstream archive services
//!
//! All functions here are pure: they derive ALTO, IIIF image, viewer,
//! manifest and collection URLs from identifiers and never perform I/O.
//! Malformed input yields `None` rather than a panic.
//!
//! ALTO paths use the identifier without its `arkis!` prefix, while IIIF
//! image and manifest URLs always include it.

mod generator;

pub use generator::{
    alto_url, bildvisaren_url, bildvisning_url, collection_url, iiif_image_url,
    last_path_segment, manifest_id_from_url, manifest_url, remove_arkis_prefix, ARKIS_PREFIX,
};

use crate::config::EndpointConfig;

/// The three per-page URLs attached to hits and page contexts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageUrls {
    pub alto: Option<String>,
    pub image: Option<String>,
    pub bildvisning: Option<String>,
}

impl PageUrls {
    /// Derives every per-page URL for one identifier and page
    pub fn build(
        endpoints: &EndpointConfig,
        manifest_id: &str,
        page: u32,
        search_term: Option<&str>,
    ) -> Self {
        Self {
            alto: alto_url(endpoints, manifest_id, page),
            image: iiif_image_url(endpoints, manifest_id, page),
            bildvisning: bildvisning_url(endpoints, manifest_id, page, search_term),
        }
    }
}
