//! Clients for the upstream archive services
//!
//! Each client wraps the shared [`HttpClient`] and knows one service:
//! - [`SearchClient`]: keyword search API
//! - [`AltoClient`]: ALTO XML page store
//! - [`OaiPmhClient`]: OAI-PMH metadata (EAD records)
//! - [`IiifClient`]: IIIF collections and manifests

mod alto;
mod iiif;
mod oai_pmh;
mod search;

pub use alto::{extract_text, AltoClient, AltoError, AltoPage, ALTO_NAMESPACES};
pub use iiif::{extract_label, IiifClient, IiifCollection, ManifestRef, DEFAULT_MAX_DEPTH};
pub use oai_pmh::{parse_record, OaiPmhClient, OaiRecord, ID_DOES_NOT_EXIST};
pub use search::{
    record_hits, strip_html, Record, RecordsResponse, SearchClient, SearchMode, SearchQuery, Sort,
};

use crate::config::EndpointConfig;
use crate::http::HttpClient;

/// Every upstream client, sharing one HTTP client and one endpoint set
///
/// Constructed once and passed by reference into each operation.
#[derive(Debug, Clone)]
pub struct Clients {
    pub http: HttpClient,
    pub endpoints: EndpointConfig,
    pub search: SearchClient,
    pub alto: AltoClient,
    pub oai: OaiPmhClient,
    pub iiif: IiifClient,
}

impl Clients {
    pub fn new(http: HttpClient, endpoints: EndpointConfig) -> Self {
        Self {
            search: SearchClient::new(http.clone(), endpoints.search_api.clone()),
            alto: AltoClient::new(http.clone()),
            oai: OaiPmhClient::new(http.clone(), endpoints.oai_base.clone()),
            iiif: IiifClient::new(http.clone(), endpoints.clone()),
            http,
            endpoints,
        }
    }

    /// Builds the HTTP client and every service client from configuration
    pub fn from_config(config: &crate::Config) -> crate::Result<Self> {
        let http = HttpClient::new(&config.http)?;
        Ok(Self::new(http, config.endpoints.clone()))
    }
}
