use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure
///
/// Every section is optional; missing sections and keys fall back to the
/// public Riksarkivet endpoints and conservative HTTP settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub endpoints: EndpointConfig,
    pub search: SearchConfig,
    pub browse: BrowseConfig,
}

/// HTTP transport and retry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout (seconds), applied to every individual request
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Number of retries after the first attempt for retryable failures
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Base delay for exponential backoff (milliseconds)
    #[serde(rename = "backoff-base-ms")]
    pub backoff_base_ms: u64,

    /// User agent sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_retries: 3,
            backoff_base_ms: 500,
            user_agent: format!("ra-transcripts/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Upstream service base URLs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Keyword search API (records endpoint)
    #[serde(rename = "search-api")]
    pub search_api: String,

    /// ALTO XML page store
    #[serde(rename = "alto-base")]
    pub alto_base: String,

    /// IIIF image and presentation API root
    #[serde(rename = "iiif-base")]
    pub iiif_base: String,

    /// IIIF collection API root
    #[serde(rename = "collection-base")]
    pub collection_base: String,

    /// Image viewer (bildvisning) root
    #[serde(rename = "bildvisning-base")]
    pub bildvisning_base: String,

    /// OAI-PMH endpoint
    #[serde(rename = "oai-base")]
    pub oai_base: String,
}

impl EndpointConfig {
    /// Points every endpoint at one host, with the same paths as production.
    ///
    /// Used by tests that serve all upstreams from a single mock server.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            search_api: format!("{}/api/records", base),
            alto_base: format!("{}/dokument/alto", base),
            iiif_base: base.to_string(),
            collection_base: format!("{}/collection/arkiv", base),
            bildvisning_base: format!("{}/bildvisning", base),
            oai_base: format!("{}/OAI", base),
        }
    }

    /// All endpoints paired with their config key, for validation
    pub(crate) fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("search-api", &self.search_api),
            ("alto-base", &self.alto_base),
            ("iiif-base", &self.iiif_base),
            ("collection-base", &self.collection_base),
            ("bildvisning-base", &self.bildvisning_base),
            ("oai-base", &self.oai_base),
        ]
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            search_api: "https://data.riksarkivet.se/api/records".to_string(),
            alto_base: "https://sok.riksarkivet.se/dokument/alto".to_string(),
            iiif_base: "https://lbiiif.riksarkivet.se".to_string(),
            collection_base: "https://lbiiif.riksarkivet.se/collection/arkiv".to_string(),
            bildvisning_base: "https://sok.riksarkivet.se/bildvisning".to_string(),
            oai_base: "https://oai-pmh.riksarkivet.se/OAI".to_string(),
        }
    }
}

/// Defaults for search calls
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Documents requested per search call
    #[serde(rename = "max-results")]
    pub max_results: u32,

    /// Page hits kept per document (client-side cap)
    #[serde(rename = "max-snippets-per-document")]
    pub max_snippets_per_document: u32,

    /// Documents rendered per result page
    #[serde(rename = "max-display")]
    pub max_display: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 25,
            max_snippets_per_document: 3,
            max_display: 20,
        }
    }
}

/// Defaults for browse calls
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowseConfig {
    /// Pages fetched per browse call
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Highest page number a page specification may address
    #[serde(rename = "max-page-number")]
    pub max_page_number: u32,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            max_pages: 20,
            max_page_number: 1000,
        }
    }
}
