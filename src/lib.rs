//! ra-transcripts: search and browse transcribed archive material
//!
//! This crate searches a remote full-text archive index and retrieves page
//! transcriptions for individual documents. It hides the irregularities of
//! three upstream services (a keyword search API, an ALTO XML page store and
//! an IIIF/OAI-PMH metadata service) behind two operations: [`search::search`]
//! and [`browse::browse`].

pub mod browse;
pub mod clients;
pub mod config;
pub mod http;
pub mod models;
pub mod output;
pub mod pages;
pub mod search;
pub mod session;
pub mod url;

use thiserror::Error;

/// Main error type for archive operations
#[derive(Debug, Error)]
pub enum RaError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid JSON from {url}: {source}")]
    Json {
        url: String,
        source: serde_json::Error,
    },

    #[error("Invalid XML from {url}: {message}")]
    Xml { url: String, message: String },

    #[error("OAI-PMH error [{code}]: {message}")]
    OaiPmh { code: String, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Document not found: {reference_code}")]
    DocumentNotFound { reference_code: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RaError {
    /// Returns true for failures that may succeed on a later attempt
    /// (timeouts, connection problems, 429 and 5xx responses).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Http { source, .. } => source.is_timeout() || source.is_connect(),
            Self::Status { status, .. } => http::is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for archive operations
pub type Result<T> = std::result::Result<T, RaError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use http::HttpClient;
pub use models::{BrowseResult, PageContext, SearchHit, SearchResult};
pub use session::{DedupState, Session};
