//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Configuration is read once when the HTTP client is constructed; operations
//! never consult it per call.
//!
//! # Example
//!
//! ```no_run
//! use ra_transcripts::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("ra-transcripts.toml")).unwrap();
//! println!("Retries: {}", config.http.max_retries);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BrowseConfig, Config, EndpointConfig, HttpConfig, SearchConfig};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, load_config, load_config_or_default, parse_config, LOG_ENV, TIMEOUT_ENV,
};
pub use validation::validate;
