//! Output module for rendering results as plain text
//!
//! This module handles:
//! - Rendering browse and search plans (after session dedup)
//! - Keyword highlighting and response size limits
//! - Reporting HTTP request statistics

pub mod stats;
mod text;

pub use stats::format_http_stats;
pub use text::{
    highlight_keyword, render_browse, render_search, truncate_to_token_budget, CHARS_PER_TOKEN,
    NOT_DIGITISED_NOTICE, TRUNCATION_NOTICE,
};
