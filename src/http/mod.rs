//! HTTP layer shared by every upstream client
//!
//! This module contains:
//! - The resilient [`HttpClient`] (retry with exponential backoff, 404 as absent)
//! - Response and transport-error classification
//! - Request counters for operational visibility

mod client;
mod stats;

pub use client::{
    build_http_client, classify_status, classify_transport_error, is_retryable_status,
    HttpClient, Outcome, RetryPolicy,
};
pub use stats::{HttpStats, StatsSnapshot};
