//! Integration tests against mock upstream services
//!
//! Every test starts its own wiremock server and points all endpoints at it.

mod browse_tests;
mod common;
mod http_tests;
mod search_tests;
