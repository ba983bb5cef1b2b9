//! Data types shared by the search and browse pipelines

mod browse;
mod metadata;
mod search;

pub use browse::{BrowseResult, PageContext, PageFailure, PageFailureReason};
pub use metadata::DocumentMetadata;
pub use search::{SearchHit, SearchResult};

#[cfg(test)]
pub(crate) use search::fixtures;
