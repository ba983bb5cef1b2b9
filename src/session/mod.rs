//! Session state for repeated calls from one interactive caller
//!
//! The pipeline itself is stateless. A caller that wants to avoid showing
//! the same pages twice keeps a [`Session`] and plans each result through
//! it before rendering.

mod dedup;
mod gate;

pub use dedup::{BrowsePlan, DedupState, PageEntry, PlannedDocument, SearchPlan};
pub use gate::{RequestGate, Ticket};

use crate::models::{BrowseResult, SearchResult};

/// Pages shown so far, tracked separately for browse and search output
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub browse: DedupState,
    pub search: DedupState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan_browse<'a>(&mut self, result: &'a BrowseResult) -> BrowsePlan<'a> {
        self.browse.plan_browse(result)
    }

    pub fn plan_search<'a>(&mut self, result: &'a SearchResult, max_display: usize) -> SearchPlan<'a> {
        self.search.plan_search(result, max_display)
    }
}
