//! Interactive lookup state: the current topic, its result set, the paging
//! cursor and the errors reported by the last search.

use crate::aggregator::{Aggregator, Page, page};
use crate::models::{Article, ErrorMap};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone)]
pub struct Session {
    topic: String,
    results: Vec<Article>,
    cursor: usize,
    errors: ErrorMap,
    page_size: usize,
}

impl Session {
    pub fn new(page_size: usize) -> Self {
        Self {
            topic: String::new(),
            results: Vec::new(),
            cursor: 0,
            errors: ErrorMap::new(),
            page_size: page_size.max(1),
        }
    }

    /// Run a new search and replace the whole state with its outcome.
    ///
    /// Nothing about the previous search is touched until aggregation has
    /// finished; the cursor always restarts at zero.
    #[instrument(level = "info", skip(self, aggregator, enabled))]
    pub async fn search(
        &mut self,
        aggregator: &Aggregator,
        enabled: &BTreeSet<String>,
        topic: &str,
    ) {
        let (results, errors) = aggregator.aggregate(enabled, topic).await;
        info!(results = results.len(), errors = errors.len(), "Search finished");
        *self = Self {
            topic: topic.to_string(),
            results,
            cursor: 0,
            errors,
            page_size: self.page_size,
        };
    }

    /// Advance the cursor by one page. Returns false (and changes nothing)
    /// when there is no further page.
    pub fn show_more(&mut self) -> bool {
        if !self.current_page().has_more {
            return false;
        }
        self.cursor += self.page_size;
        debug!(cursor = self.cursor, "Advanced to next page");
        true
    }

    pub fn current_page(&self) -> Page<'_> {
        page(&self.results, self.cursor, self.page_size)
    }

    /// Look up an article by its 0-based position in the result set.
    pub fn article(&self, index: usize) -> Option<&Article> {
        self.results.get(index)
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn results(&self) -> &[Article] {
        &self.results
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn has_searched(&self) -> bool {
        !self.topic.is_empty()
    }
}
