//! Merging, ordering and paging of articles from the enabled sources.
//!
//! The aggregator is the boundary where adapter failures stop: an adapter
//! error becomes an entry in the [`ErrorMap`] and the remaining sources are
//! still merged. No deduplication happens across sources.

use crate::models::{Article, ErrorMap};
use crate::sources::SourceAdapter;
use chrono::Utc;
use futures::future::join_all;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// Owns the registry of source adapters.
pub struct Aggregator {
    sources: Vec<Box<dyn SourceAdapter>>,
}

impl Aggregator {
    pub fn new(sources: Vec<Box<dyn SourceAdapter>>) -> Self {
        Self { sources }
    }

    /// Names of every registered source, in registry order.
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// Resolve a requested source list; an empty request enables every source.
    pub fn select(&self, requested: &[String]) -> BTreeSet<String> {
        let requested: BTreeSet<String> = requested
            .iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        if requested.is_empty() {
            self.source_names().into_iter().collect()
        } else {
            requested
        }
    }

    /// Query every enabled source for `topic`.
    ///
    /// Sources run concurrently but their results are concatenated in
    /// registry order, then stably sorted newest first, so ties keep the
    /// order they were produced in. Disabled sources are never called.
    #[instrument(level = "info", skip(self, enabled), fields(enabled = enabled.len()))]
    pub async fn aggregate(
        &self,
        enabled: &BTreeSet<String>,
        topic: &str,
    ) -> (Vec<Article>, ErrorMap) {
        for name in enabled {
            if !self.sources.iter().any(|s| s.name() == name) {
                warn!(source = %name, "Unknown source requested; ignoring");
            }
        }

        let active: Vec<&dyn SourceAdapter> = self
            .sources
            .iter()
            .map(|s| s.as_ref())
            .filter(|s| enabled.contains(s.name()))
            .collect();

        // One fetch time for every adapter, so undated entries tie and keep registry order.
        let now = Utc::now();
        let t0 = Instant::now();
        let outcomes = join_all(active.iter().map(|s| s.fetch(topic, now))).await;

        let mut articles = Vec::new();
        let mut errors = ErrorMap::new();
        for (source, outcome) in active.iter().zip(outcomes) {
            match outcome {
                Ok(mut batch) => {
                    info!(source = source.name(), count = batch.len(), "Source returned articles");
                    articles.append(&mut batch);
                }
                Err(e) => {
                    error!(source = source.name(), error = %e, "Source failed");
                    errors.insert(source.name().to_string(), e.to_string());
                }
            }
        }

        sort_newest_first(&mut articles);
        info!(
            total = articles.len(),
            failed = errors.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Aggregation complete"
        );
        (articles, errors)
    }
}

/// Stable descending sort by publication time.
pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.published().cmp(&a.published()));
}

/// One page of a result set.
#[derive(Debug, PartialEq)]
pub struct Page<'a> {
    pub items: &'a [Article],
    pub has_more: bool,
}

/// Slice `[cursor, cursor + page_size)` out of `articles`.
///
/// `has_more` is true iff `cursor + page_size < articles.len()`. A cursor
/// past the end yields an empty page.
pub fn page(articles: &[Article], cursor: usize, page_size: usize) -> Page<'_> {
    let start = cursor.min(articles.len());
    let end = cursor.saturating_add(page_size).min(articles.len());
    Page {
        items: &articles[start..end],
        has_more: cursor.saturating_add(page_size) < articles.len(),
    }
}
