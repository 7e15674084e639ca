//! News source adapters.
//!
//! Each adapter turns one provider's response into [`Article`] records for a
//! topic. Adapters never decide how their failures are shown: they return a
//! [`NewsError`] and the aggregator records it against the adapter's name.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Undated entries |
//! |--------|--------|--------|-----------------|
//! | DuckDuckGo | [`duckduckgo`] | HTML results page | `now` |
//! | BBC, Reuters, Al Jazeera | [`rss`] | RSS 2.0 / Atom feed | `now` |
//! | GNews | [`gnews`] | JSON search API | `oldest` |
//!
//! Timestamp policies and bounds are configurable per adapter.

pub mod duckduckgo;
pub mod gnews;
pub mod rss;

use crate::config::Config;
use crate::error::NewsError;
use crate::models::Article;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;

pub use duckduckgo::DuckDuckGo;
pub use gnews::GNews;
pub use rss::RssFeed;

/// A provider of articles for a topic.
///
/// `fetch` is boxed so adapters of different types can sit in one registry.
pub trait SourceAdapter: Send + Sync {
    /// Name used for toggling and for keying errors.
    fn name(&self) -> &str;

    /// Fetch articles for `topic`. `now` is the fetch time of the whole
    /// aggregation; undated entries under the `now` policy take this value.
    fn fetch<'a>(
        &'a self,
        topic: &'a str,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<Vec<Article>, NewsError>>;
}

/// Build the default registry: web search first, then every configured
/// feed, then the featured API.
pub fn build_sources(
    config: &Config,
    client: &reqwest::Client,
    gnews_key: Option<String>,
) -> Vec<Box<dyn SourceAdapter>> {
    let mut sources: Vec<Box<dyn SourceAdapter>> = Vec::new();
    sources.push(Box::new(DuckDuckGo::new(
        client.clone(),
        config.sources.web_search.clone(),
    )));
    for feed in &config.sources.rss.feeds {
        sources.push(Box::new(RssFeed::new(
            client.clone(),
            feed.clone(),
            config.sources.rss.clone(),
        )));
    }
    sources.push(Box::new(GNews::new(
        client.clone(),
        config.sources.gnews.clone(),
        gnews_key,
    )));
    sources
}
