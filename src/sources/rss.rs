//! RSS 2.0 / RSS 1.0 / Atom feed adapter.
//!
//! One adapter instance per named feed, so each outlet can be toggled on
//! its own. Feeds are not topic searches: by default the first
//! `entries_per_feed` usable entries are taken as-is, and `match_topic`
//! narrows them to entries mentioning the topic.
//!
//! Parsing is done by `feed-rs`, which resolves namespaces, so prefixed
//! elements (`media:*`, `content:encoded`, `dc:date`, `atom:link`) map the
//! same whatever prefix a feed declares.
//!
//! # Field mapping
//!
//! | Article | RSS | Atom |
//! |---------|-----|------|
//! | title | `title` | `title` |
//! | url | `link` | `link[rel=alternate]` |
//! | body | `description`, else `content:encoded` (markup stripped) | `summary`, else `content` |
//! | published | `pubDate` or `dc:date` | `published`, else `updated` |
//! | image | `media:thumbnail`/`media:content`, image `enclosure`, else first `<img>` | same |

use super::SourceAdapter;
use crate::config::{FeedSpec, RssConfig};
use crate::error::{NewsError, check_status};
use crate::models::{Article, TimestampPolicy};
use crate::thumbnail::extract_thumbnail;
use crate::utils::html_to_text;
use chrono::{DateTime, Utc};
use feed_rs::model::{Entry, Link, MediaObject};
use feed_rs::parser;
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct RssFeed {
    client: reqwest::Client,
    feed: FeedSpec,
    config: RssConfig,
}

impl RssFeed {
    pub fn new(client: reqwest::Client, feed: FeedSpec, config: RssConfig) -> Self {
        Self { client, feed, config }
    }

    #[instrument(
        level = "info",
        skip(self, now),
        fields(source = %self.feed.name, url = %self.feed.url)
    )]
    async fn pull(&self, topic: &str, now: DateTime<Utc>) -> Result<Vec<Article>, NewsError> {
        let resp = check_status(self.client.get(&self.feed.url).send().await?).await?;
        let body = resp.bytes().await?;
        debug!(bytes = body.len(), "Downloaded feed");

        let entries = parse_feed(&body)?;
        let total = entries.len();
        let needle = topic.trim().to_lowercase();

        let articles: Vec<Article> = entries
            .into_iter()
            .filter(|e| !self.config.match_topic || e.mentions(&needle))
            .filter_map(|e| e.into_article(&self.feed.name, self.config.missing_timestamp, now))
            .take(self.config.entries_per_feed)
            .collect();

        if articles.is_empty() && total > 0 {
            warn!(total, "Feed had entries but none were kept");
        }
        info!(count = articles.len(), total, "Collected feed entries");
        Ok(articles)
    }
}

impl SourceAdapter for RssFeed {
    fn name(&self) -> &str {
        &self.feed.name
    }

    fn fetch<'a>(
        &'a self,
        topic: &'a str,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<Vec<Article>, NewsError>> {
        self.pull(topic, now).boxed()
    }
}

/// A feed entry reduced to what an [`Article`] needs.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    /// Summary as published, usually HTML.
    pub summary: String,
    pub published: Option<DateTime<Utc>>,
    /// Image declared by feed metadata, before falling back to the summary.
    pub image: Option<String>,
}

impl FeedEntry {
    /// `needle` must already be lowercase.
    fn mentions(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.title.to_lowercase().contains(needle)
            || self.summary.to_lowercase().contains(needle)
    }

    fn into_article(
        self,
        source: &str,
        policy: TimestampPolicy,
        now: DateTime<Utc>,
    ) -> Option<Article> {
        let image = self
            .image
            .unwrap_or_else(|| extract_thumbnail(&self.summary));
        let body = html_to_text(&self.summary);
        let published = policy.resolve(self.published, now);
        Article::new(source, &html_to_text(&self.title), &self.link, published)
            .map(|a| a.with_body(body).with_image(Some(&image)))
    }

    fn from_entry(entry: Entry) -> Self {
        let link = article_link(&entry.links).unwrap_or_default();
        let image = entry.media.iter().find_map(media_image);
        let summary = entry
            .summary
            .map(|t| t.content)
            .filter(|s| !s.trim().is_empty())
            .or_else(|| entry.content.and_then(|c| c.body))
            .unwrap_or_default();
        FeedEntry {
            title: entry.title.map(|t| t.content).unwrap_or_default(),
            link,
            summary,
            published: entry.published.or(entry.updated),
            image,
        }
    }
}

/// Parse an RSS 2.0, RSS 1.0 (RDF) or Atom document, keeping document order.
pub fn parse_feed(body: &[u8]) -> Result<Vec<FeedEntry>, NewsError> {
    let feed = parser::parse(body)?;
    Ok(feed.entries.into_iter().map(FeedEntry::from_entry).collect())
}

/// The entry's page: an untyped or `alternate` link, else the first one.
fn article_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or(links.first())
        .map(|l| l.href.trim().to_string())
        .filter(|href| !href.is_empty())
}

/// First thumbnail, else first media content that is (or may be) an image.
fn media_image(media: &MediaObject) -> Option<String> {
    let thumbnail = media
        .thumbnails
        .iter()
        .map(|t| t.image.uri.trim().to_string())
        .find(|uri| !uri.is_empty());
    thumbnail.or_else(|| {
        media
            .content
            .iter()
            .filter(|c| {
                c.content_type
                    .as_ref()
                    .is_none_or(|mime| mime.essence_str().starts_with("image/"))
            })
            .filter_map(|c| c.url.as_ref().map(|u| u.to_string()))
            .find(|u| !u.trim().is_empty())
    })
}
