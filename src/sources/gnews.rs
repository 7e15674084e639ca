//! GNews featured-news adapter.
//!
//! Uses the keyword search endpoint of [GNews](https://gnews.io/docs/v4).
//! Requires an API key (`GNEWS_KEY`); without one the adapter quietly
//! contributes nothing.
//!
//! Articles with neither a description nor content are dropped. The
//! publisher name is kept as the article's outlet while `source` stays
//! `GNews`, so toggling works on the adapter name.

use super::SourceAdapter;
use crate::config::GNewsConfig;
use crate::error::{NewsError, check_status};
use crate::models::Article;
use crate::utils::collapse_whitespace;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

pub const NAME: &str = "GNews";

#[derive(Debug, Clone)]
pub struct GNews {
    client: reqwest::Client,
    config: GNewsConfig,
    api_key: Option<String>,
}

impl GNews {
    pub fn new(client: reqwest::Client, config: GNewsConfig, api_key: Option<String>) -> Self {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        Self {
            client,
            config,
            api_key,
        }
    }

    #[instrument(level = "info", skip(self), fields(source = NAME))]
    async fn search(&self, topic: &str, now: DateTime<Utc>) -> Result<Vec<Article>, NewsError> {
        let Some(key) = self.api_key.as_deref() else {
            warn!("GNEWS_KEY not set; featured news disabled");
            return Ok(Vec::new());
        };

        let max = self.config.max_results.to_string();
        let resp = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("q", topic.trim()),
                ("lang", self.config.lang.as_str()),
                ("max", max.as_str()),
                ("apikey", key),
            ])
            .send()
            .await?;
        let body = check_status(resp).await?.text().await?;
        debug!(bytes = body.len(), "GNews response received");

        let articles = parse_response(&body, self.config.missing_timestamp.resolve(None, now))?;
        info!(count = articles.len(), "Collected featured articles");
        Ok(articles)
    }
}

impl SourceAdapter for GNews {
    fn name(&self) -> &str {
        NAME
    }

    fn fetch<'a>(
        &'a self,
        topic: &'a str,
        now: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<Vec<Article>, NewsError>> {
        self.search(topic, now).boxed()
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    articles: Vec<GNewsArticle>,
    errors: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GNewsArticle {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    image: Option<String>,
    published_at: Option<String>,
    source: Option<GNewsSource>,
}

#[derive(Debug, Deserialize)]
struct GNewsSource {
    name: Option<String>,
}

/// True when an `errors` field carries something: a non-empty array,
/// string or object.
fn reports_error(errors: &serde_json::Value) -> bool {
    match errors {
        serde_json::Value::Null => false,
        serde_json::Value::Array(items) => !items.is_empty(),
        serde_json::Value::String(s) => !s.trim().is_empty(),
        serde_json::Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

/// Map a search response body to articles.
///
/// `undated` is used for entries whose `publishedAt` is missing or not
/// RFC 3339.
pub fn parse_response(body: &str, undated: DateTime<Utc>) -> Result<Vec<Article>, NewsError> {
    let response: SearchResponse = serde_json::from_str(body)?;
    if let Some(errors) = response.errors.filter(reports_error) {
        return Err(NewsError::Parse(format!("GNews reported errors: {errors}")));
    }

    let articles = response
        .articles
        .into_iter()
        .filter_map(|a| {
            let text = [a.description.as_deref(), a.content.as_deref()]
                .into_iter()
                .flatten()
                .map(collapse_whitespace)
                .find(|t| !t.is_empty())?;
            let published = a
                .published_at
                .as_deref()
                .and_then(|p| DateTime::parse_from_rfc3339(p).ok())
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or(undated);
            Article::new(NAME, a.title.as_deref()?, a.url.as_deref()?, published).map(|article| {
                article
                    .with_body(text)
                    .with_image(a.image.as_deref())
                    .with_outlet(a.source.and_then(|s| s.name))
            })
        })
        .collect();
    Ok(articles)
}
