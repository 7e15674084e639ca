//! DuckDuckGo web search adapter.
//!
//! Scrapes the [HTML-only results page](https://html.duckduckgo.com/html/),
//! which needs no API key. Result links are wrapped in DuckDuckGo redirects
//! (`//duckduckgo.com/l/?uddg=<target>`) and are unwrapped here.
//!
//! Web results carry no publication time, so every entry of one fetch gets
//! the same timestamp from the configured policy (`now` by default, which
//! makes web results sort as the most recent).

use super::SourceAdapter;
use crate::config::WebSearchConfig;
use crate::error::{NewsError, check_status};
use crate::models::Article;
use crate::utils::collapse_whitespace;
use chrono::{DateTime, Local, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

pub const NAME: &str = "DuckDuckGo";

static RESULT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.result").expect("valid selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.result__a").expect("valid selector"));
static SNIPPET_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".result__snippet").expect("valid selector"));

#[derive(Debug, Clone)]
pub struct DuckDuckGo {
    client: reqwest::Client,
    config: WebSearchConfig,
}

impl DuckDuckGo {
    pub fn new(client: reqwest::Client, config: WebSearchConfig) -> Self {
        Self { client, config }
    }

    fn query_for(&self, topic: &str) -> String {
        if self.config.recent_bias {
            format!("{} {}", topic.trim(), Local::now().format("%Y-%m"))
        } else {
            topic.trim().to_string()
        }
    }

    #[instrument(level = "info", skip(self), fields(source = NAME))]
    async fn search(&self, topic: &str, now: DateTime<Utc>) -> Result<Vec<Article>, NewsError> {
        let query = self.query_for(topic);
        let url = format!("{}?q={}", self.config.endpoint, urlencoding::encode(&query));
        debug!(%url, "Querying web search");

        let resp = check_status(self.client.get(&url).send().await?).await?;
        let html = resp.text().await?;

        let published = self.config.missing_timestamp.resolve(None, now);
        let articles = parse_results(&html, self.config.max_results, published)?;
        info!(count = articles.len(), %query, "Collected web search results");
        Ok(articles)
    }
}

impl SourceAdapter for DuckDuckGo {
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

/// Parse a results page into at most `max` articles.
///
/// Sponsored results are skipped. A page that is a bot challenge rather than
/// a results list is reported as a parse error instead of an empty result.
pub fn parse_results(
    html: &str,
    max: usize,
    published: DateTime<Utc>,
) -> Result<Vec<Article>, NewsError> {
    let document = Html::parse_document(html);
    let mut articles = Vec::new();
    let mut seen_any = false;

    for result in document.select(&RESULT_SELECTOR) {
        seen_any = true;
        if articles.len() >= max {
            break;
        }
        if result.value().classes().any(|c| c == "result--ad") {
            continue;
        }
        if let Some(article) = parse_result(result, published) {
            articles.push(article);
        }
    }

    if !seen_any && html.contains("anomaly-modal") {
        return Err(NewsError::Parse(
            "web search returned a bot challenge instead of results".to_string(),
        ));
    }
    Ok(articles)
}

fn parse_result(result: ElementRef<'_>, published: DateTime<Utc>) -> Option<Article> {
    let anchor = result.select(&TITLE_SELECTOR).next()?;
    let title = collapse_whitespace(&anchor.text().collect::<String>());
    let link = decode_link(anchor.value().attr("href")?)?;
    let snippet = result
        .select(&SNIPPET_SELECTOR)
        .next()
        .map(|s| collapse_whitespace(&s.text().collect::<String>()))
        .unwrap_or_default();

    Article::new(NAME, &title, &link, published).map(|a| a.with_body(snippet))
}

/// Resolve a result href to the target URL, unwrapping `/l/?uddg=` redirects.
pub fn decode_link(href: &str) -> Option<String> {
    let base = Url::parse("https://duckduckgo.com/").ok()?;
    let resolved = base.join(href.trim()).ok()?;
    let is_redirect = resolved
        .host_str()
        .is_some_and(|h| h.ends_with("duckduckgo.com"))
        && resolved.path() == "/l/";
    if is_redirect {
        return resolved
            .query_pairs()
            .find(|(k, _)| k == "uddg")
            .map(|(_, v)| v.into_owned());
    }
    Some(resolved.to_string())
}
