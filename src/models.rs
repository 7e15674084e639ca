//! Data models shared across sources, the aggregator and the session.
//!
//! - [`Article`]: the uniform record every source adapter produces
//! - [`TimestampPolicy`]: how an adapter dates entries that carry no timestamp
//! - [`ErrorMap`]: per-source error messages from the last aggregation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Thumbnail used whenever an article has no usable image.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/400x200";

/// Shown in place of an empty article body.
pub const PLACEHOLDER_BODY: &str = "No summary.";

/// Error messages keyed by source name.
pub type ErrorMap = BTreeMap<String, String>;

/// A news item normalized from any source.
///
/// Fields are private: once an adapter has built an article nothing
/// downstream can change it. `title` and `url` are guaranteed non-empty by
/// [`Article::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    source: String,
    title: String,
    url: String,
    body: String,
    published: DateTime<Utc>,
    image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    outlet: Option<String>,
}

impl Article {
    /// Build an article, or `None` when the title or url is blank.
    ///
    /// The body starts empty, the image starts as [`PLACEHOLDER_IMAGE`].
    pub fn new(
        source: impl Into<String>,
        title: &str,
        url: &str,
        published: DateTime<Utc>,
    ) -> Option<Self> {
        let title = title.trim();
        let url = url.trim();
        if title.is_empty() || url.is_empty() {
            return None;
        }
        Some(Self {
            source: source.into(),
            title: title.to_string(),
            url: url.to_string(),
            body: String::new(),
            published,
            image: PLACEHOLDER_IMAGE.to_string(),
            outlet: None,
        })
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the thumbnail; blank values keep the placeholder.
    pub fn with_image(mut self, image: Option<&str>) -> Self {
        if let Some(src) = image.map(str::trim).filter(|s| !s.is_empty()) {
            self.image = src.to_string();
        }
        self
    }

    pub fn with_outlet(mut self, outlet: Option<String>) -> Self {
        self.outlet = outlet.filter(|o| !o.trim().is_empty());
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Raw body text; may be empty.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Body for display, falling back to [`PLACEHOLDER_BODY`].
    pub fn display_body(&self) -> &str {
        if self.body.trim().is_empty() {
            PLACEHOLDER_BODY
        } else {
            &self.body
        }
    }

    pub fn published(&self) -> DateTime<Utc> {
        self.published
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    /// Publisher reported by the source, when it differs from the source itself.
    pub fn outlet(&self) -> Option<&str> {
        self.outlet.as_deref()
    }
}

/// How an adapter dates an entry whose origin gives no usable timestamp.
///
/// `Now` makes undated entries sort as the most recent; `Oldest` pins them
/// to the minimum timestamp so they sort last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampPolicy {
    Now,
    Oldest,
}

impl TimestampPolicy {
    /// Resolve an optional timestamp. `now` is passed in so one fetch dates
    /// all of its undated entries identically.
    pub fn resolve(self, parsed: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
        match (parsed, self) {
            (Some(ts), _) => ts,
            (None, TimestampPolicy::Now) => now,
            (None, TimestampPolicy::Oldest) => DateTime::<Utc>::MIN_UTC,
        }
    }
}

/// True for the sentinel produced by [`TimestampPolicy::Oldest`].
pub fn is_unknown_date(ts: DateTime<Utc>) -> bool {
    ts == DateTime::<Utc>::MIN_UTC
}
