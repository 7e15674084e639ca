//! JSON snapshot of a one-shot lookup.
//!
//! # Output Structure
//!
//! Snapshots are grouped by the UTC date of the fetch, one file per topic:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── climate-change.json
//!     └── elections.json
//! ```
//!
//! A second lookup of the same topic on the same day overwrites the first.

use crate::models::{Article, ErrorMap};
use crate::summarizer::Report;
use crate::utils::slugify_title;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Everything a one-shot lookup produced.
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub topic: &'a str,
    pub fetched_at: DateTime<Utc>,
    pub articles: &'a [Article],
    pub errors: &'a ErrorMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<&'a Report>,
}

/// Path of the snapshot for `topic` fetched at `fetched_at`.
pub fn snapshot_path(json_output_dir: &str, topic: &str, fetched_at: DateTime<Utc>) -> PathBuf {
    let slug = slugify_title(topic.trim());
    let slug = if slug.is_empty() { "untitled".to_string() } else { slug };
    PathBuf::from(json_output_dir)
        .join(fetched_at.format("%Y-%m-%d").to_string())
        .join(format!("{slug}.json"))
}

/// Write `snapshot` under `json_output_dir` and return the file path.
#[instrument(
    level = "info",
    skip_all,
    fields(json_output_dir = %json_output_dir, topic = snapshot.topic)
)]
pub async fn write_snapshot(
    snapshot: &Snapshot<'_>,
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(snapshot)?;
    let path = snapshot_path(json_output_dir, snapshot.topic, snapshot.fetched_at);

    if let Some(dir) = path.parent() {
        info!(dir = %dir.display(), "Ensuring JSON directory exists");
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(&path, json).await?;
    info!(path = %path.display(), articles = snapshot.articles.len(), "Wrote JSON snapshot");
    Ok(path)
}
