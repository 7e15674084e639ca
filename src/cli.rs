//! Command-line interface definitions.
//!
//! Secrets can be given as flags or picked up from the environment.

use crate::config::BackendKind;
use clap::Parser;

/// Look up a news topic across web search, RSS feeds and GNews.
///
/// With a topic the lookup runs once and prints Markdown; without one an
/// interactive session reads commands from stdin.
///
/// # Examples
///
/// ```sh
/// # One-shot lookup, two pages, with per-article summaries
/// news_lookup "climate change" --pages 2 --summarize
///
/// # Only the feeds, with a report, saved as JSON
/// news_lookup elections --sources BBC,Reuters --report -j ./json
///
/// # Interactive session
/// news_lookup --config ./config.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Topic to look up; omit for an interactive session
    pub topic: Option<String>,

    /// Comma-separated source names to query (default: all)
    #[arg(short, long, value_delimiter = ',')]
    pub sources: Vec<String>,

    /// Optional path to config.yaml file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Pages to reveal in a one-shot lookup
    #[arg(short, long, default_value_t = 1)]
    pub pages: usize,

    /// Summarize every displayed article
    #[arg(long)]
    pub summarize: bool,

    /// Produce a two-stage report over the whole result set
    #[arg(long)]
    pub report: bool,

    /// Summarizer backend, overriding the config file
    #[arg(short, long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Output directory for JSON snapshots of one-shot lookups
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// GNews API key
    #[arg(long, env = "GNEWS_KEY", hide_env_values = true)]
    pub gnews_key: Option<String>,

    /// Hugging Face API token for the hosted backend
    #[arg(long, env = "HF_API_TOKEN", hide_env_values = true)]
    pub hf_token: Option<String>,

    /// OpenAI API key for the chat backend
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,
}
