//! YAML configuration.
//!
//! Every field has a default, so a missing file, or a file that sets only a
//! few keys, is valid. Secrets never live here; they come from the
//! environment through [`crate::cli::Cli`].
//!
//! ```yaml
//! page_size: 10
//! sources:
//!   rss:
//!     entries_per_feed: 5
//!     feeds:
//!       - name: BBC
//!         url: http://feeds.bbci.co.uk/news/rss.xml
//! summarizer:
//!   backend: chat
//!   chat:
//!     model: gpt-4o-mini
//! ```

use crate::error::NewsError;
use crate::models::TimestampPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Articles revealed per "show more".
    pub page_size: usize,
    /// User-Agent sent with every request.
    pub user_agent: String,
    pub sources: SourcesConfig,
    pub summarizer: SummarizerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: 10,
            user_agent: format!("news_lookup/{}", env!("CARGO_PKG_VERSION")),
            sources: SourcesConfig::default(),
            summarizer: SummarizerConfig::default(),
        }
    }
}

impl Config {
    /// Load from `path`, or return defaults when no path is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> Result<Self, NewsError> {
        let Some(path) = path else {
            info!("No config file given; using defaults");
            return Ok(Self::default());
        };
        let raw = tokio::fs::read_to_string(Path::new(path)).await?;
        let mut config: Config = serde_yaml::from_str(&raw)?;
        if config.page_size == 0 {
            config.page_size = Config::default().page_size;
        }
        info!(
            path,
            feeds = config.sources.rss.feeds.len(),
            backend = ?config.summarizer.backend,
            "Loaded configuration"
        );
        Ok(config)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub web_search: WebSearchConfig,
    pub rss: RssConfig,
    pub gnews: GNewsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSearchConfig {
    pub endpoint: String,
    pub max_results: usize,
    /// Append the current year-month to the query.
    pub recent_bias: bool,
    pub missing_timestamp: TimestampPolicy,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://html.duckduckgo.com/html/".to_string(),
            max_results: 30,
            recent_bias: false,
            missing_timestamp: TimestampPolicy::Now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSpec {
    pub name: String,
    pub url: String,
}

impl FeedSpec {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RssConfig {
    pub entries_per_feed: usize,
    /// Keep only entries mentioning the topic.
    pub match_topic: bool,
    pub missing_timestamp: TimestampPolicy,
    pub feeds: Vec<FeedSpec>,
}

impl Default for RssConfig {
    fn default() -> Self {
        Self {
            entries_per_feed: 20,
            match_topic: false,
            missing_timestamp: TimestampPolicy::Now,
            feeds: vec![
                FeedSpec::new("BBC", "http://feeds.bbci.co.uk/news/rss.xml"),
                FeedSpec::new("Reuters", "http://feeds.reuters.com/reuters/topNews"),
                FeedSpec::new("Al Jazeera", "https://www.aljazeera.com/xml/rss/all.xml"),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GNewsConfig {
    pub endpoint: String,
    pub lang: String,
    pub max_results: usize,
    pub missing_timestamp: TimestampPolicy,
}

impl Default for GNewsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://gnews.io/api/v4/search".to_string(),
            lang: "en".to_string(),
            max_results: 5,
            missing_timestamp: TimestampPolicy::Oldest,
        }
    }
}

/// Which summarization backend the gateway talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Hosted,
    Chat,
    Local,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub backend: BackendKind,
    /// Longer input is cut before it is sent.
    pub max_input_chars: usize,
    pub hosted: HostedConfig,
    pub chat: ChatConfig,
    pub local: LocalConfig,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Hosted,
            max_input_chars: 3000,
            hosted: HostedConfig::default(),
            chat: ChatConfig::default(),
            local: LocalConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostedConfig {
    pub endpoint: String,
    pub model: String,
    pub min_length: u32,
    pub max_length: u32,
}

impl Default for HostedConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/models".to_string(),
            model: "facebook/bart-large-cnn".to_string(),
            min_length: 30,
            max_length: 130,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.5,
            max_tokens: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            program: "ollama".to_string(),
            args: vec!["run".to_string(), "llama3".to_string()],
        }
    }
}
