//! Summarization gateway over interchangeable text backends.
//!
//! # Architecture
//!
//! - [`SummaryBackend`]: one call to some model, returning text or an error
//! - [`hosted`], [`chat`], [`local`]: the concrete backends
//! - [`SummarizerGateway`]: the only thing callers use; it never fails and
//!   renders every backend error as an inline `Error: ...` string
//!
//! # Modes
//!
//! - Per-article: [`SummarizerGateway::summarize_article`], called on demand
//!   for a single displayed article
//! - Pipeline: [`SummarizerGateway::report`], which synthesizes all bodies
//!   into an overview and condenses the overview into one paragraph
//!
//! There are no retries: one attempt per call.

pub mod chat;
pub mod hosted;
pub mod local;

use crate::config::{BackendKind, SummarizerConfig};
use crate::error::NewsError;
use crate::models::Article;
use crate::utils::{truncate_chars, truncate_for_log};
use futures::FutureExt;
use futures::future::BoxFuture;
use itertools::Itertools;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

pub use chat::ChatCompletion;
pub use hosted::HostedInference;
pub use local::LocalModel;

/// Returned for blank input instead of calling a backend.
pub const EMPTY_INPUT: &str = "No content available to summarize.";

/// What a backend call is for. Chat and local backends turn this into an
/// instruction; the hosted summarizer only adjusts output length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Summarize,
    Synthesize,
    Condense,
}

impl Task {
    pub fn instruction(self) -> &'static str {
        match self {
            Task::Summarize => {
                "You are a news editor. Summarize the following article in two or three \
                 plain sentences."
            }
            Task::Synthesize => {
                "You are a news analyst. Synthesize the following news snippets into a coherent, \
                 multi-paragraph overview of the topic. Mention where sources agree or disagree."
            }
            Task::Condense => "Condense the following overview into one short paragraph.",
        }
    }
}

/// A text model that can be asked to perform a [`Task`].
pub trait SummaryBackend: Send + Sync {
    fn name(&self) -> &str;

    fn complete<'a>(
        &'a self,
        task: Task,
        text: &'a str,
    ) -> BoxFuture<'a, Result<String, NewsError>>;
}

/// Stand-in backend when summarization is turned off or lacks a credential.
#[derive(Debug, Clone)]
pub struct Disabled {
    reason: String,
}

impl Disabled {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl SummaryBackend for Disabled {
    fn name(&self) -> &str {
        "disabled"
    }

    fn complete<'a>(
        &'a self,
        _task: Task,
        _text: &'a str,
    ) -> BoxFuture<'a, Result<String, NewsError>> {
        let err = NewsError::MissingCredential(self.reason.clone());
        async move { Err(err) }.boxed()
    }
}

/// Pick the backend named by `kind`, degrading to [`Disabled`] when its
/// credential is missing.
pub fn build_backend(
    config: &SummarizerConfig,
    kind: BackendKind,
    client: &reqwest::Client,
    hf_token: Option<String>,
    openai_api_key: Option<String>,
) -> Box<dyn SummaryBackend> {
    let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    match kind {
        BackendKind::Hosted => match present(hf_token) {
            Some(token) => Box::new(HostedInference::new(
                client.clone(),
                config.hosted.clone(),
                token,
            )),
            None => {
                warn!("HF_API_TOKEN not set; summaries disabled");
                Box::new(Disabled::new("HF_API_TOKEN is not set"))
            }
        },
        BackendKind::Chat => match present(openai_api_key) {
            Some(key) => Box::new(ChatCompletion::new(client.clone(), config.chat.clone(), key)),
            None => {
                warn!("OPENAI_API_KEY not set; summaries disabled");
                Box::new(Disabled::new("OPENAI_API_KEY is not set"))
            }
        },
        BackendKind::Local => Box::new(LocalModel::new(config.local.clone())),
        BackendKind::None => Box::new(Disabled::new("summarization is turned off")),
    }
}

/// Output of pipeline mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Multi-paragraph overview of every article body.
    pub synthesis: String,
    /// One short paragraph condensed from the synthesis.
    pub summary: String,
    /// Articles whose title and body made it into the synthesis input.
    pub article_count: usize,
}

/// Front door for all summarization; every method returns displayable text.
pub struct SummarizerGateway {
    backend: Box<dyn SummaryBackend>,
    max_input_chars: usize,
}

impl SummarizerGateway {
    pub fn new(backend: Box<dyn SummaryBackend>, max_input_chars: usize) -> Self {
        Self {
            backend,
            max_input_chars,
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Summarize free text. Blank input yields [`EMPTY_INPUT`]; any backend
    /// failure yields `Error: <cause>`.
    pub async fn summarize(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return EMPTY_INPUT.to_string();
        }
        render(self.call(Task::Summarize, text).await)
    }

    /// Summarize one article's body.
    #[instrument(level = "info", skip_all, fields(source = article.source(), url = article.url()))]
    pub async fn summarize_article(&self, article: &Article) -> String {
        self.summarize(article.body()).await
    }

    /// Two-stage summary of a whole result set.
    ///
    /// Makes exactly two backend calls when there is any body text. No call
    /// is made for an empty corpus, and the condense step is skipped when
    /// the synthesis step fails.
    #[instrument(level = "info", skip_all, fields(articles = articles.len()))]
    pub async fn report(&self, articles: &[Article]) -> Report {
        let with_body: Vec<&Article> = articles
            .iter()
            .filter(|a| !a.body().trim().is_empty())
            .collect();
        if with_body.is_empty() {
            info!("No article bodies to report on");
            return Report {
                synthesis: EMPTY_INPUT.to_string(),
                summary: EMPTY_INPUT.to_string(),
                article_count: 0,
            };
        }

        let (corpus, article_count) = build_corpus(&with_body, self.max_input_chars);
        if article_count < with_body.len() {
            info!(
                kept = article_count,
                dropped = with_body.len() - article_count,
                "Corpus budget reached; later articles left out of the report"
            );
        }

        let synthesis = match self.call(Task::Synthesize, &corpus).await {
            Ok(text) => text,
            Err(e) => {
                let shown = render(Err(e));
                return Report {
                    synthesis: shown.clone(),
                    summary: shown,
                    article_count,
                };
            }
        };
        let summary = render(self.call(Task::Condense, &synthesis).await);
        Report {
            synthesis,
            summary,
            article_count,
        }
    }

    async fn call(&self, task: Task, text: &str) -> Result<String, NewsError> {
        let input = truncate_chars(text.trim(), self.max_input_chars);
        if input.len() < text.trim().len() {
            debug!(kept_chars = self.max_input_chars, "Truncated summarizer input");
        }

        let t0 = Instant::now();
        let result = self.backend.complete(task, input).await.and_then(|out| {
            let out = out.trim().to_string();
            if out.is_empty() {
                Err(NewsError::Parse("backend returned no text".to_string()))
            } else {
                Ok(out)
            }
        });
        let elapsed_ms = t0.elapsed().as_millis() as u64;

        match &result {
            Ok(out) => info!(
                backend = self.backend.name(),
                ?task,
                elapsed_ms,
                preview = %truncate_for_log(out, 80),
                "Summarizer call succeeded"
            ),
            Err(e) => warn!(
                backend = self.backend.name(),
                ?task,
                elapsed_ms,
                error = %e,
                "Summarizer call failed"
            ),
        }
        result
    }
}

/// Smallest slice of the budget an article gets, so a huge result set
/// still yields readable entries instead of bare titles.
const MIN_SHARE_CHARS: usize = 120;

/// Join `title\nbody` entries into a corpus of at most `budget` characters.
///
/// Every included article gets an equal share of the budget (never less
/// than [`MIN_SHARE_CHARS`]) and is cut to fit it, so the corpus is not
/// filled by the first few articles. When the shares run out, the rest
/// are left out. Returns the corpus and how many articles it holds.
fn build_corpus(articles: &[&Article], budget: usize) -> (String, usize) {
    const SEPARATOR: &str = "\n\n";
    let fair = budget / articles.len().max(1);
    let share = fair.max(MIN_SHARE_CHARS).min(budget);
    let count = (budget / share.max(1)).clamp(1, articles.len().max(1));

    let corpus = articles
        .iter()
        .take(count)
        .map(|a| {
            let entry = format!("{}\n{}", a.title(), a.body().trim());
            let room = share.saturating_sub(SEPARATOR.len());
            truncate_chars(&entry, room).trim_end().to_string()
        })
        .join(SEPARATOR);
    (corpus, count.min(articles.len()))
}

fn render(result: Result<String, NewsError>) -> String {
    match result {
        Ok(text) => text,
        Err(e) => format!("Error: {e}"),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::aggregator::tests::{article, at};
    use std::sync::{Arc, Mutex};

    /// Backend that records its calls and replies from a script.
    pub(crate) struct ScriptedBackend {
        pub calls: Arc<Mutex<Vec<(Task, String)>>>,
        pub replies: Mutex<Vec<Result<String, String>>>,
    }

    impl ScriptedBackend {
        pub fn new(replies: Vec<Result<&str, &str>>) -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                replies: Mutex::new(
                    replies
                        .into_iter()
                        .rev()
                        .map(|r| r.map(str::to_string).map_err(str::to_string))
                        .collect(),
                ),
            }
        }
    }

    impl SummaryBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        fn complete<'a>(
            &'a self,
            task: Task,
            text: &'a str,
        ) -> BoxFuture<'a, Result<String, NewsError>> {
            self.calls.lock().unwrap().push((task, text.to_string()));
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err("no scripted reply".to_string()));
            async move {
                reply.map_err(|body| NewsError::Status { status: 500, body })
            }
            .boxed()
        }
    }

    fn gateway(backend: ScriptedBackend) -> (SummarizerGateway, Arc<Mutex<Vec<(Task, String)>>>) {
        let calls = Arc::clone(&backend.calls);
        (SummarizerGateway::new(Box::new(backend), 3000), calls)
    }

    #[tokio::test]
    async fn test_empty_text_returns_placeholder_without_calling() {
        let (gw, calls) = gateway(ScriptedBackend::new(vec![Ok("unused")]));
        assert_eq!(gw.summarize("").await, EMPTY_INPUT);
        assert_eq!(gw.summarize("   \n").await, EMPTY_INPUT);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_success_is_trimmed() {
        let (gw, calls) = gateway(ScriptedBackend::new(vec![Ok("  A short summary. \n")]));
        assert_eq!(gw.summarize("Long article text").await, "A short summary.");
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], (Task::Summarize, "Long article text".to_string()));
    }

    #[tokio::test]
    async fn test_failure_becomes_error_string() {
        let (gw, _) = gateway(ScriptedBackend::new(vec![Err("model loading")]));
        assert_eq!(gw.summarize("text").await, "Error: HTTP 500: model loading");
    }

    #[tokio::test]
    async fn test_blank_backend_output_is_error() {
        let (gw, _) = gateway(ScriptedBackend::new(vec![Ok("   ")]));
        assert!(gw.summarize("text").await.starts_with("Error: "));
    }

    #[tokio::test]
    async fn test_input_is_truncated() {
        let backend = ScriptedBackend::new(vec![Ok("ok")]);
        let calls = Arc::clone(&backend.calls);
        let gw = SummarizerGateway::new(Box::new(backend), 5);
        gw.summarize("abcdefghij").await;
        assert_eq!(calls.lock().unwrap()[0].1, "abcde");
    }

    #[tokio::test]
    async fn test_disabled_backend_never_panics() {
        let gw = SummarizerGateway::new(Box::new(Disabled::new("HF_API_TOKEN is not set")), 3000);
        assert_eq!(
            gw.summarize("text").await,
            "Error: missing credential: HF_API_TOKEN is not set"
        );
        assert_eq!(gw.summarize("").await, EMPTY_INPUT);
    }

    #[tokio::test]
    async fn test_summarize_article_uses_body() {
        let (gw, calls) = gateway(ScriptedBackend::new(vec![Ok("summary")]));
        let a = article("BBC", 1, at(1, 0));
        assert_eq!(gw.summarize_article(&a).await, "summary");
        assert_eq!(calls.lock().unwrap()[0].1, "Body of BBC story 1");
    }

    #[tokio::test]
    async fn test_report_makes_two_calls() {
        let (gw, calls) = gateway(ScriptedBackend::new(vec![Ok("Long synthesis."), Ok("Short.")]));
        let articles = vec![
            article("BBC", 0, at(1, 0)),
            Article::new("BBC", "No body", "https://example.com/x", at(1, 0)).unwrap(),
            article("GNews", 1, at(2, 0)),
        ];

        let report = gw.report(&articles).await;
        assert_eq!(report.synthesis, "Long synthesis.");
        assert_eq!(report.summary, "Short.");
        assert_eq!(report.article_count, 2);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, Task::Synthesize);
        assert_eq!(
            calls[0].1,
            "BBC story 0\nBody of BBC story 0\n\nGNews story 1\nBody of GNews story 1"
        );
        assert_eq!(calls[1], (Task::Condense, "Long synthesis.".to_string()));
    }

    fn long_article(n: usize, body_chars: usize) -> Article {
        Article::new("BBC", &format!("Story {n:02}"), &format!("https://example.com/{n}"), at(1, 0))
            .unwrap()
            .with_body("x".repeat(body_chars))
    }

    #[tokio::test]
    async fn test_report_count_matches_corpus_for_large_result_set() {
        let (gw, calls) = gateway(ScriptedBackend::new(vec![Ok("Synthesis."), Ok("Short.")]));
        let articles: Vec<Article> = (0..50).map(|n| long_article(n, 200)).collect();

        let report = gw.report(&articles).await;
        let calls = calls.lock().unwrap();
        let corpus = &calls[0].1;
        assert!(corpus.chars().count() <= 3000, "{}", corpus.chars().count());

        let included = (0..50)
            .filter(|n| corpus.contains(&format!("Story {n:02}\n")))
            .count();
        assert_eq!(report.article_count, included);
        assert_eq!(report.article_count, 3000 / MIN_SHARE_CHARS);
        // included articles are the leading ones, each with some body text
        assert!(corpus.starts_with("Story 00\nxxx"));
        assert!(corpus.contains("Story 24\nxxx"));
        assert!(!corpus.contains("Story 25"));
    }

    #[tokio::test]
    async fn test_report_shares_budget_between_long_articles() {
        let (gw, calls) = gateway(ScriptedBackend::new(vec![Ok("Synthesis."), Ok("Short.")]));
        let articles: Vec<Article> = (0..10).map(|n| long_article(n, 1000)).collect();

        let report = gw.report(&articles).await;
        assert_eq!(report.article_count, 10);

        let calls = calls.lock().unwrap();
        let corpus = &calls[0].1;
        assert!(corpus.chars().count() <= 3000);
        for n in 0..10 {
            assert!(corpus.contains(&format!("Story {n:02}\nxxx")), "story {n} missing");
        }
    }

    #[tokio::test]
    async fn test_report_stops_after_failed_synthesis() {
        let (gw, calls) = gateway(ScriptedBackend::new(vec![Err("quota exceeded"), Ok("unused")]));
        let report = gw.report(&[article("BBC", 0, at(1, 0))]).await;
        assert_eq!(report.synthesis, "Error: HTTP 500: quota exceeded");
        assert_eq!(report.summary, report.synthesis);
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_report_on_empty_corpus() {
        let (gw, calls) = gateway(ScriptedBackend::new(vec![]));
        let report = gw.report(&[]).await;
        assert_eq!(report.summary, EMPTY_INPUT);
        assert_eq!(report.article_count, 0);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_build_backend_degrades_without_credentials() {
        let config = SummarizerConfig::default();
        let client = reqwest::Client::new();
        let hosted = build_backend(&config, BackendKind::Hosted, &client, None, None);
        assert_eq!(hosted.name(), "disabled");
        assert_eq!(
            build_backend(&config, BackendKind::Chat, &client, None, Some(" ".into())).name(),
            "disabled"
        );
        assert_eq!(
            build_backend(&config, BackendKind::Hosted, &client, Some("t".into()), None).name(),
            "hosted"
        );
        assert_eq!(build_backend(&config, BackendKind::Local, &client, None, None).name(), "local");
        let none = build_backend(&config, BackendKind::None, &client, None, None);
        assert_eq!(none.name(), "disabled");
    }
}
