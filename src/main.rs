//! # News Lookup
//!
//! Looks up a news topic across a web search, a set of RSS feeds and the
//! GNews API, merges the results newest first and pages through them.
//! Articles can be summarized one at a time, or the whole result set can be
//! condensed into a two-stage report by an LLM backend.
//!
//! ## Features
//!
//! - Sources: DuckDuckGo HTML results, RSS/Atom feeds (BBC, Reuters,
//!   Al Jazeera by default), GNews search API
//! - Per-source toggling; a failing source never hides the others
//! - Summaries through a hosted inference API, an OpenAI-compatible chat
//!   API or a local model program
//! - Markdown output on stdout, optional JSON snapshots on disk
//!
//! ## Usage
//!
//! ```sh
//! news_lookup "climate change" --pages 2 --summarize
//! news_lookup            # interactive session
//! ```
//!
//! ## Architecture
//!
//! 1. **Sources**: each adapter fetches and normalizes articles for a topic
//! 2. **Aggregation**: enabled adapters run concurrently; results are merged
//!    and sorted, failures collected per source
//! 3. **Session**: the result set is revealed one page at a time
//! 4. **Summaries**: on demand per article, or as a report over everything

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregator;
mod cli;
mod config;
mod error;
mod models;
mod outputs;
mod repl;
mod session;
mod sources;
mod summarizer;
mod thumbnail;
mod utils;

use aggregator::Aggregator;
use cli::Cli;
use config::Config;
use outputs::json::{Snapshot, write_snapshot};
use repl::{Command, Repl};
use sources::build_sources;
use summarizer::{SummarizerGateway, build_backend};
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("news_lookup starting up");

    let args = Cli::parse();
    debug!(
        topic = ?args.topic,
        sources = ?args.sources,
        pages = args.pages,
        "Parsed CLI arguments"
    );

    let config = match Config::load(args.config.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            error!(path = ?args.config, error = %e, "Failed to load config");
            return Err(e.into());
        }
    };

    // Early check: ensure JSON output dir is writable
    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir,
                error = %e,
                "JSON output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    let client = reqwest::Client::builder().user_agent(&config.user_agent).build()?;

    let aggregator = Aggregator::new(build_sources(&config, &client, args.gnews_key.clone()));
    let enabled = aggregator.select(&args.sources);
    info!(sources = ?enabled, "Sources enabled");

    let backend_kind = args.backend.unwrap_or(config.summarizer.backend);
    let backend = build_backend(
        &config.summarizer,
        backend_kind,
        &client,
        args.hf_token.clone(),
        args.openai_api_key.clone(),
    );
    let gateway = SummarizerGateway::new(backend, config.summarizer.max_input_chars);
    info!(backend = gateway.backend_name(), "Summarizer ready");

    let mut repl = Repl::new(&aggregator, &gateway, enabled, config.page_size);
    match args.topic.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(topic) => run_once(&mut repl, &args, topic).await?,
        None => repl::run(&mut repl).await?,
    }

    let elapsed = start_time.elapsed();
    info!(elapsed_secs = elapsed.as_secs_f64(), "Finished");
    Ok(())
}

/// Search once, reveal the requested pages and optionally summarize,
/// report and snapshot.
#[instrument(
    level = "info",
    skip(repl, args),
    fields(pages = args.pages, summarize = args.summarize, report = args.report)
)]
async fn run_once(repl: &mut Repl<'_>, args: &Cli, topic: &str) -> Result<(), Box<dyn Error>> {
    let fetched_at = Utc::now();
    println!("{}", repl.execute(Command::Search(topic.to_string())).await);
    summarize_page(repl, args.summarize).await;

    for _ in 1..args.pages.max(1) {
        if !repl.session().current_page().has_more {
            break;
        }
        println!("{}", repl.execute(Command::More).await);
        summarize_page(repl, args.summarize).await;
    }

    if args.report {
        println!("{}", repl.execute(Command::Report).await);
    }

    if let Some(dir) = &args.json_output_dir {
        let session = repl.session();
        let snapshot = Snapshot {
            topic,
            fetched_at,
            articles: session.results(),
            errors: session.errors(),
            report: repl.last_report(),
        };
        let path = write_snapshot(&snapshot, dir).await?;
        info!(path = %path.display(), "Snapshot saved");
    }
    Ok(())
}

/// Print a summary for every article on the current page.
async fn summarize_page(repl: &mut Repl<'_>, enabled: bool) {
    if !enabled {
        return;
    }
    let start = repl.session().cursor();
    let count = repl.session().current_page().items.len();
    for number in start + 1..=start + count {
        println!("{}", repl.execute(Command::Summary(number)).await);
    }
}
