//! Line-oriented command loop.
//!
//! Every command maps onto one [`Session`] or [`SummarizerGateway`]
//! operation and answers with Markdown. The one-shot mode drives the same
//! [`Repl`] so both modes render identically.

use crate::aggregator::Aggregator;
use crate::outputs::markdown::{errors_markdown, page_markdown, report_markdown, summary_markdown};
use crate::session::Session;
use crate::summarizer::{Report, SummarizerGateway};
use std::collections::BTreeSet;
use std::error::Error;
use std::io::Write as _;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

pub const HELP: &str = "\
Commands:
  search <topic>   look up a topic across the enabled sources
  more             show the next page of results
  summary <n>      summarize article n
  report           two-stage report over every result
  sources          list sources and whether they are enabled
  toggle <name>    enable or disable a source
  errors           show errors from the last search
  help             show this help
  quit             leave
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    More,
    /// 1-based article number as displayed.
    Summary(usize),
    Report,
    Sources,
    Toggle(String),
    Errors,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines are `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "search" | "s" if rest.is_empty() => return Err("Usage: search <topic>".to_string()),
            "search" | "s" => Command::Search(rest.to_string()),
            "more" | "m" => Command::More,
            "summary" => match rest.parse::<usize>() {
                Ok(n) if n > 0 => Command::Summary(n),
                _ => return Err("Usage: summary <n> (n starts at 1)".to_string()),
            },
            "report" => Command::Report,
            "sources" => Command::Sources,
            "toggle" if rest.is_empty() => return Err("Usage: toggle <source>".to_string()),
            "toggle" => Command::Toggle(rest.to_string()),
            "errors" => Command::Errors,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(format!("Unknown command `{other}`; type `help`.")),
        };
        Ok(Some(command))
    }
}

/// Session plus the services its commands need.
pub struct Repl<'a> {
    aggregator: &'a Aggregator,
    gateway: &'a SummarizerGateway,
    enabled: BTreeSet<String>,
    session: Session,
    last_report: Option<Report>,
}

impl<'a> Repl<'a> {
    pub fn new(
        aggregator: &'a Aggregator,
        gateway: &'a SummarizerGateway,
        enabled: BTreeSet<String>,
        page_size: usize,
    ) -> Self {
        Self {
            aggregator,
            gateway,
            enabled,
            session: Session::new(page_size),
            last_report: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Report produced for the current search, if any.
    pub fn last_report(&self) -> Option<&Report> {
        self.last_report.as_ref()
    }

    /// Run one command and return its Markdown answer.
    pub async fn execute(&mut self, command: Command) -> String {
        debug!(?command, "Executing command");
        match command {
            Command::Search(topic) => {
                self.session.search(self.aggregator, &self.enabled, &topic).await;
                self.last_report = None;
                format!("{}{}", self.render_page(), errors_markdown(self.session.errors()))
            }
            Command::More if !self.session.has_searched() => needs_search(),
            Command::More => {
                if self.session.show_more() {
                    self.render_page()
                } else {
                    "_No more articles._\n".to_string()
                }
            }
            Command::Summary(_) if !self.session.has_searched() => needs_search(),
            Command::Summary(n) => match self.session.article(n - 1) {
                Some(article) => {
                    let summary = self.gateway.summarize_article(article).await;
                    summary_markdown(n, article, &summary)
                }
                None => format!(
                    "No article {n}; the result set has {}.\n",
                    self.session.results().len()
                ),
            },
            Command::Report if !self.session.has_searched() => needs_search(),
            Command::Report => {
                let report = self.gateway.report(self.session.results()).await;
                let md = report_markdown(self.session.topic(), &report);
                self.last_report = Some(report);
                md
            }
            Command::Sources => self.render_sources(),
            Command::Toggle(name) => self.toggle(&name),
            Command::Errors if self.session.errors().is_empty() => "_No errors._\n".to_string(),
            Command::Errors => errors_markdown(self.session.errors()),
            Command::Help => HELP.to_string(),
            Command::Quit => String::new(),
        }
    }

    fn render_page(&self) -> String {
        page_markdown(
            self.session.topic(),
            &self.session.current_page(),
            self.session.cursor(),
            self.session.results().len(),
        )
    }

    fn render_sources(&self) -> String {
        let mut md = String::from("## Sources\n\n");
        for name in self.aggregator.source_names() {
            let mark = if self.enabled.contains(&name) { "x" } else { " " };
            md.push_str(&format!("- [{mark}] {name}\n"));
        }
        md
    }

    fn toggle(&mut self, requested: &str) -> String {
        let Some(name) = self
            .aggregator
            .source_names()
            .into_iter()
            .find(|n| n.eq_ignore_ascii_case(requested))
        else {
            return format!("Unknown source `{requested}`; type `sources`.\n");
        };
        let state = if self.enabled.remove(&name) {
            "disabled"
        } else {
            self.enabled.insert(name.clone());
            "enabled"
        };
        info!(source = %name, state, "Toggled source");
        format!("{name} {state}; it applies from the next search.\n")
    }
}

fn needs_search() -> String {
    "Search for a topic first: `search <topic>`.\n".to_string()
}

/// Read commands from stdin until `quit` or end of input.
pub async fn run(repl: &mut Repl<'_>) -> Result<(), Box<dyn Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");
    prompt()?;
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => println!("{}", repl.execute(command).await),
            Ok(None) => {}
            Err(message) => println!("{message}"),
        }
        prompt()?;
    }
    info!("Interactive session ended");
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("> ");
    std::io::stdout().flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::tests::{StubSource, article, at};
    use crate::summarizer::tests::ScriptedBackend;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("search climate change"),
            Ok(Some(Command::Search("climate change".to_string())))
        );
        assert_eq!(Command::parse("  MORE "), Ok(Some(Command::More)));
        assert_eq!(Command::parse("summary 3"), Ok(Some(Command::Summary(3))));
        assert_eq!(Command::parse("toggle BBC"), Ok(Some(Command::Toggle("BBC".to_string()))));
        assert_eq!(Command::parse("quit"), Ok(Some(Command::Quit)));
        assert_eq!(Command::parse("   "), Ok(None));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Command::parse("search").is_err());
        assert!(Command::parse("summary 0").is_err());
        assert!(Command::parse("summary two").is_err());
        assert!(Command::parse("dance").unwrap_err().contains("dance"));
    }

    fn aggregator() -> (Aggregator, Arc<std::sync::atomic::AtomicUsize>) {
        let bbc = StubSource::ok("BBC", (0..12).map(|i| article("BBC", i, at(1, 0))).collect());
        let gnews = StubSource::ok("GNews", vec![article("GNews", 0, at(2, 0))]);
        let gnews_calls = Arc::clone(&gnews.calls);
        (Aggregator::new(vec![Box::new(bbc), Box::new(gnews)]), gnews_calls)
    }

    fn all() -> BTreeSet<String> {
        ["BBC", "GNews"].iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_search_more_summary_flow() {
        let (aggregator, _) = aggregator();
        let backend = ScriptedBackend::new(vec![Ok("Short take.")]);
        let gateway = SummarizerGateway::new(Box::new(backend), 3000);
        let mut repl = Repl::new(&aggregator, &gateway, all(), 10);

        let first = repl.execute(Command::Search("topic".to_string())).await;
        assert!(first.contains("## 1. [GNews story 0]"));
        assert!(first.contains("_Showing 1-10 of 13._"));

        let second = repl.execute(Command::More).await;
        assert!(second.contains("_Showing 11-13 of 13._"));
        assert_eq!(repl.execute(Command::More).await, "_No more articles._\n");

        let summary = repl.execute(Command::Summary(1)).await;
        assert!(summary.starts_with("### Summary of 1. GNews story 0"));
        assert!(summary.contains("Short take."));

        let missing = repl.execute(Command::Summary(99)).await;
        assert!(missing.starts_with("No article 99"));
    }

    #[tokio::test]
    async fn test_commands_before_search() {
        let (aggregator, _) = aggregator();
        let gateway = SummarizerGateway::new(Box::new(ScriptedBackend::new(vec![])), 3000);
        let mut repl = Repl::new(&aggregator, &gateway, all(), 10);
        assert!(repl.execute(Command::More).await.starts_with("Search for a topic first"));
        assert!(repl.execute(Command::Report).await.starts_with("Search for a topic first"));
        assert_eq!(repl.execute(Command::Errors).await, "_No errors._\n");
    }

    #[tokio::test]
    async fn test_toggle_applies_to_next_search() {
        let (aggregator, gnews_calls) = aggregator();
        let gateway = SummarizerGateway::new(Box::new(ScriptedBackend::new(vec![])), 3000);
        let mut repl = Repl::new(&aggregator, &gateway, all(), 10);

        let toggled = repl.execute(Command::Toggle("gnews".to_string())).await;
        assert!(toggled.starts_with("GNews disabled"));
        assert!(repl.execute(Command::Sources).await.contains("- [ ] GNews"));
        repl.execute(Command::Search("topic".to_string())).await;
        assert_eq!(gnews_calls.load(Ordering::SeqCst), 0);
        assert_eq!(repl.session().results().len(), 12);

        let unknown = repl.execute(Command::Toggle("Nope".to_string())).await;
        assert!(unknown.starts_with("Unknown source"));
    }

    #[tokio::test]
    async fn test_report_is_kept_until_next_search() {
        let (aggregator, _) = aggregator();
        let backend = ScriptedBackend::new(vec![Ok("Overview."), Ok("Short.")]);
        let gateway = SummarizerGateway::new(Box::new(backend), 3000);
        let mut repl = Repl::new(&aggregator, &gateway, all(), 10);

        repl.execute(Command::Search("topic".to_string())).await;
        let md = repl.execute(Command::Report).await;
        assert!(md.contains("Overview."));
        assert_eq!(repl.last_report().map(|r| r.summary.as_str()), Some("Short."));

        repl.execute(Command::Search("other".to_string())).await;
        assert!(repl.last_report().is_none());
    }
}
