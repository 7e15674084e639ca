//! Markdown rendering for the terminal.
//!
//! Articles are numbered by their 1-based position in the whole result set,
//! which is the number the `summary <n>` command takes.

use crate::aggregator::Page;
use crate::models::{Article, ErrorMap, is_unknown_date};
use crate::summarizer::Report;
use chrono::{DateTime, Utc};
use std::fmt::{self, Write};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Render a publication time; the `oldest` sentinel reads "date unknown".
pub fn format_date(ts: DateTime<Utc>) -> String {
    if is_unknown_date(ts) {
        "date unknown".to_string()
    } else {
        ts.format(DATE_FORMAT).to_string()
    }
}

/// Render one page of results for `topic`.
///
/// `start` is the cursor the page was taken at and `total` the size of the
/// whole result set.
pub fn page_markdown(topic: &str, page: &Page<'_>, start: usize, total: usize) -> String {
    let mut md = String::new();
    // Writing into a String cannot fail.
    let _ = write_page(&mut md, topic, page, start, total);
    md
}

fn write_page(
    md: &mut String,
    topic: &str,
    page: &Page<'_>,
    start: usize,
    total: usize,
) -> fmt::Result {
    writeln!(md, "# News about \"{topic}\"\n")?;
    if page.items.is_empty() {
        writeln!(md, "_No articles found._")?;
        return Ok(());
    }

    for (offset, article) in page.items.iter().enumerate() {
        write_article(md, start + offset + 1, article)?;
    }

    writeln!(md, "_Showing {}-{} of {}._", start + 1, start + page.items.len(), total)?;
    if page.has_more {
        writeln!(md, "_Type `more` to show more._")?;
    }
    Ok(())
}

fn write_article(md: &mut String, number: usize, article: &Article) -> fmt::Result {
    writeln!(md, "## {number}. [{}]({})\n", article.title(), article.url())?;
    let source = match article.outlet() {
        Some(outlet) => format!("{} ({outlet})", article.source()),
        None => article.source().to_string(),
    };
    writeln!(md, "*{source} | {}*\n", format_date(article.published()))?;
    writeln!(md, "![thumbnail]({})\n", article.image())?;
    writeln!(md, "{}\n", article.display_body())?;
    writeln!(md, "---\n")
}

/// Render the per-source errors of the last search; empty when there are none.
pub fn errors_markdown(errors: &ErrorMap) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let mut md = String::from("## Errors\n\n");
    for (source, message) in errors {
        let _ = writeln!(md, "- **{source}**: {message}");
    }
    md
}

/// Render an on-demand summary of the article numbered `number`.
pub fn summary_markdown(number: usize, article: &Article, summary: &str) -> String {
    format!("### Summary of {number}. {}\n\n{summary}\n", article.title())
}

/// Render a pipeline report.
pub fn report_markdown(topic: &str, report: &Report) -> String {
    let mut md = String::new();
    let _ = write!(
        md,
        "## Report: {topic}\n\n### Overview\n\n{}\n\n### In short\n\n{}\n\n\
         _Based on {} article(s)._\n",
        report.synthesis, report.summary, report.article_count
    );
    md
}
