//! Output generation: Markdown for the terminal, JSON snapshots on disk.
//!
//! # Submodules
//!
//! - [`markdown`]: Renders pages, errors, summaries and reports as Markdown
//! - [`json`]: Writes a one-shot lookup to `{dir}/{date}/{topic}.json`

pub mod json;
pub mod markdown;
