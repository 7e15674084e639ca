//! Local model backend: runs a program and talks to it over stdio.
//!
//! The default is `ollama run llama3`. The instruction and the text are
//! written to the child's stdin; trimmed stdout is the answer. A non-zero
//! exit is an error carrying the child's stderr.

use super::{SummaryBackend, Task};
use crate::config::LocalConfig;
use crate::error::NewsError;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
pub struct LocalModel {
    config: LocalConfig,
}

impl LocalModel {
    pub fn new(config: LocalConfig) -> Self {
        Self { config }
    }

    #[instrument(
        level = "info",
        skip(self, text),
        fields(program = %self.config.program, chars = text.len())
    )]
    async fn run(&self, task: Task, text: &str) -> Result<String, NewsError> {
        let prompt = format!("{}\n\n{}\n", task.instruction(), text);

        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                NewsError::Subprocess(format!("failed to start {}: {e}", self.config.program))
            })?;

        // A child that exits without reading its input closes the pipe early;
        // its exit status is the error worth reporting.
        if let Some(mut stdin) = child.stdin.take() {
            let written = match stdin.write_all(prompt.as_bytes()).await {
                Ok(()) => stdin.shutdown().await,
                Err(e) => Err(e),
            };
            if let Err(e) = written {
                if e.kind() != ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }

        let output = child.wait_with_output().await?;
        debug!(status = %output.status, stdout_bytes = output.stdout.len(), "Local model exited");

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let detail = if stderr.is_empty() {
                format!("{} exited with {}", self.config.program, output.status)
            } else {
                format!("{} exited with {}: {stderr}", self.config.program, output.status)
            };
            return Err(NewsError::Subprocess(detail));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl SummaryBackend for LocalModel {
    fn name(&self) -> &str {
        "local"
    }

    fn complete<'a>(
        &'a self,
        task: Task,
        text: &'a str,
    ) -> BoxFuture<'a, Result<String, NewsError>> {
        self.run(task, text).boxed()
    }
}
