//! Hosted inference backend (Hugging Face Inference API style).
//!
//! `POST {endpoint}/{model}` with a bearer token and
//! `{"inputs": ..., "parameters": {...}}`. Summarization models answer with
//! `[{"summary_text": ...}]`, text-generation models with
//! `[{"generated_text": ...}]`; both are accepted.

use super::{SummaryBackend, Task};
use crate::config::HostedConfig;
use crate::error::{NewsError, check_status};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::{Value, json};
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct HostedInference {
    client: reqwest::Client,
    config: HostedConfig,
    token: String,
}

impl HostedInference {
    pub fn new(client: reqwest::Client, config: HostedConfig, token: String) -> Self {
        Self { client, config, token }
    }

    fn url(&self) -> String {
        format!("{}/{}", self.config.endpoint.trim_end_matches('/'), self.config.model)
    }

    /// Summarization models take no instruction; a synthesis just gets more room.
    fn length_bounds(&self, task: Task) -> (u32, u32) {
        match task {
            Task::Synthesize => (self.config.min_length * 2, self.config.max_length * 3),
            Task::Summarize | Task::Condense => (self.config.min_length, self.config.max_length),
        }
    }

    #[instrument(
        level = "info",
        skip(self, text),
        fields(model = %self.config.model, chars = text.len())
    )]
    async fn infer(&self, task: Task, text: &str) -> Result<String, NewsError> {
        let (min_length, max_length) = self.length_bounds(task);
        let payload = json!({
            "inputs": text,
            "parameters": {
                "min_length": min_length,
                "max_length": max_length,
                "do_sample": false,
            }
        });
        let resp = self
            .client
            .post(self.url())
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;
        let body: Value = check_status(resp).await?.json().await?;
        extract_text(&body)
    }
}

impl SummaryBackend for HostedInference {
    fn name(&self) -> &str {
        "hosted"
    }

    fn complete<'a>(
        &'a self,
        task: Task,
        text: &'a str,
    ) -> BoxFuture<'a, Result<String, NewsError>> {
        self.infer(task, text).boxed()
    }
}

fn extract_text(body: &Value) -> Result<String, NewsError> {
    if let Some(err) = body.get("error").and_then(Value::as_str) {
        return Err(NewsError::Parse(format!("inference API error: {err}")));
    }
    body.as_array()
        .and_then(|items| items.first())
        .and_then(|first| first.get("summary_text").or_else(|| first.get("generated_text")))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| NewsError::Parse(format!("unexpected inference response: {body}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn config(server: &mockito::Server) -> HostedConfig {
        HostedConfig {
            endpoint: format!("{}/models/", server.url()),
            model: "facebook/bart-large-cnn".to_string(),
            min_length: 30,
            max_length: 130,
        }
    }

    #[tokio::test]
    async fn test_summary_text_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/facebook/bart-large-cnn")
            .match_header("authorization", "Bearer hf_test")
            .match_body(Matcher::PartialJson(json!({
                "inputs": "Some long article",
                "parameters": { "min_length": 30, "max_length": 130, "do_sample": false }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"summary_text": "A summary."}]"#)
            .create_async()
            .await;

        let backend =
            HostedInference::new(reqwest::Client::new(), config(&server), "hf_test".into());
        let out = backend.complete(Task::Summarize, "Some long article").await.unwrap();
        mock.assert_async().await;
        assert_eq!(out, "A summary.");
    }

    #[tokio::test]
    async fn test_synthesis_gets_longer_bounds() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/facebook/bart-large-cnn")
            .match_body(Matcher::PartialJson(json!({
                "parameters": { "min_length": 60, "max_length": 390 }
            })))
            .with_status(200)
            .with_body(r#"[{"generated_text": "Overview."}]"#)
            .create_async()
            .await;

        let backend =
            HostedInference::new(reqwest::Client::new(), config(&server), "hf_test".into());
        let out = backend.complete(Task::Synthesize, "snippets").await.unwrap();
        mock.assert_async().await;
        assert_eq!(out, "Overview.");
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/facebook/bart-large-cnn")
            .with_status(503)
            .with_body(r#"{"error":"Model is currently loading"}"#)
            .create_async()
            .await;

        let backend =
            HostedInference::new(reqwest::Client::new(), config(&server), "hf_test".into());
        let err = backend.complete(Task::Summarize, "text").await.unwrap_err();
        assert_eq!(err.to_string(), r#"HTTP 503: {"error":"Model is currently loading"}"#);
    }

    #[test]
    fn test_extract_text_shapes() {
        assert_eq!(extract_text(&json!([{"summary_text": "x"}])).unwrap(), "x");
        assert!(matches!(extract_text(&json!({"error": "bad"})), Err(NewsError::Parse(_))));
        assert!(matches!(extract_text(&json!([])), Err(NewsError::Parse(_))));
    }
}
