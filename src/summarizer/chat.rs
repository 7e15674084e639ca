//! OpenAI-compatible chat completion backend.
//!
//! The task instruction goes in as the system message and the text as the
//! user message. `temperature` and `max_tokens` are passed through from
//! config untouched.

use super::{SummaryBackend, Task};
use crate::config::ChatConfig;
use crate::error::{NewsError, check_status};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct ChatCompletion {
    client: reqwest::Client,
    config: ChatConfig,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl ChatCompletion {
    pub fn new(client: reqwest::Client, config: ChatConfig, api_key: String) -> Self {
        Self { client, config, api_key }
    }

    #[instrument(
        level = "info",
        skip(self, text),
        fields(model = %self.config.model, chars = text.len())
    )]
    async fn chat(&self, task: Task, text: &str) -> Result<String, NewsError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: task.instruction(),
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };
        let resp = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let body: ChatResponse = check_status(resp).await?.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| NewsError::Parse("chat completion returned no choices".to_string()))
    }
}

impl SummaryBackend for ChatCompletion {
    fn name(&self) -> &str {
        "chat"
    }

    fn complete<'a>(
        &'a self,
        task: Task,
        text: &'a str,
    ) -> BoxFuture<'a, Result<String, NewsError>> {
        self.chat(task, text).boxed()
    }
}
