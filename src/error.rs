//! Error type shared by source adapters and summarizer backends.
//!
//! Adapters and backends return `Result<T, NewsError>`. Nothing here is
//! meant to escape to the user as a crash: the aggregator folds adapter
//! errors into an error map and the summarizer gateway turns backend errors
//! into inline strings.

use thiserror::Error;

/// Everything that can go wrong while talking to a source or a backend.
#[derive(Debug, Error)]
pub enum NewsError {
    /// Network, DNS, TLS or body-decoding failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote answered with a non-success status (bad key, quota, outage).
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// A credential needed by this source or backend was not configured.
    #[error("missing credential: {0}")]
    MissingCredential(String),

    /// The payload could not be understood.
    #[error("parse error: {0}")]
    Parse(String),

    /// The local model process could not be run or exited unsuccessfully.
    #[error("subprocess error: {0}")]
    Subprocess(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<feed_rs::parser::ParseFeedError> for NewsError {
    fn from(e: feed_rs::parser::ParseFeedError) -> Self {
        NewsError::Parse(format!("malformed feed: {e}"))
    }
}

/// Turn a non-success response into [`NewsError::Status`], keeping a short
/// excerpt of the body for display.
pub async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, NewsError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(NewsError::Status {
        status: status.as_u16(),
        body: crate::utils::truncate_for_log(body.trim(), 200),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_embeds_code() {
        let e = NewsError::Status {
            status: 401,
            body: "invalid token".to_string(),
        };
        assert_eq!(e.to_string(), "HTTP 401: invalid token");
    }

    #[test]
    fn test_missing_credential_display() {
        let e = NewsError::MissingCredential("HF_API_TOKEN".to_string());
        assert_eq!(e.to_string(), "missing credential: HF_API_TOKEN");
    }
}
