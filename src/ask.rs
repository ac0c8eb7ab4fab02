//! Client for the question-answering `/ask` endpoint

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Body of `POST {base_url}/ask`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    pub top_k: u32,
}

/// Successful response body
#[derive(Debug, Clone, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

/// Optional error body returned with non-2xx statuses.
///
/// `detail` is kept as a raw value because validation failures report a list
/// of objects instead of a string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Non-empty string detail, if any
    pub fn into_detail(self) -> Option<String> {
        match self.detail {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
            _ => None,
        }
    }
}

/// Ways a query can fail
#[derive(Debug, thiserror::Error)]
pub enum AskError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}")]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("request aborted before completion")]
    Aborted,
}

impl AskError {
    /// Server-supplied detail suitable for display
    pub fn detail(&self) -> Option<&str> {
        match self {
            AskError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// Anything that can answer a question
#[async_trait]
pub trait AskBackend: Send + Sync {
    async fn ask(&self, request: &AskRequest) -> Result<String, AskError>;
}

/// `reqwest` implementation of [`AskBackend`]
#[derive(Clone)]
pub struct HttpAskClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAskClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            endpoint: ask_endpoint(base_url),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AskBackend for HttpAskClient {
    async fn ask(&self, request: &AskRequest) -> Result<String, AskError> {
        tracing::debug!(endpoint = %self.endpoint, top_k = request.top_k, "sending question");

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let detail = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::into_detail);
            return Err(AskError::Status { status, detail });
        }

        let parsed: AskResponse = serde_json::from_slice(&body)
            .map_err(|e| AskError::Malformed(e.to_string()))?;
        Ok(parsed.answer)
    }
}

/// Join the base URL and the `/ask` path
pub fn ask_endpoint(base_url: &str) -> String {
    format!("{}/ask", base_url.trim_end_matches('/'))
}
