use crate::config::AnswerServiceConfig;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Returned when the service replies without an `answer` field
pub const NO_ANSWER_TEXT: &str = "No answer received.";

/// External question-answering service.
///
/// Implementations may take arbitrarily long and may fail; the dispatcher
/// turns every failure into a displayable error result.
#[async_trait]
pub trait AnswerService: Send + Sync {
    /// Answer a free-text query
    async fn answer(&self, query: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct FaqResponse {
    #[serde(default)]
    answer: Option<String>,
}

/// HTTP client for a FAQ-style endpoint: `GET <url>?query=<text>` returning
/// `{"answer": "..."}`.
pub struct HttpAnswerService {
    http_client: Client,
    url: String,
}

impl HttpAnswerService {
    pub fn new(config: &AnswerServiceConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent("sightline/0.1");
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self {
            http_client,
            url: config.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AnswerService for HttpAnswerService {
    async fn answer(&self, query: &str) -> Result<String> {
        let response = self
            .http_client
            .get(&self.url)
            .query(&[("query", query)])
            .send()
            .await
            .context("Failed to send answer request")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Answer service error: {}", status));
        }

        let body: FaqResponse = response
            .json()
            .await
            .context("Failed to parse answer response")?;

        Ok(body.answer.unwrap_or_else(|| NO_ANSWER_TEXT.to_string()))
    }
}
