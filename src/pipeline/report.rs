//! Report-generation service client (OpenAI-compatible chat completions).
//!
//! No request timeout is applied: a hung upstream holds the request open.
//! There are no retries; any failure fails the analysis.

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Report service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed report response: {0}")]
    ResponseParsing(String),

    #[error("Report service returned no content")]
    EmptyResponse,
}

/// Something that drafts a narrative report from a system message and prompt.
pub trait ReportGenerator: Send + Sync {
    fn generate<'a>(
        &'a self,
        system: &'a str,
        prompt: &'a str,
    ) -> BoxFuture<'a, Result<String, ReportError>>;
}

/// Chat-completions client for report drafting.
pub struct ChatCompletionsClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

/// Request body for `/chat/completions`
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Response body from `/chat/completions`
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl ChatCompletionsClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Result<Self, ReportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ReportError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
        })
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ReportError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ReportError::HttpClient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ReportError::ResponseParsing(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ReportError::EmptyResponse)
    }
}

impl ReportGenerator for ChatCompletionsClient {
    fn generate<'a>(
        &'a self,
        system: &'a str,
        prompt: &'a str,
    ) -> BoxFuture<'a, Result<String, ReportError>> {
        Box::pin(self.complete(system, prompt))
    }
}

/// Mock report generator for testing: returns a configured report and
/// remembers the last prompt it was given.
#[cfg(test)]
pub(crate) struct MockReportGenerator {
    result: Result<String, String>,
    last_prompt: std::sync::Mutex<Option<String>>,
}

#[cfg(test)]
impl MockReportGenerator {
    pub fn new(report: &str) -> Self {
        Self {
            result: Ok(report.to_string()),
            last_prompt: std::sync::Mutex::new(None),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            last_prompt: std::sync::Mutex::new(None),
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl ReportGenerator for MockReportGenerator {
    fn generate<'a>(
        &'a self,
        _system: &'a str,
        prompt: &'a str,
    ) -> BoxFuture<'a, Result<String, ReportError>> {
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        let result = self.result.clone().map_err(ReportError::HttpClient);
        Box::pin(async move { result })
    }
}
