//! Gemini `generateContent` client.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new(api_key)
//!     .with_model("gemini-2.5-flash")
//!     .with_timeout(Duration::from_secs(30));
//!
//! let reporter = GeminiReporter::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use viability_core::{NarrativeReporter, ReportError, ReportSnapshot};

use crate::config::GeminiConfig;
use crate::prompt::build_prompt;

pub struct GeminiReporter {
    config: GeminiConfig,
    client: Client,
}

impl GeminiReporter {
    pub fn new(config: GeminiConfig) -> Result<Self, ReportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ReportError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    async fn send_request(
        &self,
        prompt: String,
    ) -> Result<Response, ReportError> {
        if self.config.api_key().trim().is_empty() {
            return Err(ReportError::MissingApiKey);
        }

        self.client
            .post(self.config.generate_url())
            .header("x-goog-api-key", self.config.api_key())
            .json(&GenerateRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ReportError::Timeout {
                        secs: self.config.timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    ReportError::Network(format!("Connection failed: {}", e))
                } else {
                    ReportError::Network(e.to_string())
                }
            })
    }

    async fn parse_response(
        &self,
        response: Response,
    ) -> Result<String, ReportError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "gemini request rejected");
            return Err(ReportError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ReportError::Network(format!("Failed to read response: {}", e)))?;
        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| ReportError::Parse(format!("Failed to parse response: {}", e)))?;

        parsed.text().ok_or(ReportError::EmptyResponse)
    }
}

#[async_trait]
impl NarrativeReporter for GeminiReporter {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(
        &self,
        snapshot: &ReportSnapshot,
    ) -> Result<String, ReportError> {
        debug!(model = %self.config.model, "sending gemini request");
        let response = self.send_request(build_prompt(snapshot)).await?;
        let text = self.parse_response(response).await?;
        Ok(strip_code_fence(&text).to_string())
    }
}

/// Removes a surrounding Markdown code fence (```` ```html ... ``` ````).
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    match body.split_once('\n') {
        Some((info, inner)) if !info.contains('<') => inner.trim(),
        _ => body.trim(),
    }
}

// ----- Gemini API Types -----

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

impl GenerateRequest {
    fn from_prompt(prompt: String) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text: Some(prompt) }],
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate; `None` when blank.
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}
