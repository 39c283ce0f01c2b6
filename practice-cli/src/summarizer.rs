//! Narrative generation through a hosted `generateContent` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use practice_core::Database;
use practice_core::report::{DisabledSummarizer, Summarizer, SummarizerError, summary_prompt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::settings::SummarizerConfig;

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentRequest {
    fn from_prompt(prompt: String) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text: Some(prompt) }],
            }],
        }
    }
}

impl GenerateContentResponse {
    /// Text parts of the first candidate, concatenated. Empty when the
    /// response carries no text at all.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

pub struct GeminiSummarizer {
    client: Client,
    url: String,
    api_key: String,
}

impl GeminiSummarizer {
    pub fn new(
        config: &SummarizerConfig,
        api_key: String,
    ) -> Result<Self, SummarizerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SummarizerError::NotConfigured(e.to_string()))?;
        Ok(Self {
            client,
            url: format!(
                "{}/{}:generateContent",
                config.endpoint.trim_end_matches('/'),
                config.model
            ),
            api_key,
        })
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(
        &self,
        db: &Database,
        year: i32,
    ) -> Result<String, SummarizerError> {
        let request = GenerateContentRequest::from_prompt(summary_prompt(db, year)?);
        debug!(url = %self.url, "requesting narrative");

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SummarizerError::Request(e.to_string()))?
            .error_for_status()
            .map_err(|e| SummarizerError::Request(e.to_string()))?;

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| SummarizerError::Response(e.to_string()))?;
        Ok(body.text())
    }
}

/// The HTTP summarizer when an API key is present in the configured
/// environment variable, otherwise one that always falls back.
pub fn from_config(config: &SummarizerConfig) -> Box<dyn Summarizer> {
    let Ok(api_key) = std::env::var(&config.api_key_env) else {
        info!(var = %config.api_key_env, "no API key set, narrative will use the fallback text");
        return Box::new(DisabledSummarizer {
            reason: format!("{} is not set", config.api_key_env),
        });
    };
    match GeminiSummarizer::new(config, api_key) {
        Ok(summarizer) => Box::new(summarizer),
        Err(e) => Box::new(DisabledSummarizer {
            reason: e.to_string(),
        }),
    }
}
