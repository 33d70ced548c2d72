//! Chat-completions client for an OpenRouter-compatible endpoint.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use dmfinder_shared::{DmfinderError, ExtractedContact, LlmConfig, Result};

use crate::prompt::{SYSTEM_PROMPT, user_message};
use crate::recovery::parse_contacts;

/// User-Agent string for LLM requests.
const USER_AGENT: &str = concat!("dmfinder/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
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
    #[serde(default)]
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// ContactExtractor
// ---------------------------------------------------------------------------

/// Extracts contacts from a formatted search summary via a language model.
///
/// Cloning shares the underlying connection pool.
#[derive(Clone)]
pub struct ContactExtractor {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl ContactExtractor {
    /// Build an extractor from config and the provider API key.
    pub fn new(config: &LlmConfig, api_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| DmfinderError::config(format!("invalid LLM API key: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DmfinderError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Model identifier requests are sent with.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Extract contacts from `summary`. Never fails: provider errors and
    /// unusable replies are logged and yield no contacts.
    #[instrument(skip_all, fields(model = %self.model, summary_len = summary.len()))]
    pub async fn extract(&self, summary: &str) -> Vec<ExtractedContact> {
        match self.complete(summary).await {
            Ok(content) => parse_contacts(&content),
            Err(e) => {
                warn!(error = %e, "contact extraction failed");
                Vec::new()
            }
        }
    }

    /// Send one chat completion and return the first choice's text.
    async fn complete(&self, summary: &str) -> Result<String> {
        let user = user_message(summary);
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| DmfinderError::Network(format!("LLM request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DmfinderError::Extraction(format!(
                "LLM API error ({status}): {}",
                body.chars().take(500).collect::<String>()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| DmfinderError::parse(format!("invalid LLM response: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| DmfinderError::Extraction("LLM response has no content".into()))?;

        debug!(content_len = content.len(), "LLM reply received");
        Ok(content)
    }
}
