//! Claude API Client
//!
//! Anthropic Messages API client used as the tool-selection-grade
//! generation capability behind the Big Mind. Temperature 0 - tool
//! selection should be deterministic.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AgentError;
use crate::generation::TextGenerator;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";
const MAX_TOKENS: usize = 1000;

/// Message in conversation
#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

/// API request
#[derive(Debug, Serialize)]
struct MessageRequest {
    model: String,
    max_tokens: usize,
    temperature: f32,
    system: String,
    messages: Vec<Message>,
}

/// API response
#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    r#type: String,
    text: Option<String>,
}

/// Claude API client
#[derive(Clone)]
pub struct ClaudeClient {
    client: Client,
    api_key: String,
    model: String,
}

impl ClaudeClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, AgentError> {
        let request = MessageRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
            system: system.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: user.to_string(),
            }],
        };

        debug!("Calling Claude API: model={}, prompt_len={}", self.model, user.len());

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::ExternalCall(format!("Claude API request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AgentError::ExternalCall(format!(
                "Claude API error {status}: {text}"
            )));
        }

        let result: MessageResponse = response
            .json()
            .await
            .map_err(|e| AgentError::ExternalCall(format!("Claude API decode failed: {e}")))?;

        Ok(result
            .content
            .into_iter()
            .filter_map(|b| if b.r#type == "text" { b.text } else { None })
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

#[async_trait]
impl TextGenerator for ClaudeClient {
    async fn generate(&self, system: &str, user: &str) -> Result<String, AgentError> {
        self.complete(system, user).await
    }
}
