//! Groq API Client
//!
//! OpenAI-compatible chat-completions client used as the fast generation
//! capability behind the Small Mind. The user waits on this call, so it
//! runs a small instruction-tuned model.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AgentError;
use crate::generation::TextGenerator;

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
const MAX_TOKENS: usize = 1000;
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Groq API client
#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GroqClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, AgentError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        debug!("Calling Groq API: model={}, prompt_len={}", self.model, user.len());

        let response = self
            .client
            .post(GROQ_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::ExternalCall(format!("Groq API request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AgentError::ExternalCall(format!(
                "Groq API error {status}: {text}"
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::ExternalCall(format!("Groq API decode failed: {e}")))?;

        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AgentError::ExternalCall("Groq API returned no choices".to_string()))
    }
}

#[async_trait]
impl TextGenerator for GroqClient {
    async fn generate(&self, system: &str, user: &str) -> Result<String, AgentError> {
        self.complete(system, user).await
    }
}
