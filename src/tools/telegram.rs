//! Telegram notification tool
//!
//! Thin wrapper over the Bot API `sendMessage` endpoint. The tool result's
//! `success` mirrors the provider's `ok` field.

use reqwest::Client;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::AgentError;
use crate::tools::ToolResult;

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

pub struct TelegramSender {
    client: Client,
    bot_token: String,
    chat_id: String,
    base_url: String,
}

impl TelegramSender {
    pub fn new(bot_token: &str, chat_id: &str) -> Self {
        Self {
            client: Client::new(),
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
            base_url: TELEGRAM_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Send a message, returning the raw provider response.
    pub async fn send(&self, message: &str) -> Result<Value, AgentError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token);
        let payload = json!({
            "chat_id": self.chat_id,
            "text": message,
            "parse_mode": "Markdown",
        });

        debug!("Sending telegram message to chat {}", self.chat_id);

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AgentError::ExternalCall(format!("telegram request failed: {e}")))?;

        response
            .json()
            .await
            .map_err(|e| AgentError::ExternalCall(format!("telegram decode failed: {e}")))
    }

    pub async fn run(&self, params: &Map<String, Value>) -> ToolResult {
        let Some(message) = params.get("message").and_then(Value::as_str) else {
            return ToolResult::fail("parameter 'message' must be a string");
        };

        match self.send(message).await {
            Ok(body) => {
                let ok = body.get("ok").and_then(Value::as_bool).unwrap_or(false);
                ToolResult {
                    success: ok,
                    details: body,
                }
            }
            Err(e) => ToolResult::fail(format!("telegram send failed: {e}")),
        }
    }
}
