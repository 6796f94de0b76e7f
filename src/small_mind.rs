//! Small Mind - Fast Responder
//!
//! Synchronous, low-latency classifier and conversationalist. Invoked once
//! per inbound user message; decides whether the request needs background
//! action and drafts the user-facing reply. It never invokes tools itself
//! and never raises to the caller - every failure collapses into a
//! conversational fallback.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::generation::TextGenerator;
use crate::parser::parse_payload;
use crate::tools::REGISTRY;

const APOLOGY_REPLY: &str = "I apologize, but I encountered an error processing your request. \
Could you please rephrase it?";

/// Fast Responder output. Produced fresh per message, never mutated;
/// only `user_reply` survives into the visible transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub needs_background_action: bool,
    #[serde(default)]
    pub action_name: Option<String>,
    pub user_reply: String,
}

impl Decision {
    fn conversational(user_reply: String) -> Self {
        Self {
            needs_background_action: false,
            action_name: None,
            user_reply,
        }
    }
}

pub struct SmallMind {
    generator: Arc<dyn TextGenerator>,
    system_prompt: String,
}

impl SmallMind {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            system_prompt: build_system_prompt(),
        }
    }

    /// Classify a user message and draft the immediate reply.
    ///
    /// `context` is an optional short hint from the surrounding app layer,
    /// e.g. "user just uploaded an image".
    pub async fn process_message(&self, user_message: &str, context: Option<&str>) -> Decision {
        let user = match context {
            Some(ctx) => format!("[context: {ctx}]\n{user_message}"),
            None => user_message.to_string(),
        };

        let raw = match self.generator.generate(&self.system_prompt, &user).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Small Mind generation failed: {}", e);
                return Decision::conversational(format!(
                    "I encountered an error: {e}. Please try again."
                ));
            }
        };

        match parse_payload::<Decision>(&raw) {
            Ok(mut decision) => {
                if decision.user_reply.trim().is_empty() {
                    decision.user_reply = APOLOGY_REPLY.to_string();
                }
                debug!(
                    "Small Mind decision: needs_background_action={}, action_name={:?}",
                    decision.needs_background_action, decision.action_name
                );
                decision
            }
            Err(e) => {
                warn!("Small Mind output unparseable: {}", e);
                Decision::conversational(APOLOGY_REPLY.to_string())
            }
        }
    }
}

fn build_system_prompt() -> String {
    let capabilities: Vec<String> = REGISTRY
        .iter()
        .map(|spec| format!("- {}: {}", spec.name, spec.description))
        .collect();
    let names: Vec<&str> = REGISTRY.iter().map(|spec| spec.name).collect();

    format!(
        r#"You are an AI Chief Marketing Officer's interface. You handle all communication with users and coordinate with background systems when needed. Your responses should be quick, friendly, and informative.

When actions like content creation or report generation are needed, you delegate to background systems while maintaining communication with the user.

Background capabilities:
{capabilities}

Always respond with a JSON in this format:
{{
    "needs_background_action": boolean,
    "action_name": string | null,
    "user_reply": string
}}
"action_name" must be one of: [{names}] or null.

Example responses:
For "Can you create a video ad from my product image?":
{{
    "needs_background_action": true,
    "action_name": "Create_Ad_from_Image",
    "user_reply": "I'll have our creative team work on a video ad from your image. They'll process this request in the background. In the meantime, is there anything else you'd like to discuss about your marketing strategy?"
}}

For "Write a performance report for Q1":
{{
    "needs_background_action": true,
    "action_name": "Write_Report",
    "user_reply": "I've initiated the Q1 performance report generation. While that's processing, would you like to discuss any specific aspects of the Q1 performance?"
}}

For "What do you think about email marketing?":
{{
    "needs_background_action": false,
    "action_name": null,
    "user_reply": "Email marketing is a powerful tool for..."
}}

Remember:
1. You are the only one communicating with the user
2. For actions requiring tools, acknowledge the task and inform about background processing
3. Keep the conversation flowing naturally even when tasks are being processed"#,
        capabilities = capabilities.join("\n"),
        names = names.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use async_trait::async_trait;

    struct Canned(Result<&'static str, &'static str>);

    #[async_trait]
    impl TextGenerator for Canned {
        async fn generate(&self, _system: &str, _user: &str) -> Result<String, AgentError> {
            match self.0 {
                Ok(text) => Ok(text.to_string()),
                Err(msg) => Err(AgentError::ExternalCall(msg.to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_parses_embedded_decision() {
        let mind = SmallMind::new(Arc::new(Canned(Ok(
            r#"Sure thing! {"needs_background_action": true, "action_name": "Write_Report", "user_reply": "On it."}"#,
        ))));
        let decision = mind.process_message("Write a Q1 report", None).await;
        assert!(decision.needs_background_action);
        assert_eq!(decision.action_name.as_deref(), Some("Write_Report"));
        assert_eq!(decision.user_reply, "On it.");
    }

    #[tokio::test]
    async fn test_unparseable_output_falls_back_to_apology() {
        let mind = SmallMind::new(Arc::new(Canned(Ok("no structure at all"))));
        let decision = mind.process_message("hello", None).await;
        assert!(!decision.needs_background_action);
        assert!(decision.action_name.is_none());
        assert_eq!(decision.user_reply, APOLOGY_REPLY);
    }

    #[tokio::test]
    async fn test_generation_failure_stays_local() {
        let mind = SmallMind::new(Arc::new(Canned(Err("network down"))));
        let decision = mind.process_message("hello", None).await;
        assert!(!decision.needs_background_action);
        assert!(decision.user_reply.contains("network down"));
    }

    #[tokio::test]
    async fn test_empty_reply_is_replaced() {
        let mind = SmallMind::new(Arc::new(Canned(Ok(
            r#"{"needs_background_action": false, "action_name": null, "user_reply": "  "}"#,
        ))));
        let decision = mind.process_message("hello", None).await;
        assert_eq!(decision.user_reply, APOLOGY_REPLY);
    }

    #[test]
    fn test_decision_round_trip() {
        let decision = Decision {
            needs_background_action: true,
            action_name: Some("Create_Ad_from_Image".to_string()),
            user_reply: "Working on it.".to_string(),
        };
        let text = serde_json::to_string(&decision).unwrap();
        let reparsed: Decision = parse_payload(&text).unwrap();
        assert_eq!(reparsed, decision);
    }

    #[test]
    fn test_system_prompt_lists_every_tool() {
        let prompt = build_system_prompt();
        for spec in REGISTRY.iter() {
            assert!(prompt.contains(spec.name));
        }
    }
}
