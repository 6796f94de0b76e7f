//! Big Mind - Background Agent
//!
//! Authoritative tool selection and execution. Re-classifies the original
//! user message independently of the Small Mind's advisory hint, validates
//! the chosen tool against the registry, and runs it through the invoker.
//! Every failure mode maps to a `ToolCall` with `requires_tool = false`
//! and a reason; nothing raises to the dispatcher.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::generation::TextGenerator;
use crate::parser::parse_payload;
use crate::tools::{ToolInvoker, ToolName, ToolResult, REGISTRY};

/// Background Agent output, suitable for logging. Not returned to the
/// user directly - the user already received the Small Mind's reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub requires_tool: bool,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_execution_result: Option<ToolResult>,
}

impl ToolCall {
    fn declined(reason: String) -> Self {
        Self {
            requires_tool: false,
            tool_name: None,
            reason,
            parameters: Map::new(),
            tool_execution_result: None,
        }
    }
}

pub struct BigMind {
    generator: Arc<dyn TextGenerator>,
    invoker: Arc<ToolInvoker>,
    system_prompt: String,
}

impl BigMind {
    pub fn new(generator: Arc<dyn TextGenerator>, invoker: Arc<ToolInvoker>) -> Self {
        Self {
            generator,
            invoker,
            system_prompt: build_system_prompt(),
        }
    }

    /// Resolve and execute a tool for the original user message.
    pub async fn process_request(&self, user_message: &str) -> ToolCall {
        let raw = match self.generator.generate(&self.system_prompt, user_message).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Big Mind generation failed: {}", e);
                return ToolCall::declined(format!("error processing request: {e}"));
            }
        };

        let mut call: ToolCall = match parse_payload(&raw) {
            Ok(call) => call,
            Err(e) => {
                warn!("Big Mind output unparseable: {}", e);
                return ToolCall::declined(format!("error parsing response: {e}"));
            }
        };
        // Model output never carries an execution result; scrub any echo.
        call.tool_execution_result = None;

        if !call.requires_tool {
            info!("Big Mind declined tool use: {}", call.reason);
            return call;
        }

        let Some(name) = call.tool_name.clone() else {
            return ToolCall::declined("tool required but no tool name given".to_string());
        };
        if ToolName::from_str(&name).is_none() {
            warn!("Big Mind selected unregistered tool: {}", name);
            return ToolCall::declined(format!("unknown tool: {name}"));
        }

        let result = self.invoker.invoke(&name, &call.parameters).await;
        info!(
            "Tool {} executed: success={}",
            name, result.success
        );
        call.tool_execution_result = Some(result);
        call
    }
}

fn build_system_prompt() -> String {
    let tools: Vec<String> = REGISTRY
        .iter()
        .map(|spec| {
            format!(
                "- {}: {} (required parameters: {})",
                spec.name,
                spec.description,
                spec.required_parameters.join(", ")
            )
        })
        .collect();

    format!(
        r#"You are an AI Chief Marketing Officer with access to several tools. Your role is to analyze user requests and determine if and which tools should be used to fulfill them.

Available tools:
{tools}

When you receive a message, you should:
1. Analyze if the request requires using any of the available tools
2. Return a JSON response in the following format:
{{
    "requires_tool": true/false,
    "tool_name": "name_of_tool_or_null",
    "reason": "explanation of your decision",
    "parameters": {{}}
}}
"parameters" must contain every required parameter of the chosen tool.

Example user messages and responses:
"Can you create a video ad from this product image?"
-> {{"requires_tool": true, "tool_name": "Create_Ad_from_Image", "reason": "User explicitly requested video ad creation", "parameters": {{"image_path": "path_to_image", "video_description": "user_description"}}}}

"Send a message to the team about our new campaign launch"
-> {{"requires_tool": true, "tool_name": "Send_Message", "reason": "User asked to notify the team", "parameters": {{"message": "Our new campaign has launched!"}}}}

"How did our campaigns perform in Q1?"
-> {{"requires_tool": true, "tool_name": "Campaign_Insight", "reason": "User asked for campaign performance data", "parameters": {{"start_date": "2024-01-01", "end_date": "2024-03-31"}}}}

"What do you think about our marketing strategy?"
-> {{"requires_tool": false, "tool_name": null, "reason": "This is a general discussion query that doesn't require tool usage", "parameters": {{}}}}

Remember: Only suggest using a tool when it's clearly needed to fulfill the user's request."#,
        tools = tools.join("\n"),
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

    struct NoGen;

    #[async_trait]
    impl TextGenerator for NoGen {
        async fn generate(&self, _system: &str, _user: &str) -> Result<String, AgentError> {
            Err(AgentError::ExternalCall("no generator in tests".to_string()))
        }
    }

    fn mind(output: Result<&'static str, &'static str>) -> BigMind {
        let invoker = Arc::new(ToolInvoker::new(Arc::new(NoGen)));
        BigMind::new(Arc::new(Canned(output)), invoker)
    }

    #[tokio::test]
    async fn test_no_tool_passes_through() {
        let call = mind(Ok(
            r#"{"requires_tool": false, "tool_name": null, "reason": "just chat", "parameters": {}}"#,
        ))
        .process_request("thoughts on branding?")
        .await;
        assert!(!call.requires_tool);
        assert!(call.tool_execution_result.is_none());
    }

    #[tokio::test]
    async fn test_unknown_tool_is_demoted() {
        let call = mind(Ok(
            r#"{"requires_tool": true, "tool_name": "Mint_NFT", "reason": "why not", "parameters": {}}"#,
        ))
        .process_request("mint an nft")
        .await;
        assert!(!call.requires_tool);
        assert!(call.reason.contains("Mint_NFT"));
        assert!(call.tool_execution_result.is_none());
    }

    #[tokio::test]
    async fn test_missing_parameters_surface_as_failed_result() {
        let call = mind(Ok(
            r#"{"requires_tool": true, "tool_name": "Post_Video_Ad", "reason": "publish it", "parameters": {"remote_file_path": "https://cdn/v.mp4", "file_name": "v.mp4", "description": "d"}}"#,
        ))
        .process_request("post the video ad")
        .await;
        assert!(call.requires_tool);
        let result = call.tool_execution_result.expect("invoker should have run");
        assert!(!result.success);
        assert!(result.details.as_str().unwrap().contains("title"));
    }

    #[tokio::test]
    async fn test_generation_failure_is_declined() {
        let call = mind(Err("provider offline")).process_request("anything").await;
        assert!(!call.requires_tool);
        assert!(call.reason.contains("provider offline"));
    }

    #[tokio::test]
    async fn test_parse_failure_is_declined() {
        let call = mind(Ok("I would use a tool but forgot the JSON"))
            .process_request("anything")
            .await;
        assert!(!call.requires_tool);
        assert!(call.reason.contains("error parsing response"));
    }

    #[test]
    fn test_tool_call_round_trip() {
        let mut parameters = Map::new();
        parameters.insert("message".to_string(), Value::from("hello team"));
        let call = ToolCall {
            requires_tool: true,
            tool_name: Some("Send_Message".to_string()),
            reason: "notify".to_string(),
            parameters,
            tool_execution_result: None,
        };

        let text = serde_json::to_string(&call).unwrap();
        let reparsed: ToolCall = parse_payload(&text).unwrap();
        assert_eq!(reparsed, call);
    }
}
