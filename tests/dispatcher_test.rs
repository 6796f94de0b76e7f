//! Dispatcher Integration Tests
//!
//! End-to-end message flow with scripted generation capabilities: the
//! conversational path, the delegation path, and the ordering guarantees
//! of the interaction log.

use std::sync::Arc;

use async_trait::async_trait;
use cmo_agent::{
    AgentError, BigMind, Dispatcher, InteractionLogger, LogEntry, Origin, SmallMind,
    TextGenerator, ToolInvoker,
};
use tempfile::TempDir;

/// Generator that always returns the same canned output.
struct Canned(&'static str);

#[async_trait]
impl TextGenerator for Canned {
    async fn generate(&self, _system: &str, _user: &str) -> Result<String, AgentError> {
        Ok(self.0.to_string())
    }
}

/// Generator that always fails, standing in for unconfigured capabilities.
struct Offline;

#[async_trait]
impl TextGenerator for Offline {
    async fn generate(&self, _system: &str, _user: &str) -> Result<String, AgentError> {
        Err(AgentError::ExternalCall("offline".to_string()))
    }
}

fn build_dispatcher(
    small_output: &'static str,
    big_output: &'static str,
) -> (Dispatcher, Arc<InteractionLogger>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = Arc::new(InteractionLogger::new(temp_dir.path().join("interactions.log")));

    let invoker = Arc::new(ToolInvoker::new(Arc::new(Offline)));
    let dispatcher = Dispatcher::new(
        Arc::new(SmallMind::new(Arc::new(Canned(small_output)))),
        Arc::new(BigMind::new(Arc::new(Canned(big_output)), invoker)),
        logger.clone(),
    );
    (dispatcher, logger, temp_dir)
}

fn read_entries(logger: &InteractionLogger) -> Vec<LogEntry> {
    let raw = std::fs::read_to_string(logger.path()).expect("log file should exist");
    serde_json::Deserializer::from_str(&raw)
        .into_iter::<LogEntry>()
        .map(|entry| entry.expect("log records should parse"))
        .collect()
}

#[tokio::test]
async fn test_conversational_message_stays_local() {
    let (dispatcher, logger, _temp) = build_dispatcher(
        r#"{"needs_background_action": false, "action_name": null, "user_reply": "Email marketing still has the best ROI of any channel."}"#,
        r#"{"requires_tool": false, "tool_name": null, "reason": "unused", "parameters": {}}"#,
    );

    let outcome = dispatcher
        .handle_message("What do you think about email marketing?", None)
        .await;

    assert!(outcome.background.is_none());
    assert!(!outcome.decision.needs_background_action);
    assert!(!outcome.reply.is_empty());

    let entries = read_entries(&logger);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].origin, Origin::User);
    assert_eq!(entries[1].origin, Origin::SmallMind);
}

#[tokio::test]
async fn test_delegated_message_runs_big_mind() {
    let (dispatcher, logger, _temp) = build_dispatcher(
        r#"{"needs_background_action": true, "action_name": "Send_Message", "user_reply": "I'll notify the team right away."}"#,
        r#"{"requires_tool": true, "tool_name": "Send_Message", "reason": "User asked to notify the team", "parameters": {"message": "Our new campaign has launched!"}}"#,
    );

    let outcome = dispatcher
        .handle_message("Send a message to the team about our new campaign launch", None)
        .await;

    assert_eq!(outcome.reply, "I'll notify the team right away.");
    let handle = outcome.background.expect("delegation should spawn a task");
    handle.await.unwrap();

    let entries = read_entries(&logger);
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].origin, Origin::User);
    assert_eq!(entries[1].origin, Origin::SmallMind);
    assert_eq!(entries[2].origin, Origin::BigMind);

    // Big Mind independently resolved the tool and carried its parameters.
    let tool_call = &entries[2].content;
    assert_eq!(tool_call["tool_name"], "Send_Message");
    let message = tool_call["parameters"]["message"].as_str().unwrap();
    assert!(!message.is_empty());

    // Tool execution ran and recorded its outcome (no Telegram configured
    // here, so it fails cleanly without raising).
    let result = &tool_call["tool_execution_result"];
    assert_eq!(result["success"], false);
    assert!(result["details"].as_str().unwrap().contains("not configured"));
}

#[tokio::test]
async fn test_big_mind_disagreeing_with_hint_is_authoritative() {
    // Small Mind hints Write_Report, Big Mind re-classifies to no tool.
    let (dispatcher, logger, _temp) = build_dispatcher(
        r#"{"needs_background_action": true, "action_name": "Write_Report", "user_reply": "Starting the report."}"#,
        r#"{"requires_tool": false, "tool_name": null, "reason": "General discussion, no tool needed", "parameters": {}}"#,
    );

    let outcome = dispatcher.handle_message("Tell me about our Q1", None).await;
    outcome.background.unwrap().await.unwrap();

    let entries = read_entries(&logger);
    let tool_call = &entries[2].content;
    assert_eq!(tool_call["requires_tool"], false);
    assert!(tool_call.get("tool_execution_result").is_none());
}

#[tokio::test]
async fn test_reply_survives_unparseable_small_mind_output() {
    let (dispatcher, logger, _temp) = build_dispatcher(
        "thinking out loud with no payload",
        r#"{"requires_tool": false, "tool_name": null, "reason": "unused", "parameters": {}}"#,
    );

    let outcome = dispatcher.handle_message("hello", None).await;
    assert!(outcome.background.is_none());
    assert!(!outcome.reply.is_empty());

    let entries = read_entries(&logger);
    assert_eq!(entries.len(), 2);
    assert_eq!(
        entries[1].content["needs_background_action"],
        serde_json::Value::from(false)
    );
}
