//! Marketing report tool
//!
//! Treats report generation as an opaque capability: structured campaign
//! data in, prose report text out.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::generation::TextGenerator;
use crate::tools::ToolResult;

const REPORT_SYSTEM_PROMPT: &str = "You are a marketing analyst. Write a clear, well-structured \
marketing report on the requested topic. Use the supplied campaign data when present, call out \
notable trends, and close with concrete recommendations. Respond with the report text only.";

pub struct ReportWriter {
    generator: Arc<dyn TextGenerator>,
}

impl ReportWriter {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn write(&self, params: &Map<String, Value>) -> ToolResult {
        let Some(topic) = params.get("topic").and_then(Value::as_str) else {
            return ToolResult::fail("parameter 'topic' must be a string");
        };

        let request = match params.get("data") {
            Some(data) => format!("Topic: {topic}\nCampaign data:\n{data}"),
            None => format!("Topic: {topic}"),
        };

        match self.generator.generate(REPORT_SYSTEM_PROMPT, &request).await {
            Ok(report) => ToolResult::ok(json!({ "report": report })),
            Err(e) => ToolResult::fail(format!("report generation failed: {e}")),
        }
    }
}
