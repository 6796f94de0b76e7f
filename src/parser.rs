//! Decision Parser
//!
//! Extracts the single structured payload embedded in free-form model output.
//! Policy: outermost span between the first `{` and the last `}`. Explanatory
//! prose around the payload is tolerated; multiple disjoint payloads are not.
//!
//! Callers must not propagate [`AgentError::MalformedModelOutput`] - they
//! substitute their documented safe default instead.

use serde::de::DeserializeOwned;

use crate::error::AgentError;

/// Locate the payload span in raw model output.
pub fn extract_payload(text: &str) -> Result<&str, AgentError> {
    let start = text
        .find('{')
        .ok_or_else(|| AgentError::MalformedModelOutput("no '{' in model output".to_string()))?;
    let end = text
        .rfind('}')
        .filter(|&end| end >= start)
        .ok_or_else(|| AgentError::MalformedModelOutput("no closing '}' in model output".to_string()))?;
    Ok(&text[start..=end])
}

/// Extract and decode the payload into the caller's schema.
///
/// Missing required fields surface as `MalformedModelOutput`, same as a
/// syntactically broken payload.
pub fn parse_payload<T: DeserializeOwned>(text: &str) -> Result<T, AgentError> {
    let json = extract_payload(text)?;
    serde_json::from_str(json).map_err(|e| AgentError::MalformedModelOutput(e.to_string()))
}
