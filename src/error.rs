//! Error taxonomy
//!
//! Failure categories for the two-mind pipeline. Nothing here is allowed to
//! propagate past its component boundary into the dispatcher: each mind folds
//! failures into its documented safe default, and each tool folds failures
//! into a failed `ToolResult`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    /// Generation text contained no parseable structured payload,
    /// or the payload was missing required fields.
    #[error("malformed model output: {0}")]
    MalformedModelOutput(String),

    /// A tool name outside the registry was selected.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Required parameters absent for a selected tool.
    #[error("missing required parameters: [{}]", .0.join(", "))]
    MissingParameters(Vec<String>),

    /// A third-party capability call failed (network, auth, non-2xx).
    #[error("external call failed: {0}")]
    ExternalCall(String),

    /// A polling loop exhausted its retry budget.
    #[error("timeout after {attempts} poll attempts")]
    Timeout { attempts: u32 },
}
