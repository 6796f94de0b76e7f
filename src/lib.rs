//! CMO Agent
//!
//! Two-tier AI Chief Marketing Officer: a fast conversational mind plus a
//! slower background mind that executes side-effecting marketing tools.
//!
//! # Features
//!
//! - **Small Mind**: low-latency per-message classification + user-facing reply
//! - **Big Mind**: independent, authoritative tool selection and execution
//! - **Tool Registry**: closed set of capabilities with declared required parameters
//! - **Supervised Delegation**: background work on held tokio task handles
//! - **Interaction Log**: append-only JSON audit trail of every stage
//!
//! # Architecture
//!
//! ```text
//! User ──► Dispatcher ──► Small Mind ──► Groq API
//!              │              │
//!              │◄── reply ────┘
//!              │
//!              └──► Big Mind (tokio task) ──► Claude API
//!                       │
//!                       └──► Tool Invoker ──► Write_Report / Send_Message /
//!                                             Create_Ad_from_Image /
//!                                             Post_Video_Ad / Campaign_Insight
//! ```

pub mod big_mind;
pub mod claude;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod generation;
pub mod groq;
pub mod logger;
pub mod parser;
pub mod small_mind;
pub mod tools;

pub use big_mind::{BigMind, ToolCall};
pub use claude::ClaudeClient;
pub use config::Config;
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::AgentError;
pub use generation::TextGenerator;
pub use groq::GroqClient;
pub use logger::{InteractionLogger, LogEntry, Origin};
pub use small_mind::{Decision, SmallMind};
pub use tools::{ToolInvoker, ToolName, ToolResult, ToolSpec, REGISTRY};
