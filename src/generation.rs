//! Text-generation capability seam
//!
//! Both minds talk to their model through this trait, which is the only
//! thing integration tests need to stub.

use async_trait::async_trait;

use crate::error::AgentError;

/// A capability that turns (system instruction, user text) into free-form
/// text expected to contain one structured payload.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system: &str, user: &str) -> Result<String, AgentError>;
}
