//! Dispatcher
//!
//! Glue between inbound user messages, the two minds, and the transcript.
//! Per-message state machine: log USER, classify via the Small Mind, log
//! SMALL_MIND, return the reply - and, if flagged, launch the Big Mind on
//! a supervised tokio task that logs BIG_MIND when it completes. The
//! background path never blocks the reply and never surfaces into the
//! visible conversation.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::big_mind::BigMind;
use crate::logger::{InteractionLogger, Origin};
use crate::small_mind::{Decision, SmallMind};

/// Result of dispatching one message. `background` is the handle of the
/// spawned Big Mind task, if any; callers may await it, abandon it, or
/// wrap it in a timeout.
pub struct DispatchOutcome {
    pub reply: String,
    pub decision: Decision,
    pub background: Option<JoinHandle<()>>,
}

pub struct Dispatcher {
    small_mind: Arc<SmallMind>,
    big_mind: Arc<BigMind>,
    logger: Arc<InteractionLogger>,
}

impl Dispatcher {
    pub fn new(
        small_mind: Arc<SmallMind>,
        big_mind: Arc<BigMind>,
        logger: Arc<InteractionLogger>,
    ) -> Self {
        Self {
            small_mind,
            big_mind,
            logger,
        }
    }

    /// Run one message through the pipeline.
    ///
    /// Ordering guarantee: the USER record precedes the SMALL_MIND record,
    /// which precedes the returned reply. The BIG_MIND record lands at an
    /// unspecified later point.
    pub async fn handle_message(&self, user_message: &str, context: Option<&str>) -> DispatchOutcome {
        self.log(Origin::User, user_message);

        let decision = self.small_mind.process_message(user_message, context).await;
        self.log(Origin::SmallMind, &decision);

        let background = if decision.needs_background_action {
            Some(self.spawn_background(user_message.to_string()))
        } else {
            None
        };

        DispatchOutcome {
            reply: decision.user_reply.clone(),
            decision,
            background,
        }
    }

    /// Launch the Big Mind path without blocking the reply. The task owns
    /// its own clones of the agent and logger; its outcome is funneled into
    /// the interaction log, so a failure is recorded rather than lost.
    fn spawn_background(&self, user_message: String) -> JoinHandle<()> {
        let big_mind = Arc::clone(&self.big_mind);
        let logger = Arc::clone(&self.logger);
        let task_id = Uuid::new_v4();

        info!("Delegating to Big Mind: task_id={}", task_id);

        tokio::spawn(async move {
            let tool_call = big_mind.process_request(&user_message).await;
            info!(
                "Big Mind task {} complete: requires_tool={}, tool_name={:?}",
                task_id, tool_call.requires_tool, tool_call.tool_name
            );
            if let Err(e) = logger.log_interaction(Origin::BigMind, &tool_call) {
                warn!("Failed to log Big Mind outcome for task {}: {}", task_id, e);
            }
        })
    }

    fn log(&self, origin: Origin, content: impl serde::Serialize) {
        if let Err(e) = self.logger.log_interaction(origin, content) {
            warn!("Failed to append {} log entry: {}", origin.as_str(), e);
        }
    }
}
