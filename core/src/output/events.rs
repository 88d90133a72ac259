//! Conversation events and the output trait

use crate::conversation::{ChatMessage, FunctionCall, TurnExecution};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Events emitted while a turn is processed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ConversationEvent {
    /// A non-blank submission was accepted
    TurnStarted { input: String },

    /// A request is about to be sent to the model
    ModelRequest { round: usize },

    /// A resolved tool call is about to run
    ToolExecutionStarted { call: FunctionCall },

    /// A tool call finished, successfully or not
    ToolExecutionCompleted { call: FunctionCall },

    /// A message was appended to the display state
    MessageAppended { message: ChatMessage },

    /// The turn reached a terminal state
    TurnCompleted { execution: TurnExecution },
}

/// Abstract output interface for conversation events
#[async_trait]
pub trait ConversationOutput: Send + Sync {
    /// Emit a conversation event
    async fn emit_event(
        &self,
        event: ConversationEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Output handler that discards all events
pub struct NullOutput;

#[async_trait]
impl ConversationOutput for NullOutput {
    async fn emit_event(
        &self,
        _event: ConversationEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}
