//! Transcript entry structures

use crate::conversation::{FunctionCall, TurnStatus};
use crate::llm::{FinishReason, LlmMessage, Usage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded step of a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// When this entry was recorded
    pub timestamp: DateTime<Utc>,

    /// What happened
    pub entry_type: EntryType,
}

/// Kinds of transcript entries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryType {
    /// A turn was accepted
    TurnStart { input: String },

    /// Request sent to the model
    ModelRequest {
        round: usize,
        messages: Vec<LlmMessage>,
        tools: Vec<String>,
    },

    /// Response received from the model
    ModelResponse {
        round: usize,
        message: LlmMessage,
        usage: Option<Usage>,
        finish_reason: Option<FinishReason>,
    },

    /// A resolved call about to run
    ToolCall { call: FunctionCall },

    /// The same call after execution
    ToolResult { call: FunctionCall },

    /// The turn ended
    TurnComplete {
        status: TurnStatus,
        reply: Option<String>,
        tool_rounds: usize,
        duration_ms: u64,
    },

    /// A turn-fatal error
    Error { message: String },
}

impl TranscriptEntry {
    fn now(entry_type: EntryType) -> Self {
        Self {
            timestamp: Utc::now(),
            entry_type,
        }
    }

    pub fn turn_start<S: Into<String>>(input: S) -> Self {
        Self::now(EntryType::TurnStart {
            input: input.into(),
        })
    }

    pub fn model_request(round: usize, messages: Vec<LlmMessage>, tools: Vec<String>) -> Self {
        Self::now(EntryType::ModelRequest {
            round,
            messages,
            tools,
        })
    }

    pub fn model_response(
        round: usize,
        message: LlmMessage,
        usage: Option<Usage>,
        finish_reason: Option<FinishReason>,
    ) -> Self {
        Self::now(EntryType::ModelResponse {
            round,
            message,
            usage,
            finish_reason,
        })
    }

    pub fn tool_call(call: FunctionCall) -> Self {
        Self::now(EntryType::ToolCall { call })
    }

    pub fn tool_result(call: FunctionCall) -> Self {
        Self::now(EntryType::ToolResult { call })
    }

    pub fn turn_complete(
        status: TurnStatus,
        reply: Option<String>,
        tool_rounds: usize,
        duration_ms: u64,
    ) -> Self {
        Self::now(EntryType::TurnComplete {
            status,
            reply,
            tool_rounds,
            duration_ms,
        })
    }

    pub fn error<S: Into<String>>(message: S) -> Self {
        Self::now(EntryType::Error {
            message: message.into(),
        })
    }
}
