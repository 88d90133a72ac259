//! Turn execution result structures

use super::state::ChatMessage;
use serde::{Deserialize, Serialize};

/// Terminal status of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnStatus {
    /// Blank input, or another turn was in flight
    Ignored,
    /// The model produced a final answer
    Answered,
    /// Transport error, timeout, cancellation or tool-loop exhaustion
    Failed,
}

/// Result of a single `submit`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnExecution {
    /// How the turn ended
    pub status: TurnStatus,

    /// Assistant message appended for this turn
    pub reply: Option<ChatMessage>,

    /// Error description for failed turns
    pub error: Option<String>,

    /// Number of tool rounds executed
    pub tool_rounds: usize,

    /// Total turn time in milliseconds
    pub duration_ms: u64,
}

impl TurnExecution {
    /// A submission that was not processed
    pub fn ignored() -> Self {
        Self {
            status: TurnStatus::Ignored,
            reply: None,
            error: None,
            tool_rounds: 0,
            duration_ms: 0,
        }
    }

    /// A turn that ended with a final answer
    pub fn answered(reply: ChatMessage, tool_rounds: usize, duration_ms: u64) -> Self {
        Self {
            status: TurnStatus::Answered,
            reply: Some(reply),
            error: None,
            tool_rounds,
            duration_ms,
        }
    }

    /// A turn that ended in a turn-fatal error
    pub fn failed(reply: ChatMessage, error: String, tool_rounds: usize, duration_ms: u64) -> Self {
        Self {
            status: TurnStatus::Failed,
            reply: Some(reply),
            error: Some(error),
            tool_rounds,
            duration_ms,
        }
    }

    pub fn is_answered(&self) -> bool {
        self.status == TurnStatus::Answered
    }
}
