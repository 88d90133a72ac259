//! Display-level conversation state

use super::function_call::FunctionCall;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Who authored a displayed message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Assistant,
}

/// A message as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: DateTime<Local>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
}

impl ChatMessage {
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            kind: MessageKind::User,
            content: content.into(),
            timestamp: Local::now(),
            function_call: None,
        }
    }

    pub fn assistant<S: Into<String>>(content: S, function_call: Option<FunctionCall>) -> Self {
        Self {
            kind: MessageKind::Assistant,
            content: content.into(),
            timestamp: Local::now(),
            function_call,
        }
    }

    pub fn is_user(&self) -> bool {
        self.kind == MessageKind::User
    }
}

/// Ordered list of displayed messages
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    messages: Vec<ChatMessage>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
