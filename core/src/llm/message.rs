//! LLM message structures

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A message in the model-facing conversation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmMessage {
    /// Role of the message sender
    pub role: MessageRole,

    /// Text content; empty when the model only requested a tool
    #[serde(default)]
    pub content: String,

    /// Structured tool-call requests made by the assistant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallRequest>>,

    /// Name of the tool that produced a tool-role message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,

    /// Identifier of the request a tool-role message answers, when the
    /// provider supplied one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// Role of the message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System message (instructions)
    System,

    /// User message (human input)
    User,

    /// Assistant message (model response)
    Assistant,

    /// Tool message (tool execution result)
    Tool,
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Provider-assigned identifier (OpenAI-compatible endpoints only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The function to call
    pub function: FunctionInvocation,
}

/// Name and arguments of a requested function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionInvocation {
    /// Name of the tool
    pub name: String,

    /// Arguments, normally a JSON object
    #[serde(default)]
    pub arguments: Value,
}

impl LlmMessage {
    fn text(role: MessageRole, content: String) -> Self {
        Self {
            role,
            content,
            tool_calls: None,
            tool_name: None,
            tool_call_id: None,
        }
    }

    /// Create a new system message
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self::text(MessageRole::System, content.into())
    }

    /// Create a new user message
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::text(MessageRole::User, content.into())
    }

    /// Create a new assistant message
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self::text(MessageRole::Assistant, content.into())
    }

    /// Create an assistant message carrying tool-call requests
    pub fn assistant_with_tool_calls<S: Into<String>>(
        content: S,
        tool_calls: Vec<ToolCallRequest>,
    ) -> Self {
        Self {
            tool_calls: Some(tool_calls),
            ..Self::assistant(content)
        }
    }

    /// Create a tool-result message
    pub fn tool_result<N, C>(tool_name: N, tool_call_id: Option<String>, content: C) -> Self
    where
        N: Into<String>,
        C: Into<String>,
    {
        Self {
            tool_name: Some(tool_name.into()),
            tool_call_id,
            ..Self::text(MessageRole::Tool, content.into())
        }
    }

    /// Check if the message carries structured tool calls
    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls
            .as_ref()
            .map(|calls| !calls.is_empty())
            .unwrap_or(false)
    }

    /// Structured tool calls, empty when there are none
    pub fn tool_calls(&self) -> &[ToolCallRequest] {
        self.tool_calls.as_deref().unwrap_or(&[])
    }
}

impl ToolCallRequest {
    /// Create a tool-call request without an identifier
    pub fn new<S: Into<String>>(name: S, arguments: Value) -> Self {
        Self {
            id: None,
            function: FunctionInvocation {
                name: name.into(),
                arguments,
            },
        }
    }

    /// Attach a provider identifier
    pub fn with_id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = Some(id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_call_message_wire_shape() {
        let message = LlmMessage::assistant_with_tool_calls(
            "",
            vec![ToolCallRequest::new("change_theme", json!({"theme": "dark"}))],
        );
        let wire = serde_json::to_value(&message).unwrap();

        assert_eq!(
            wire,
            json!({
                "role": "assistant",
                "content": "",
                "tool_calls": [
                    {"function": {"name": "change_theme", "arguments": {"theme": "dark"}}}
                ]
            })
        );
    }

    #[test]
    fn test_tool_result_wire_shape() {
        let message = LlmMessage::tool_result("change_theme", None, "Theme changed to dark");
        let wire = serde_json::to_value(&message).unwrap();

        assert_eq!(wire["role"], "tool");
        assert_eq!(wire["tool_name"], "change_theme");
        assert!(wire.get("tool_call_id").is_none());
    }

    #[test]
    fn test_response_message_without_tool_calls_parses() {
        let message: LlmMessage =
            serde_json::from_value(json!({"role": "assistant", "content": "Done."})).unwrap();
        assert!(!message.has_tool_calls());
        assert!(message.tool_calls().is_empty());
        assert_eq!(message.content, "Done.");
    }
}
