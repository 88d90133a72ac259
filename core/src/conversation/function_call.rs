//! Resolving a model response into at most one function call

use crate::llm::LlmMessage;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome of a function call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionCallStatus {
    Success,
    Error,
}

/// A tool invocation resolved from a model response
///
/// Created with a provisional `Success` status and updated in place once the
/// tool has run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Requested tool name
    pub name: String,

    /// Arguments as sent by the model, normally a JSON object
    pub parameters: Value,

    /// Execution status
    pub status: FunctionCallStatus,

    /// Tool output or error text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    /// Provider identifier of the structured call, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
}

impl FunctionCall {
    /// Create a pending call
    pub fn new<S: Into<String>>(name: S, parameters: Value) -> Self {
        Self {
            name: name.into(),
            parameters,
            status: FunctionCallStatus::Success,
            result: None,
            call_id: None,
        }
    }

    /// Placeholder attached to the error reply of a failed turn
    pub fn unknown_error() -> Self {
        Self {
            status: FunctionCallStatus::Error,
            ..Self::new("unknown", Value::Object(Map::new()))
        }
    }

    /// Record a successful outcome
    pub fn succeed(&mut self, result: Option<String>) {
        self.status = FunctionCallStatus::Success;
        self.result = result;
    }

    /// Record a failed outcome
    pub fn fail<S: Into<String>>(&mut self, message: S) {
        self.status = FunctionCallStatus::Error;
        self.result = Some(message.into());
    }

    pub fn is_error(&self) -> bool {
        self.status == FunctionCallStatus::Error
    }
}

/// Resolve the function call a model response asks for, if any
///
/// Structured tool calls win; only the first one is honoured. Without them,
/// content that is a JSON object with a string `name` field is treated as an
/// implicit call. Anything else is a final answer.
pub fn resolve_function_call(message: &LlmMessage) -> Option<FunctionCall> {
    if let Some((first, rest)) = message.tool_calls().split_first() {
        if !rest.is_empty() {
            tracing::debug!(
                "Model requested {} tool calls, honouring only '{}'",
                rest.len() + 1,
                first.function.name
            );
        }

        let mut call = FunctionCall::new(
            first.function.name.clone(),
            normalize_arguments(first.function.arguments.clone()),
        );
        call.call_id = first.id.clone();
        return Some(call);
    }

    resolve_implicit_call(&message.content)
}

fn resolve_implicit_call(content: &str) -> Option<FunctionCall> {
    let trimmed = content.trim();
    if !trimmed.starts_with('{') {
        return None;
    }

    let mut object = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(object)) => object,
        _ => return None,
    };

    let name = match object.get("name") {
        Some(Value::String(name)) => name.clone(),
        _ => return None,
    };

    let arguments = object
        .remove("arguments")
        .or_else(|| object.remove("parameters"))
        .unwrap_or_else(|| Value::Object(Map::new()));

    tracing::debug!("Resolved implicit tool call '{}' from content", name);
    Some(FunctionCall::new(name, normalize_arguments(arguments)))
}

/// Arguments sent as a JSON string are parsed; unparsable ones become `{}`
fn normalize_arguments(arguments: Value) -> Value {
    match arguments {
        Value::String(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(parsed @ Value::Object(_)) => parsed,
            _ => Value::Object(Map::new()),
        },
        Value::Null => Value::Object(Map::new()),
        other => other,
    }
}
