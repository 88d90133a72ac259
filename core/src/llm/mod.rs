//! LLM client abstractions and implementations

pub mod client;
pub mod message;
pub mod providers;

pub use client::{
    ChatOptions, ChatRequest, ChatResponse, FinishReason, FunctionDefinition, LlmClient,
    ToolDefinition, Usage,
};
pub use message::{FunctionInvocation, LlmMessage, MessageRole, ToolCallRequest};
pub use providers::*;
