//! # toolchat Core
//!
//! Core library for toolchat - a tool-calling chat loop for local and hosted
//! language models.
//!
//! This library provides the building blocks for letting a model drive an
//! application: typed tool definitions, a tool registry, model clients, and
//! the conversation loop that dispatches tool calls and feeds their results
//! back until the model produces a plain-text answer.

// Core modules
pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod output;
pub mod tools;
pub mod transcript;

// Re-export commonly used types
pub use config::{ModelParams, Protocol, ResolvedLlmConfig};
pub use conversation::{
    ChatConfig, ChatMessage, ChatSession, ChatSessionBuilder, FunctionCall, FunctionCallStatus,
    TurnExecution, TurnStatus,
};
pub use tools::{Tool, ToolArguments, ToolProvider, ToolRegistry};
pub use transcript::TranscriptRecorder;

/// Current version of the toolchat-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for the library
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

/// Initialize tracing with a specific debug mode
pub fn init_tracing_with_debug(debug: bool) {
    let filter = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
