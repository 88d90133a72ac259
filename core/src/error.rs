//! Error types and handling for toolchat core

use thiserror::Error;

/// Result type alias for toolchat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for toolchat core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// LLM client errors
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Tool lookup, validation and execution errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Conversation loop errors
    #[error("Conversation error: {0}")]
    Conversation(#[from] ConversationError),

    /// Transcript recording errors
    #[error("Transcript error: {0}")]
    Transcript(#[from] TranscriptError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },
}

/// LLM client errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {message}")]
    Network { message: String },
}

/// Tool errors
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Tool {name} not found")]
    NotFound { name: String },

    #[error("Tool execution failed: {name} - {message}")]
    ExecutionFailed { name: String, message: String },

    #[error("Invalid arguments: {message}")]
    InvalidArguments { message: String },
}

/// Conversation loop errors
#[derive(Error, Debug)]
pub enum ConversationError {
    #[error("Tool loop exceeded: more than {max_rounds} tool rounds in one turn")]
    ToolLoopExceeded { max_rounds: usize },

    #[error("Turn cancelled")]
    Cancelled,
}

/// Transcript recording errors
#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("Failed to record transcript: {message}")]
    RecordingFailed { message: String },

    #[error("Failed to load transcript: {path}")]
    LoadFailed { path: String },

    #[error("Invalid transcript format")]
    InvalidFormat,
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Generic(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Generic(msg.to_string())
    }
}
