//! The tool-calling conversation loop

pub mod config;
pub mod execution;
pub mod function_call;
pub mod session;
pub mod state;

pub use config::{ChatConfig, ChatSessionBuilder};
pub use execution::{TurnExecution, TurnStatus};
pub use function_call::{resolve_function_call, FunctionCall, FunctionCallStatus};
pub use session::ChatSession;
pub use state::{ChatMessage, ConversationState, MessageKind};
