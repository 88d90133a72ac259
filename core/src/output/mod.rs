//! Output abstraction layer for the conversation loop
//!
//! Core only emits events; rendering them is up to the embedding
//! application (terminal, log file, test probe).

pub mod events;

pub use events::{ConversationEvent, ConversationOutput, NullOutput};
