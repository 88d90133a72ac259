//! Terminal rendering of conversation events

pub mod cli_handler;

pub use cli_handler::{CliOutputConfig, CliOutputHandler};
