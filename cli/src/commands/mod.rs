//! CLI command implementations

pub mod chat;
pub mod dashboard;
pub mod message;
pub mod tools;

pub use chat::chat_command;
pub use dashboard::dashboard_command;
pub use message::message_command;
pub use tools::tools_command;

use crate::config::{expand_path, CliConfigLoader};
use crate::dashboard::AppState;
use crate::output::{CliOutputConfig, CliOutputHandler};
use crate::tools::create_cli_tool_registry;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use toolchat_core::{ChatMessage, ChatSession, ChatSessionBuilder, TranscriptRecorder};
use tracing::{debug, info};

/// Settings shared by the commands that talk to the model
pub struct SessionOptions {
    pub config_loader: CliConfigLoader,
    pub transcript_file: Option<PathBuf>,
    pub debug_output: bool,
}

/// Resolve configuration and build a session whose tools drive `state`
pub async fn build_session(options: SessionOptions, state: &AppState) -> Result<ChatSession> {
    let loaded = options.config_loader.load().await?;
    info!("Using protocol: {}", loaded.llm.protocol);
    info!("Using model: {}", loaded.llm.model);
    if let Some(source) = &loaded.source {
        debug!("Configuration file: {}", source.display());
    }

    let output = CliOutputHandler::new(CliOutputConfig {
        show_tool_calls: true,
        show_timing: options.debug_output,
    });

    let mut builder = ChatSessionBuilder::new(loaded.llm)
        .with_chat_config(loaded.chat)
        .with_registry(Arc::new(create_cli_tool_registry(state)))
        .with_output(Box::new(output));

    if let Some(path) = &options.transcript_file {
        let path = expand_path(path);
        info!("Transcript file: {}", path.display());
        builder = builder.with_transcript(TranscriptRecorder::with_file(path));
    }

    builder.build().context("Failed to create chat session")
}

/// Print an assistant reply and the function call it carries
pub fn print_reply(reply: &ChatMessage) {
    println!("{} {}", "assistant:".bold().blue(), reply.content);

    if let Some(call) = &reply.function_call {
        let parameters = serde_json::to_string_pretty(&call.parameters)
            .unwrap_or_else(|_| call.parameters.to_string());
        println!(
            "{} {} [{:?}]",
            "function call:".dimmed(),
            call.name.cyan(),
            call.status
        );
        for line in parameters.lines() {
            println!("  {}", line.dimmed());
        }
    }
}
