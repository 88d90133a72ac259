//! # toolchat CLI
//!
//! Chat with a local or hosted model that can drive a log dashboard
//! through tool calls.
//!
//! ## Usage
//!
//! - `toolchat` - Start interactive chat
//! - `toolchat "show only errors"` - Send a single message
//! - `toolchat tools [--json]` - Show available tools
//! - `toolchat dashboard` - Print the log dashboard

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod dashboard;
mod output;
mod tools;

use commands::{chat_command, dashboard_command, message_command, tools_command, SessionOptions};
use config::{expand_path, CliConfigLoader};
use dashboard::{load_logs, sample_logs, AppState};

/// toolchat - a tool-calling chat loop for local and hosted models
#[derive(Parser)]
#[command(name = "toolchat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Chat with a model that can filter logs and change the theme")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file or directory path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Protocol to use (ollama, openai)
    #[arg(long)]
    protocol: Option<String>,

    /// API key override
    #[arg(long)]
    api_key: Option<String>,

    /// Base URL override
    #[arg(long)]
    base_url: Option<String>,

    /// Model name override
    #[arg(long)]
    model: Option<String>,

    /// JSON log file for the dashboard (defaults to bundled sample logs)
    #[arg(long)]
    logs: Option<PathBuf>,

    /// Write a transcript of every model exchange to this file
    #[arg(long)]
    transcript_file: Option<PathBuf>,

    /// Maximum tool rounds per turn
    #[arg(long)]
    max_tool_rounds: Option<usize>,

    /// Model request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output mode
    #[arg(short = 'd', long = "debug")]
    debug_output: bool,

    /// Message to send (if provided, runs a single turn)
    message: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show available tools
    Tools {
        /// Print the schemas advertised to the model
        #[arg(long)]
        json: bool,
    },

    /// Print the log dashboard
    Dashboard,
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new();

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }
    if let Some(protocol) = &cli.protocol {
        loader = loader.with_protocol_override(protocol.clone());
    }
    if let Some(api_key) = &cli.api_key {
        loader = loader.with_api_key_override(api_key.clone());
    }
    if let Some(base_url) = &cli.base_url {
        loader = loader.with_base_url_override(base_url.clone());
    }
    if let Some(model) = &cli.model {
        loader = loader.with_model_override(model.clone());
    }
    if let Some(max_tool_rounds) = cli.max_tool_rounds {
        loader = loader.with_max_tool_rounds_override(max_tool_rounds);
    }
    if let Some(timeout) = cli.timeout {
        loader = loader.with_timeout_override(timeout);
    }

    loader
}

async fn load_app_state(logs: Option<&PathBuf>) -> Result<AppState> {
    let entries = match logs {
        Some(path) => load_logs(&expand_path(path)).await?,
        None => sample_logs()?,
    };
    tracing::debug!("Loaded {} log entries", entries.len());
    Ok(AppState::new(entries))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose || cli.debug_output {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let state = load_app_state(cli.logs.as_ref()).await?;
    let options = SessionOptions {
        config_loader: build_config_loader(&cli),
        transcript_file: cli.transcript_file.clone(),
        debug_output: cli.debug_output,
    };

    match (cli.message, cli.command) {
        (Some(message), None) => message_command(message, options, state).await,
        (Some(_), Some(_)) => {
            tracing::error!("Error: Cannot specify both a message and a subcommand");
            std::process::exit(1);
        }
        (None, Some(Commands::Tools { json })) => tools_command(&state, json).await,
        (None, Some(Commands::Dashboard)) => dashboard_command(&state).await,
        (None, None) => chat_command(options, state).await,
    }
}
