//! CLI output handler implementation

use async_trait::async_trait;
use colored::Colorize;
use serde_json::Value;
use toolchat_core::conversation::{FunctionCall, FunctionCallStatus, TurnStatus};
use toolchat_core::output::{ConversationEvent, ConversationOutput};
use tracing::debug;

/// CLI output configuration
#[derive(Debug, Clone)]
pub struct CliOutputConfig {
    /// Print a status line for every tool call
    pub show_tool_calls: bool,
    /// Print per-turn timing after each answer
    pub show_timing: bool,
}

impl Default for CliOutputConfig {
    fn default() -> Self {
        Self {
            show_tool_calls: true,
            show_timing: false,
        }
    }
}

/// Prints tool activity as the turn runs; replies are printed by the commands
pub struct CliOutputHandler {
    config: CliOutputConfig,
}

impl CliOutputHandler {
    pub fn new(config: CliOutputConfig) -> Self {
        Self { config }
    }

    /// Status line for a call that is about to run
    pub fn format_started(call: &FunctionCall) -> String {
        format!(
            "{} {}({})",
            "⋯".dimmed(),
            call.name.cyan(),
            format_arguments(&call.parameters)
        )
    }

    /// Status line for a finished call
    pub fn format_completed(call: &FunctionCall) -> String {
        let (marker, name) = match call.status {
            FunctionCallStatus::Success => ("✓".green(), call.name.green()),
            FunctionCallStatus::Error => ("✗".red(), call.name.red()),
        };
        match &call.result {
            Some(result) => format!("{} {} → {}", marker, name, result.dimmed()),
            None => format!("{} {}", marker, name),
        }
    }
}

impl Default for CliOutputHandler {
    fn default() -> Self {
        Self::new(CliOutputConfig::default())
    }
}

/// Render arguments as `key=value` pairs
fn format_arguments(parameters: &Value) -> String {
    match parameters {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| match value {
                Value::String(s) => format!("{}=\"{}\"", key, s),
                other => format!("{}={}", key, other),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl ConversationOutput for CliOutputHandler {
    async fn emit_event(
        &self,
        event: ConversationEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match event {
            ConversationEvent::TurnStarted { input } => {
                debug!("Turn started: {}", input);
            }
            ConversationEvent::ModelRequest { round } => {
                debug!("Requesting model response (round {})", round);
            }
            ConversationEvent::ToolExecutionStarted { call } => {
                debug!("Executing tool {} with {}", call.name, call.parameters);
                if self.config.show_tool_calls {
                    println!("{}", Self::format_started(&call));
                }
            }
            ConversationEvent::ToolExecutionCompleted { call } => {
                debug!("Tool {} finished: {:?}", call.name, call.status);
                if self.config.show_tool_calls {
                    println!("{}", Self::format_completed(&call));
                }
            }
            ConversationEvent::MessageAppended { message } => {
                debug!("Appended {:?} message ({} chars)", message.kind, message.content.len());
            }
            ConversationEvent::TurnCompleted { execution } => {
                debug!(
                    "Turn finished: {:?} after {} tool rounds",
                    execution.status, execution.tool_rounds
                );
                if execution.status == TurnStatus::Failed {
                    if let Some(error) = &execution.error {
                        eprintln!("{} {}", "error:".red().bold(), error);
                    }
                }
                if self.config.show_timing && execution.status != TurnStatus::Ignored {
                    println!(
                        "{}",
                        format!(
                            "⏱  {:.2}s, {} tool round(s)",
                            execution.duration_ms as f64 / 1000.0,
                            execution.tool_rounds
                        )
                        .dimmed()
                    );
                }
            }
        }

        Ok(())
    }
}
