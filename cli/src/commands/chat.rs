//! Interactive chat command

use super::{build_session, print_reply, SessionOptions};
use crate::dashboard::{render_dashboard, render_summary, AppState};
use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use toolchat_core::{ChatSession, TurnStatus};
use tracing::debug;

/// A line typed at the prompt
#[derive(Debug, PartialEq, Eq)]
enum ReplInput<'a> {
    Dashboard,
    Theme,
    Reset,
    Quit,
    Help,
    Unknown(&'a str),
    Message(&'a str),
    Empty,
}

fn parse_input(line: &str) -> ReplInput<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ReplInput::Empty;
    }
    if !line.starts_with('/') {
        return ReplInput::Message(line);
    }

    match line {
        "/dashboard" => ReplInput::Dashboard,
        "/theme" => ReplInput::Theme,
        "/reset" => ReplInput::Reset,
        "/quit" | "/exit" => ReplInput::Quit,
        "/help" => ReplInput::Help,
        other => ReplInput::Unknown(other),
    }
}

fn print_help() {
    println!("{}", "Commands:".bold());
    println!("  /dashboard  show the log dashboard");
    println!("  /theme      show the current theme");
    println!("  /reset      clear the conversation");
    println!("  /quit       exit");
    println!("Anything else is sent to the model. Ctrl-C cancels a running turn.");
}

fn prompt() -> std::io::Result<()> {
    print!("{} ", ">".green().bold());
    std::io::stdout().flush()
}

/// Start the line-based chat loop
pub async fn chat_command(options: SessionOptions, state: AppState) -> Result<()> {
    let session = build_session(options, &state).await?;

    println!(
        "{} ({}) - type /help for commands",
        "toolchat".bold(),
        session.model_name()
    );
    println!("{}", render_summary(&state).dimmed());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            signal = tokio::signal::ctrl_c() => {
                signal?;
                println!();
                break;
            }
        };
        let Some(line) = line else {
            println!();
            break;
        };

        match parse_input(&line) {
            ReplInput::Empty => continue,
            ReplInput::Quit => break,
            ReplInput::Help => print_help(),
            ReplInput::Dashboard => print!("{}", render_dashboard(&state)),
            ReplInput::Theme => println!("Current theme: {}", state.theme.current()),
            ReplInput::Reset => {
                if session.reset() {
                    println!("{}", "Conversation cleared.".dimmed());
                } else {
                    println!("{}", "A turn is still running.".yellow());
                }
            }
            ReplInput::Unknown(command) => {
                println!("Unknown command: {} (try /help)", command);
            }
            ReplInput::Message(message) => run_turn(&session, message, &state).await?,
        }
    }

    Ok(())
}

/// Submit one message, cancelling it if Ctrl-C arrives first
async fn run_turn(session: &ChatSession, message: &str, state: &AppState) -> Result<()> {
    let cancel = CancellationToken::new();
    let turn = session.submit_with_cancel(message, cancel.clone());
    tokio::pin!(turn);

    let execution = loop {
        tokio::select! {
            execution = &mut turn => break execution,
            signal = tokio::signal::ctrl_c(), if !cancel.is_cancelled() => {
                signal?;
                debug!("Cancelling in-flight turn");
                println!("{}", "Cancelling...".yellow());
                cancel.cancel();
            }
        }
    };

    if execution.status == TurnStatus::Ignored {
        return Ok(());
    }
    if let Some(reply) = &execution.reply {
        print_reply(reply);
    }
    println!("{}", render_summary(state).dimmed());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("  "), ReplInput::Empty);
        assert_eq!(parse_input("/dashboard"), ReplInput::Dashboard);
        assert_eq!(parse_input(" /theme "), ReplInput::Theme);
        assert_eq!(parse_input("/reset"), ReplInput::Reset);
        assert_eq!(parse_input("/exit"), ReplInput::Quit);
        assert_eq!(parse_input("/frobnicate"), ReplInput::Unknown("/frobnicate"));
        assert_eq!(
            parse_input("show only errors"),
            ReplInput::Message("show only errors")
        );
    }
}
