//! Single message command

use super::{build_session, print_reply, SessionOptions};
use crate::dashboard::{render_summary, AppState};
use anyhow::{anyhow, Result};
use toolchat_core::TurnStatus;
use tracing::info;

/// Run one turn for `message` and print the outcome
pub async fn message_command(
    message: String,
    options: SessionOptions,
    state: AppState,
) -> Result<()> {
    let session = build_session(options, &state).await?;

    info!("Sending message: {}", message);
    let execution = session.submit(&message).await;

    match execution.status {
        TurnStatus::Ignored => return Err(anyhow!("Message is empty")),
        TurnStatus::Answered | TurnStatus::Failed => {
            if let Some(reply) = &execution.reply {
                print_reply(reply);
            }
        }
    }

    println!("\n{}", render_summary(&state));

    if let Some(recorder) = session.transcript_recorder() {
        if let Some(path) = recorder.file_path() {
            info!("Transcript saved to: {}", path.display());
        }
    }

    match execution.error {
        Some(error) if execution.status == TurnStatus::Failed => {
            Err(anyhow!("Turn failed: {}", error))
        }
        _ => Ok(()),
    }
}
