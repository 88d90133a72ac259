//! Dashboard command

use crate::dashboard::{render_dashboard, AppState};
use anyhow::Result;

/// Print the log dashboard for the loaded logs
pub async fn dashboard_command(state: &AppState) -> Result<()> {
    print!("{}", render_dashboard(state));
    Ok(())
}
