//! Application state the model can drive: the theme and the log dashboard

pub mod logs;
pub mod theme;

pub use logs::{load_logs, parse_logs, LogEntry, LogFilter, LogLevel, LogsState};
pub use theme::{Theme, ThemeState};

use chrono::DateTime;
use colored::Colorize;
use std::fmt::Write;

/// Logs used when no log file is given
const SAMPLE_LOGS: &str = include_str!("../../assets/logs.json");

/// Parse the bundled sample logs
pub fn sample_logs() -> anyhow::Result<Vec<LogEntry>> {
    parse_logs(SAMPLE_LOGS)
}

/// Shared state handed to the tool providers and the commands
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub theme: ThemeState,
    pub logs: LogsState,
}

impl AppState {
    pub fn new(logs: Vec<LogEntry>) -> Self {
        Self {
            theme: ThemeState::default(),
            logs: LogsState::new(logs),
        }
    }
}

fn describe_filter(filter: &LogFilter) -> String {
    if filter.is_empty() {
        return "none".to_string();
    }

    let mut parts = Vec::new();
    if let Some(level) = filter.level {
        parts.push(format!("level={}", level));
    }
    if let Some(service) = &filter.service {
        parts.push(format!("service={}", service));
    }
    if let Some(message) = &filter.message {
        parts.push(format!("message~\"{}\"", message));
    }
    if let Some(timestamp) = filter.timestamp {
        parts.push(format!("timestamp={}", timestamp));
    }
    parts.join(", ")
}

fn colored_level(level: LogLevel) -> String {
    let label = format!("{:<5}", level.as_str());
    match level {
        LogLevel::Info => label.blue().to_string(),
        LogLevel::Warn => label.yellow().to_string(),
        LogLevel::Error => label.red().to_string(),
        LogLevel::Debug => label.bright_black().to_string(),
    }
}

/// One-line summary of the visible logs
pub fn render_summary(state: &AppState) -> String {
    let stats = state.logs.stats();
    format!(
        "theme: {} | filter: {} | {} logs, {} errors, {} warnings, {:.1}% success",
        state.theme.current(),
        describe_filter(&state.logs.filter()),
        stats.total_logs,
        stats.errors,
        stats.warnings,
        stats.success_rate
    )
}

/// Full text rendering of the dashboard
pub fn render_dashboard(state: &AppState) -> String {
    let mut out = String::new();
    let stats = state.logs.stats();

    let _ = writeln!(out, "{}", "Log Dashboard".bold());
    let _ = writeln!(
        out,
        "Theme: {}   Filter: {}   Showing {} of {} logs",
        state.theme.current(),
        describe_filter(&state.logs.filter()),
        stats.total_logs,
        state.logs.total_count()
    );
    let _ = writeln!(
        out,
        "Total: {}   Errors: {}   Warnings: {}   Success rate: {:.1}%",
        stats.total_logs,
        stats.errors.to_string().red(),
        stats.warnings.to_string().yellow(),
        stats.success_rate
    );

    let _ = writeln!(out, "\n{}", "Log levels".bold());
    for row in state.logs.log_types() {
        let bar = "#".repeat((row.percentage / 5) as usize);
        let _ = writeln!(out, "  {:<8} {:>3}% {}", row.name, row.percentage, bar);
    }

    let volume = state.logs.log_volume();
    let peak = volume.iter().map(|v| v.count).max().unwrap_or(0);
    let _ = writeln!(out, "\n{}", "Hourly volume (UTC)".bold());
    for bucket in volume.iter().filter(|v| v.count > 0) {
        let width = if peak == 0 { 0 } else { bucket.count * 30 / peak };
        let _ = writeln!(
            out,
            "  {}:00 {:>4} {}",
            bucket.hour,
            bucket.count,
            "█".repeat(width.max(1))
        );
    }

    let _ = writeln!(out, "\n{}", "Recent logs".bold());
    let recent = state.logs.recent_logs();
    if recent.is_empty() {
        let _ = writeln!(out, "  (no logs match the current filter)");
    }
    for entry in recent {
        let time = DateTime::from_timestamp_millis(entry.timestamp)
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| entry.timestamp.to_string());
        let _ = writeln!(
            out,
            "  {} {} {:<15} {}",
            time.dimmed(),
            colored_level(entry.level),
            entry.service,
            entry.message
        );
    }

    out
}
