//! Log dashboard state and its derived views

use anyhow::{Context, Result};
use chrono::{DateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

const RECENT_LOGS: usize = 10;

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

impl LogLevel {
    /// All levels, in the order used to break ties in distributions
    pub const ALL: [LogLevel; 4] = [
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Debug,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Human-readable name shown in the level distribution
    pub fn display_name(&self) -> &'static str {
        match self {
            LogLevel::Info => "Info",
            LogLevel::Warn => "Warning",
            LogLevel::Error => "Error",
            LogLevel::Debug => "Debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| format!("unknown log level '{}'", s))
    }
}

/// A single log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub level: LogLevel,
    pub service: String,
    pub message: String,
}

/// Constraint on which logs are visible
///
/// Every set field must match. `message` is a case-insensitive substring
/// match, the other fields match exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<LogLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl LogFilter {
    pub fn by_level(level: LogLevel) -> Self {
        Self {
            level: Some(level),
            ..Default::default()
        }
    }

    pub fn by_service<S: Into<String>>(service: S) -> Self {
        Self {
            service: Some(service.into()),
            ..Default::default()
        }
    }

    pub fn by_message<S: Into<String>>(message: S) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        if self.level.is_some_and(|level| level != entry.level) {
            return false;
        }
        if self
            .service
            .as_ref()
            .is_some_and(|service| *service != entry.service)
        {
            return false;
        }
        if self.timestamp.is_some_and(|ts| ts != entry.timestamp) {
            return false;
        }
        if let Some(needle) = &self.message {
            if !entry
                .message
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// Log count for one hour of the day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogVolume {
    /// Two-digit UTC hour, "00" to "23"
    pub hour: String,
    pub count: usize,
}

/// Share of one level among the visible logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogTypeDistribution {
    pub level: LogLevel,
    pub name: &'static str,
    /// Rounded percentage, 0 when nothing is visible
    pub percentage: u32,
}

/// Summary numbers over the visible logs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogStats {
    pub total_logs: usize,
    pub errors: usize,
    pub warnings: usize,
    /// Percentage of non-error logs, one decimal
    pub success_rate: f64,
}

#[derive(Debug, Default)]
struct LogsInner {
    logs: Vec<LogEntry>,
    filter: LogFilter,
}

impl LogsInner {
    fn visible(&self) -> impl Iterator<Item = &LogEntry> {
        self.logs.iter().filter(move |entry| self.filter.matches(entry))
    }
}

/// Shared handle to the loaded logs and the active filter
#[derive(Debug, Clone, Default)]
pub struct LogsState {
    inner: Arc<RwLock<LogsInner>>,
}

impl LogsState {
    pub fn new(logs: Vec<LogEntry>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(LogsInner {
                logs,
                filter: LogFilter::default(),
            })),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, LogsInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the whole filter
    pub fn apply_filter(&self, filter: LogFilter) {
        tracing::debug!("Applying log filter: {:?}", filter);
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .filter = filter;
    }

    pub fn filter(&self) -> LogFilter {
        self.read().filter.clone()
    }

    pub fn total_count(&self) -> usize {
        self.read().logs.len()
    }

    pub fn filtered_logs(&self) -> Vec<LogEntry> {
        self.read().visible().cloned().collect()
    }

    /// Visible logs per UTC hour, ascending
    pub fn log_volume(&self) -> Vec<LogVolume> {
        let mut counts = [0usize; 24];
        for entry in self.read().visible() {
            match DateTime::from_timestamp_millis(entry.timestamp) {
                Some(at) => counts[at.hour() as usize] += 1,
                None => tracing::debug!("Skipping log with invalid timestamp {}", entry.timestamp),
            }
        }

        counts
            .iter()
            .enumerate()
            .map(|(hour, count)| LogVolume {
                hour: format!("{:02}", hour),
                count: *count,
            })
            .collect()
    }

    /// Level distribution, largest share first
    pub fn log_types(&self) -> Vec<LogTypeDistribution> {
        let inner = self.read();
        let mut counts = [0usize; 4];
        for entry in inner.visible() {
            counts[level_index(entry.level)] += 1;
        }
        let total: usize = counts.iter().sum();

        let mut distribution: Vec<LogTypeDistribution> = LogLevel::ALL
            .into_iter()
            .map(|level| LogTypeDistribution {
                level,
                name: level.display_name(),
                percentage: if total == 0 {
                    0
                } else {
                    (counts[level_index(level)] as f64 / total as f64 * 100.0).round() as u32
                },
            })
            .collect();

        distribution.sort_by(|a, b| b.percentage.cmp(&a.percentage));
        distribution
    }

    pub fn stats(&self) -> LogStats {
        let inner = self.read();
        let (mut total, mut errors, mut warnings) = (0, 0, 0);
        for entry in inner.visible() {
            total += 1;
            match entry.level {
                LogLevel::Error => errors += 1,
                LogLevel::Warn => warnings += 1,
                _ => {}
            }
        }

        let success_rate = if total == 0 {
            0.0
        } else {
            ((total - errors) as f64 / total as f64 * 1000.0).round() / 10.0
        };

        LogStats {
            total_logs: total,
            errors,
            warnings,
            success_rate,
        }
    }

    /// The most recent visible logs, newest first
    pub fn recent_logs(&self) -> Vec<LogEntry> {
        let mut logs = self.filtered_logs();
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        logs.truncate(RECENT_LOGS);
        logs
    }
}

fn level_index(level: LogLevel) -> usize {
    match level {
        LogLevel::Info => 0,
        LogLevel::Warn => 1,
        LogLevel::Error => 2,
        LogLevel::Debug => 3,
    }
}

/// Parse a JSON array of log entries
pub fn parse_logs(content: &str) -> Result<Vec<LogEntry>> {
    serde_json::from_str(content).context("Failed to parse log entries")
}

/// Load log entries from a JSON file
pub async fn load_logs(path: &Path) -> Result<Vec<LogEntry>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read log file: {}", path.display()))?;
    parse_logs(&content).with_context(|| format!("Invalid log file: {}", path.display()))
}
