//! Application theme state

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

/// Color theme of the application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const ALL: [Theme; 2] = [Theme::Light, Theme::Dark];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{}'", other)),
        }
    }
}

/// Shared handle to the current theme
#[derive(Debug, Clone, Default)]
pub struct ThemeState {
    current: Arc<RwLock<Theme>>,
}

impl ThemeState {
    pub fn current(&self) -> Theme {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn change_theme(&self, theme: Theme) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = theme;
        tracing::debug!("Theme changed to {}", theme);
    }
}
