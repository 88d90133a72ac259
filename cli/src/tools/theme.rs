//! Theme tool

use crate::dashboard::{Theme, ThemeState};
use async_trait::async_trait;
use toolchat_core::error::ToolError;
use toolchat_core::tools::{ParameterSchema, Tool, ToolArguments, ToolProvider, ToolRegistry};

/// Lets the model switch between the light and dark theme
pub struct ChangeThemeTool {
    state: ThemeState,
}

impl ChangeThemeTool {
    pub fn new(state: ThemeState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Tool for ChangeThemeTool {
    fn name(&self) -> &str {
        "change_theme"
    }

    fn description(&self) -> &str {
        "Change the theme of the application."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new().required_enum(
            "theme",
            "The theme to change to",
            Theme::ALL.iter().map(Theme::as_str),
        )
    }

    async fn execute(&self, args: ToolArguments) -> toolchat_core::error::Result<Option<String>> {
        let theme: Theme = args
            .require_str("theme")?
            .parse()
            .map_err(|message| ToolError::InvalidArguments { message })?;

        self.state.change_theme(theme);
        Ok(Some(format!("Theme changed to {}", theme)))
    }
}

/// Registers the theme tool
pub struct ThemeToolProvider {
    state: ThemeState,
}

impl ThemeToolProvider {
    pub fn new(state: ThemeState) -> Self {
        Self { state }
    }
}

impl ToolProvider for ThemeToolProvider {
    fn provider_name(&self) -> &str {
        "theme"
    }

    fn register_tools(&self, registry: &mut ToolRegistry) {
        registry.register(ChangeThemeTool::new(self.state.clone()));
    }
}
