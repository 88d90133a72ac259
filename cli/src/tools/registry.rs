//! CLI tool registry wired to the dashboard state

use crate::dashboard::AppState;
use crate::tools::{LogToolProvider, ThemeToolProvider};
use toolchat_core::tools::ToolRegistry;

/// Create the registry of every tool the model may call
pub fn create_cli_tool_registry(state: &AppState) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register_provider(&ThemeToolProvider::new(state.theme.clone()));
    registry.register_provider(&LogToolProvider::new(state.logs.clone()));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{sample_logs, LogLevel, Theme};
    use serde_json::json;
    use toolchat_core::tools::Tool;

    fn get_default_cli_tools() -> Vec<String> {
        vec![
            "change_theme".to_string(),
            "filter_logs_by_level".to_string(),
            "filter_logs_by_service".to_string(),
            "filter_logs_by_message".to_string(),
            "clear_log_filter".to_string(),
        ]
    }

    #[test]
    fn test_cli_registry_has_all_tools() {
        let registry = create_cli_tool_registry(&AppState::default());
        let tools = registry.list_tools();

        for expected_tool in get_default_cli_tools() {
            assert!(
                tools.contains(&expected_tool.as_str()),
                "Tool '{}' is not registered in the CLI registry",
                expected_tool
            );
        }
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_advertised_order() {
        let registry = create_cli_tool_registry(&AppState::default());
        let names: Vec<String> = registry
            .get_all()
            .into_iter()
            .map(|definition| definition.function.name)
            .collect();

        assert_eq!(names, get_default_cli_tools());
    }

    #[tokio::test]
    async fn test_tools_share_app_state() {
        let state = AppState::new(sample_logs().unwrap());
        let registry = create_cli_tool_registry(&state);

        let theme = registry.get_by_name("change_theme").unwrap();
        let args = theme.parameters().validate(&json!({"theme": "dark"})).unwrap();
        theme.execute(args).await.unwrap();
        assert_eq!(state.theme.current(), Theme::Dark);

        let level = registry.get_by_name("filter_logs_by_level").unwrap();
        let args = level.parameters().validate(&json!({"level": "WARN"})).unwrap();
        level.execute(args).await.unwrap();
        assert!(state
            .logs
            .filtered_logs()
            .iter()
            .all(|log| log.level == LogLevel::Warn));
    }
}
