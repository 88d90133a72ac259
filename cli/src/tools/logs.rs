//! Log dashboard tools
//!
//! Each tool replaces the whole active filter, so filters never combine
//! across calls.

use crate::dashboard::{LogFilter, LogLevel, LogsState};
use async_trait::async_trait;
use toolchat_core::error::{Result, ToolError};
use toolchat_core::tools::{
    ParameterKind, ParameterSchema, Tool, ToolArguments, ToolProvider, ToolRegistry,
};

/// Shows only logs of one level
pub struct FilterLogsByLevelTool {
    state: LogsState,
}

#[async_trait]
impl Tool for FilterLogsByLevelTool {
    fn name(&self) -> &str {
        "filter_logs_by_level"
    }

    fn description(&self) -> &str {
        "Filter logs by log level. Only logs matching the specified level will be shown. \
         This affects all log statistics, charts, and recent logs display."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new().required_enum(
            "level",
            "The log level to filter by. Must be one of: INFO, WARN, ERROR, or DEBUG.",
            LogLevel::ALL.iter().map(LogLevel::as_str),
        )
    }

    async fn execute(&self, args: ToolArguments) -> Result<Option<String>> {
        let level: LogLevel = args
            .require_str("level")?
            .parse()
            .map_err(|message| ToolError::InvalidArguments { message })?;

        self.state.apply_filter(LogFilter::by_level(level));
        Ok(Some(format!(
            "Filtered logs to show only {} level logs",
            level
        )))
    }
}

/// Shows only logs from one service
pub struct FilterLogsByServiceTool {
    state: LogsState,
}

#[async_trait]
impl Tool for FilterLogsByServiceTool {
    fn name(&self) -> &str {
        "filter_logs_by_service"
    }

    fn description(&self) -> &str {
        "Filter logs by service name. Only logs from the specified service will be shown. \
         This affects all log statistics, charts, and recent logs display. Use exact service \
         name (e.g., \"api-service\", \"db-service\", \"cache-service\")."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new().required(
            "service",
            ParameterKind::String,
            "The exact service name to filter by (e.g., \"api-service\", \"db-service\", \
             \"cache-service\", \"worker-service\")",
        )
    }

    async fn execute(&self, args: ToolArguments) -> Result<Option<String>> {
        let service = args.require_str("service")?;
        self.state.apply_filter(LogFilter::by_service(service));
        Ok(Some(format!(
            "Filtered logs to show only logs from service: {}",
            service
        )))
    }
}

/// Shows only logs whose message contains a text
pub struct FilterLogsByMessageTool {
    state: LogsState,
}

#[async_trait]
impl Tool for FilterLogsByMessageTool {
    fn name(&self) -> &str {
        "filter_logs_by_message"
    }

    fn description(&self) -> &str {
        "Filter logs by message content. Only logs whose message contains the specified text \
         will be shown. The search is case-insensitive and matches partial text. This affects \
         all log statistics, charts, and recent logs display."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new().required(
            "message",
            ParameterKind::String,
            "The text to search for in log messages. Case-insensitive partial match. Only \
             provide actual search terms, not placeholder text.",
        )
    }

    async fn execute(&self, args: ToolArguments) -> Result<Option<String>> {
        let message = args.require_str("message")?;
        self.state.apply_filter(LogFilter::by_message(message));
        Ok(Some(format!(
            "Filtered logs to show only logs containing: \"{}\"",
            message
        )))
    }
}

/// Removes every filter
pub struct ClearLogFilterTool {
    state: LogsState,
}

#[async_trait]
impl Tool for ClearLogFilterTool {
    fn name(&self) -> &str {
        "clear_log_filter"
    }

    fn description(&self) -> &str {
        "Clear all log filters. This will reset the log view to show all logs without any \
         filtering applied. Use this when you want to see the complete log dataset."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new()
    }

    async fn execute(&self, _args: ToolArguments) -> Result<Option<String>> {
        self.state.apply_filter(LogFilter::default());
        Ok(Some(
            "Cleared all log filters. All logs are now visible.".to_string(),
        ))
    }
}

/// Registers the four log dashboard tools
pub struct LogToolProvider {
    state: LogsState,
}

impl LogToolProvider {
    pub fn new(state: LogsState) -> Self {
        Self { state }
    }
}

impl ToolProvider for LogToolProvider {
    fn provider_name(&self) -> &str {
        "logs"
    }

    fn register_tools(&self, registry: &mut ToolRegistry) {
        registry.register(FilterLogsByLevelTool {
            state: self.state.clone(),
        });
        registry.register(FilterLogsByServiceTool {
            state: self.state.clone(),
        });
        registry.register(FilterLogsByMessageTool {
            state: self.state.clone(),
        });
        registry.register(ClearLogFilterTool {
            state: self.state.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::LogEntry;
    use serde_json::json;

    fn state() -> LogsState {
        LogsState::new(vec![
            LogEntry {
                timestamp: 1_705_309_200_000,
                level: LogLevel::Error,
                service: "db-service".to_string(),
                message: "Connection timeout".to_string(),
            },
            LogEntry {
                timestamp: 1_705_309_260_000,
                level: LogLevel::Info,
                service: "api-service".to_string(),
                message: "Request handled".to_string(),
            },
        ])
    }

    fn registry(state: &LogsState) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register_provider(&LogToolProvider::new(state.clone()));
        registry
    }

    async fn run(registry: &ToolRegistry, name: &str, raw: serde_json::Value) -> Option<String> {
        let tool = registry.get_by_name(name).unwrap();
        let args = tool.parameters().validate(&raw).unwrap();
        tool.execute(args).await.unwrap()
    }

    #[tokio::test]
    async fn test_each_tool_replaces_filter() {
        let state = state();
        let registry = registry(&state);

        let result = run(&registry, "filter_logs_by_level", json!({"level": "ERROR"})).await;
        assert_eq!(
            result.as_deref(),
            Some("Filtered logs to show only ERROR level logs")
        );
        assert_eq!(state.filtered_logs().len(), 1);

        let result = run(
            &registry,
            "filter_logs_by_service",
            json!({"service": "api-service"}),
        )
        .await;
        assert_eq!(
            result.as_deref(),
            Some("Filtered logs to show only logs from service: api-service")
        );
        assert_eq!(state.filter(), LogFilter::by_service("api-service"));
        assert_eq!(state.filtered_logs()[0].level, LogLevel::Info);

        let result = run(&registry, "filter_logs_by_message", json!({"message": "TIMEOUT"})).await;
        assert_eq!(
            result.as_deref(),
            Some("Filtered logs to show only logs containing: \"TIMEOUT\"")
        );
        assert_eq!(state.filtered_logs()[0].service, "db-service");

        let result = run(&registry, "clear_log_filter", json!({})).await;
        assert_eq!(
            result.as_deref(),
            Some("Cleared all log filters. All logs are now visible.")
        );
        assert_eq!(state.filtered_logs().len(), 2);
    }

    #[test]
    fn test_level_enum_is_advertised() {
        let registry = registry(&state());
        let definitions = registry.get_all();
        assert_eq!(definitions.len(), 4);
        assert_eq!(
            definitions[0].function.parameters["properties"]["level"]["enum"],
            json!(["INFO", "WARN", "ERROR", "DEBUG"])
        );
        assert_eq!(
            definitions[3].function.parameters,
            json!({"type": "object", "properties": {}, "required": []})
        );
    }

    #[test]
    fn test_service_and_message_take_required_strings() {
        let registry = registry(&state());

        for (tool, param) in [
            ("filter_logs_by_service", "service"),
            ("filter_logs_by_message", "message"),
        ] {
            let schema = registry.get_by_name(tool).unwrap().parameters();
            let rendered = schema.to_json();
            assert_eq!(rendered["properties"][param]["type"], "string");
            assert_eq!(rendered["required"], json!([param]));

            assert!(schema.validate(&json!({ param: 42 })).is_err());
            assert!(schema.validate(&json!({})).is_err());
            let args = schema.validate(&json!({ param: "auth" })).unwrap();
            assert_eq!(args.get_str(param), Some("auth"));
        }
    }
}
