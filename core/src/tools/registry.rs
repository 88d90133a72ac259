//! Tool registry for managing available tools

use crate::llm::ToolDefinition;
use crate::tools::Tool;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry mapping tool names to tools
///
/// Populated once at startup, then shared read-only with the conversation
/// loop. Registering a name twice replaces the earlier tool.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

/// A feature module that contributes tools at startup
pub trait ToolProvider: Send + Sync {
    /// Name of the feature module, for logging
    fn provider_name(&self) -> &str;

    /// Register this module's tools
    fn register_tools(&self, registry: &mut ToolRegistry);
}

impl ToolRegistry {
    /// Create a new empty tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under an explicit name, replacing any previous tool
    pub fn register_tool<S: Into<String>>(&mut self, name: S, tool: Arc<dyn Tool>) {
        let name = name.into();
        if self.tools.insert(name.clone(), tool).is_some() {
            tracing::debug!("Tool '{}' re-registered, previous definition replaced", name);
        } else {
            self.order.push(name);
        }
    }

    /// Register a tool under its own name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        self.register_tool(name, Arc::new(tool));
    }

    /// Let a feature module register its tools
    pub fn register_provider(&mut self, provider: &dyn ToolProvider) {
        let before = self.tools.len();
        provider.register_tools(self);
        tracing::debug!(
            "Provider '{}' registered {} new tool(s)",
            provider.provider_name(),
            self.tools.len() - before
        );
    }

    /// Schemas of all registered tools, in first-registration order
    pub fn get_all(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| {
                self.tools.get(name).map(|tool| {
                    let mut definition = tool.definition();
                    definition.function.name = name.clone();
                    definition
                })
            })
            .collect()
    }

    /// Look up a tool by name
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Whether a tool is registered under the name
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List all registered tool names
    pub fn list_tools(&self) -> Vec<&str> {
        self.order.iter().map(|s| s.as_str()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry has no tools
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::tools::{ParameterKind, ParameterSchema, ToolArguments};
    use async_trait::async_trait;

    struct StaticTool {
        name: &'static str,
        reply: &'static str,
    }

    #[async_trait]
    impl Tool for StaticTool {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "Returns a fixed reply"
        }

        fn parameters(&self) -> ParameterSchema {
            ParameterSchema::new().optional("note", ParameterKind::String, "Ignored")
        }

        async fn execute(&self, _args: ToolArguments) -> Result<Option<String>> {
            Ok(Some(self.reply.to_string()))
        }
    }

    struct PairProvider;

    impl ToolProvider for PairProvider {
        fn provider_name(&self) -> &str {
            "pair"
        }

        fn register_tools(&self, registry: &mut ToolRegistry) {
            registry.register(StaticTool {
                name: "first",
                reply: "1",
            });
            registry.register(StaticTool {
                name: "second",
                reply: "2",
            });
        }
    }

    #[tokio::test]
    async fn test_last_registration_wins() {
        let mut registry = ToolRegistry::new();
        registry.register(StaticTool {
            name: "echo",
            reply: "old",
        });
        registry.register(StaticTool {
            name: "echo",
            reply: "new",
        });

        assert_eq!(registry.len(), 1);
        let tool = registry.get_by_name("echo").unwrap();
        let reply = tool.execute(ToolArguments::new()).await.unwrap();
        assert_eq!(reply.as_deref(), Some("new"));
    }

    #[test]
    fn test_get_all_one_schema_per_name_in_insertion_order() {
        let mut registry = ToolRegistry::new();
        for name in ["b", "a", "c", "a"] {
            registry.register(StaticTool { name, reply: "" });
        }

        let names: Vec<String> = registry
            .get_all()
            .into_iter()
            .map(|d| d.function.name)
            .collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(registry.list_tools(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_get_all_schema_shape() {
        let mut registry = ToolRegistry::new();
        registry.register(StaticTool {
            name: "echo",
            reply: "",
        });

        let definitions = registry.get_all();
        assert_eq!(definitions.len(), 1);
        let definition = &definitions[0];
        assert_eq!(definition.tool_type, "function");
        assert_eq!(definition.function.description, "Returns a fixed reply");
        assert_eq!(definition.function.parameters["type"], "object");
        assert!(definition.function.parameters["properties"]["note"].is_object());
    }

    #[test]
    fn test_registered_name_is_advertised() {
        let mut registry = ToolRegistry::new();
        registry.register_tool(
            "alias",
            Arc::new(StaticTool {
                name: "echo",
                reply: "",
            }),
        );

        assert!(registry.contains("alias"));
        assert!(!registry.contains("echo"));
        assert_eq!(registry.get_all()[0].function.name, "alias");
    }

    #[test]
    fn test_unknown_name_is_none() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get_by_name("foo").is_none());
    }

    #[test]
    fn test_register_provider() {
        let mut registry = ToolRegistry::new();
        registry.register_provider(&PairProvider);
        assert_eq!(registry.list_tools(), vec!["first", "second"]);
    }
}
