//! Base tool trait

use crate::error::Result;
use crate::llm::{FunctionDefinition, ToolDefinition};
use crate::tools::schema::{ParameterSchema, ToolArguments};
use async_trait::async_trait;

/// Trait for all tools the model may invoke
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the name of the tool
    fn name(&self) -> &str;

    /// Get the description of the tool
    fn description(&self) -> &str;

    /// Get the declared parameters of the tool
    fn parameters(&self) -> ParameterSchema;

    /// Execute the tool with validated arguments
    ///
    /// `Ok(None)` means the tool ran but has nothing to report back.
    async fn execute(&self, args: ToolArguments) -> Result<Option<String>>;

    /// Schema advertised to the model
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(FunctionDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters().to_json(),
        })
    }
}
