//! Tools listing command

use crate::dashboard::AppState;
use crate::tools::create_cli_tool_registry;
use anyhow::Result;
use colored::Colorize;
use tracing::info;

/// Show available tools, or their advertised schemas with `json`
pub async fn tools_command(state: &AppState, json: bool) -> Result<()> {
    info!("Listing available tools");

    let registry = create_cli_tool_registry(state);

    if json {
        println!("{}", serde_json::to_string_pretty(&registry.get_all())?);
        return Ok(());
    }

    println!("{}\n", "Available Tools".bold());

    for definition in registry.get_all() {
        let function = definition.function;
        println!("  {}", function.name.cyan());
        println!("    {}", function.description);

        let required = function.parameters["required"]
            .as_array()
            .cloned()
            .unwrap_or_default();
        if let Some(properties) = function.parameters["properties"].as_object() {
            for (name, property) in properties {
                let kind = property["type"].as_str().unwrap_or("any");
                let marker = if required.iter().any(|r| r == name) {
                    "required"
                } else {
                    "optional"
                };
                let allowed = property["enum"]
                    .as_array()
                    .map(|values| {
                        let values: Vec<String> = values
                            .iter()
                            .filter_map(|v| v.as_str().map(str::to_string))
                            .collect();
                        format!(" one of [{}]", values.join(", "))
                    })
                    .unwrap_or_default();
                println!("      - {}: {} ({}){}", name, kind, marker, allowed);
            }
        }
        println!();
    }

    Ok(())
}
