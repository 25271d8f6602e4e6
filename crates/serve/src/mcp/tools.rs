//! The `search` and `fetch` tools

use super::types::{ToolDefinition, ToolResult};
use feedcache_core::{FetchOutcome, QueryEngine};
use serde::Deserialize;
use serde_json::{json, Value};

pub const SEARCH_TOOL: &str = "search";
pub const FETCH_TOOL: &str = "fetch";

#[derive(Debug, Deserialize)]
struct SearchArguments {
    q: String,
}

#[derive(Debug, Deserialize)]
struct FetchArguments {
    id: String,
}

/// Tools advertised by `tools/list`
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: SEARCH_TOOL.to_string(),
            title: "Search catalogue".to_string(),
            description: "Case-insensitive substring search over the product feed. \
                          Returns matching record ids with a title and snippet."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "q": { "type": "string", "description": "Text to look for" }
                },
                "required": ["q"]
            }),
        },
        ToolDefinition {
            name: FETCH_TOOL.to_string(),
            title: "Fetch record".to_string(),
            description: "Return the full text of one catalogue record by id.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string", "description": "Record id from a search result" }
                },
                "required": ["id"]
            }),
        },
    ]
}

/// Whether `name` is a known tool
pub fn is_known(name: &str) -> bool {
    name == SEARCH_TOOL || name == FETCH_TOOL
}

/// Run a known tool; engine failures come back as error-flagged results
pub async fn call_tool(engine: &QueryEngine, name: &str, arguments: Value) -> ToolResult {
    match name {
        SEARCH_TOOL => {
            let args: SearchArguments = match serde_json::from_value(arguments) {
                Ok(args) => args,
                Err(e) => return ToolResult::error(format!("Invalid arguments: {}", e)),
            };
            match engine.search(&args.q).await {
                Ok(response) => to_result(&response),
                Err(e) => ToolResult::error(e.to_string()),
            }
        }
        FETCH_TOOL => {
            let args: FetchArguments = match serde_json::from_value(arguments) {
                Ok(args) => args,
                Err(e) => return ToolResult::error(format!("Invalid arguments: {}", e)),
            };
            match engine.fetch_by_id(&args.id).await {
                Ok(FetchOutcome::Found(record)) => to_result(&record),
                Ok(FetchOutcome::NotFound { .. }) => ToolResult::error("Not found"),
                Err(e) => ToolResult::error(e.to_string()),
            }
        }
        other => ToolResult::error(format!("Unknown tool: {}", other)),
    }
}

fn to_result<T: serde::Serialize>(value: &T) -> ToolResult {
    match serde_json::to_value(value) {
        Ok(value) => ToolResult::ok(value),
        Err(e) => {
            tracing::error!("Failed to serialize tool output: {}", e);
            ToolResult::error("Internal server error")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_definitions() {
        let tools = tool_definitions();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["search", "fetch"]);
        assert_eq!(tools[0].input_schema["required"][0], "q");
        assert_eq!(tools[1].input_schema["required"][0], "id");
        assert!(is_known("fetch"));
        assert!(!is_known("add"));
    }
}
