//! MCP endpoint over JSON-RPC 2.0
//!
//! Stateless request/response transport: every POST carries one message and
//! requests are answered with a JSON body. Notifications get `202 Accepted`.

pub mod tools;
pub mod types;

use crate::handlers::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};
use tracing::{debug, warn};
use types::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallParams, DEFAULT_PROTOCOL_VERSION,
    INVALID_PARAMS, METHOD_NOT_FOUND, PARSE_ERROR,
};

/// Name reported in `serverInfo`
pub const SERVER_NAME: &str = "feedcache";

/// POST /api/mcp
pub async fn handle_mcp(State(state): State<AppState>, body: Bytes) -> Response {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            debug!("Rejecting unparseable MCP body: {}", e);
            return reply(JsonRpcResponse::failure(
                Value::Null,
                JsonRpcError::new(PARSE_ERROR, "Parse error"),
            ));
        }
    };

    let request = match JsonRpcRequest::from_value(value) {
        Ok(request) => request,
        Err(error) => return reply(JsonRpcResponse::failure(Value::Null, error)),
    };

    if request.is_notification() {
        debug!("MCP notification {}", request.method);
        return StatusCode::ACCEPTED.into_response();
    }

    let id = request.id.clone().unwrap_or(Value::Null);
    let response = match dispatch(&state, request).await {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(error) => JsonRpcResponse::failure(id, error),
    };

    reply(response)
}

async fn dispatch(state: &AppState, request: JsonRpcRequest) -> Result<Value, JsonRpcError> {
    match request.method.as_str() {
        "initialize" => Ok(initialize(&request.params)),
        "ping" => Ok(json!({})),
        "tools/list" => to_value(json!({ "tools": tools::tool_definitions() })),
        "tools/call" => {
            let params: ToolCallParams = serde_json::from_value(request.params)
                .map_err(|e| JsonRpcError::new(INVALID_PARAMS, format!("Invalid params: {}", e)))?;

            if !tools::is_known(&params.name) {
                return Err(JsonRpcError::new(
                    INVALID_PARAMS,
                    format!("Unknown tool: {}", params.name),
                ));
            }

            let result = tools::call_tool(&state.engine, &params.name, params.arguments).await;
            to_value(result)
        }
        other => {
            warn!("Unknown MCP method: {}", other);
            Err(JsonRpcError::new(METHOD_NOT_FOUND, "Method not found"))
        }
    }
}

fn initialize(params: &Value) -> Value {
    let protocol_version = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PROTOCOL_VERSION);

    json!({
        "protocolVersion": protocol_version,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": { "name": SERVER_NAME, "version": crate::VERSION }
    })
}

fn to_value<T: serde::Serialize>(value: T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| {
        tracing::error!("Failed to serialize MCP result: {}", e);
        JsonRpcError::internal()
    })
}

fn reply(response: JsonRpcResponse) -> Response {
    Json(response).into_response()
}
