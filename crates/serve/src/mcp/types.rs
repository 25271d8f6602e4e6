//! JSON-RPC 2.0 and MCP message types

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Protocol revision answered when the client does not name one
pub const DEFAULT_PROTOCOL_VERSION: &str = "2025-06-18";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// A validated incoming message
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcRequest {
    /// `None` for notifications
    pub id: Option<Value>,
    pub method: String,
    pub params: Value,
}

impl JsonRpcRequest {
    /// Validate a decoded JSON value as a JSON-RPC request
    pub fn from_value(value: Value) -> Result<Self, JsonRpcError> {
        let Value::Object(mut object) = value else {
            return Err(JsonRpcError::new(INVALID_REQUEST, "Invalid Request"));
        };

        if object.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
            return Err(JsonRpcError::new(INVALID_REQUEST, "Invalid Request"));
        }

        let method = match object.remove("method") {
            Some(Value::String(method)) => method,
            _ => return Err(JsonRpcError::new(INVALID_REQUEST, "Invalid Request")),
        };

        let id = object.remove("id");
        if let Some(id) = &id {
            if !(id.is_string() || id.is_number() || id.is_null()) {
                return Err(JsonRpcError::new(INVALID_REQUEST, "Invalid Request"));
            }
        }

        Ok(Self {
            id,
            method,
            params: object.remove("params").unwrap_or(Value::Null),
        })
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Outgoing response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new<S: Into<String>>(code: i64, message: S) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn internal() -> Self {
        Self::new(INTERNAL_ERROR, "Internal server error")
    }
}

/// `tools/call` parameters
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Tool advertised by `tools/list`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub title: String,
    pub description: String,
    pub input_schema: Value,
}

/// One content block of a tool result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// Result of `tools/call`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    pub structured_content: Value,
    pub is_error: bool,
}

impl ToolResult {
    /// Successful result carrying `value` as text and structured content
    pub fn ok(value: Value) -> Self {
        Self::build(value, false)
    }

    /// Error-flagged result with an `{ "error": message }` payload
    pub fn error<S: Into<String>>(message: S) -> Self {
        Self::build(serde_json::json!({ "error": message.into() }), true)
    }

    fn build(value: Value, is_error: bool) -> Self {
        Self {
            content: vec![ToolContent {
                kind: "text".to_string(),
                text: value.to_string(),
            }],
            structured_content: value,
            is_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_validation() {
        let request = JsonRpcRequest::from_value(json!({
            "jsonrpc": "2.0", "id": 1, "method": "ping"
        }))
        .unwrap();
        assert_eq!(request.method, "ping");
        assert!(!request.is_notification());

        let notification = JsonRpcRequest::from_value(json!({
            "jsonrpc": "2.0", "method": "notifications/initialized"
        }))
        .unwrap();
        assert!(notification.is_notification());

        for invalid in [
            json!([]),
            json!({"jsonrpc": "1.0", "id": 1, "method": "ping"}),
            json!({"jsonrpc": "2.0", "id": 1}),
            json!({"jsonrpc": "2.0", "id": {"a": 1}, "method": "ping"}),
        ] {
            let err = JsonRpcRequest::from_value(invalid).unwrap_err();
            assert_eq!(err.code, INVALID_REQUEST);
        }
    }

    #[test]
    fn test_tool_result_shapes() {
        let result = serde_json::to_value(ToolResult::error("Not found")).unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["structuredContent"]["error"], "Not found");
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(result["content"][0]["text"], r#"{"error":"Not found"}"#);
    }

    #[test]
    fn test_response_omits_absent_members() {
        let response = JsonRpcResponse::success(json!(1), json!({}));
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["jsonrpc"], "2.0");
    }
}
