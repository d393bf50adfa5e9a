//! MCP endpoint for locally hosted tools.
//!
//! A minimal JSON-RPC 2.0 server over `POST /mcp` (single request per body,
//! JSON responses). Supported methods: `initialize`, `ping`, `tools/list`,
//! `tools/call`; notifications are acknowledged with 202.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use relay_domain::FUNCTION_KEY_HEADER;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

/// A tool served over MCP. The handler maps a trigger context
/// (`{"arguments": {...}}`) to a JSON result string and never fails.
#[derive(Clone)]
pub struct McpTool {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
    pub handler: fn(&str) -> String,
}

#[derive(Clone)]
pub struct McpState {
    tools: Arc<Vec<McpTool>>,
    /// Required `x-functions-key` value, if any.
    function_key: Option<Arc<str>>,
}

impl McpState {
    pub fn new(tools: Vec<McpTool>) -> Self {
        Self {
            tools: Arc::new(tools),
            function_key: None,
        }
    }

    pub fn with_function_key(mut self, key: Option<String>) -> Self {
        self.function_key = key.filter(|k| !k.is_empty()).map(Arc::from);
        self
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        match &self.function_key {
            None => true,
            Some(expected) => headers
                .get(FUNCTION_KEY_HEADER)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v == expected.as_ref()),
        }
    }
}

pub fn mcp_router(state: McpState) -> Router {
    Router::new()
        .route("/mcp", post(handle))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle(State(state): State<McpState>, headers: HeaderMap, body: Bytes) -> Response {
    if !state.authorized(&headers) {
        warn!("Rejected MCP request without a valid function key");
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "unauthorized"}))).into_response();
    }

    let request: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            debug!("Unparseable MCP body: {}", e);
            return Json(rpc_error(Value::Null, PARSE_ERROR, "Parse error")).into_response();
        }
    };

    let Some(method) = request.get("method").and_then(Value::as_str) else {
        let id = request.get("id").cloned().unwrap_or(Value::Null);
        return Json(rpc_error(id, INVALID_REQUEST, "Invalid Request")).into_response();
    };

    // Notifications carry no id and get no response body.
    let Some(id) = request.get("id").cloned() else {
        debug!("MCP notification: {}", method);
        return StatusCode::ACCEPTED.into_response();
    };

    let params = request.get("params").cloned().unwrap_or(Value::Null);
    let response = match method {
        "initialize" => rpc_result(id, initialize_result()),
        "ping" => rpc_result(id, json!({})),
        "tools/list" => rpc_result(id, json!({"tools": list_tools(&state.tools)})),
        "tools/call" => match call_tool(&state.tools, &params) {
            Ok(result) => rpc_result(id, result),
            Err(message) => rpc_error(id, INVALID_PARAMS, &message),
        },
        other => rpc_error(id, METHOD_NOT_FOUND, &format!("Method not found: {}", other)),
    };
    Json(response).into_response()
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {"tools": {"listChanged": false}},
        "serverInfo": {"name": "foundry-relay", "version": env!("CARGO_PKG_VERSION")},
    })
}

fn list_tools(tools: &[McpTool]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "inputSchema": tool.input_schema,
            })
        })
        .collect()
}

fn call_tool(tools: &[McpTool], params: &Value) -> Result<Value, String> {
    let name = params
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| "Missing tool name".to_string())?;
    let tool = tools
        .iter()
        .find(|t| t.name == name)
        .ok_or_else(|| format!("Unknown tool: {}", name))?;

    let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
    let context = json!({"arguments": arguments}).to_string();
    let text = (tool.handler)(&context);
    let is_error = serde_json::from_str::<Value>(&text)
        .map(|v| v.get("error").is_some())
        .unwrap_or(false);

    Ok(json!({
        "content": [{"type": "text", "text": text}],
        "isError": is_error,
    }))
}

fn rpc_result(id: Value, result: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "result": result})
}

fn rpc_error(id: Value, code: i64, message: &str) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "error": {"code": code, "message": message}})
}
