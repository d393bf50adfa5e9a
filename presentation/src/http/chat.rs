//! Chat API router.
//!
//! `POST /api/chat` takes `{message, agentId?, thread?}` and answers
//! `{reply, agentId, thread}`. Failures map to:
//!
//! | error category  | status | body                                              |
//! |-----------------|--------|---------------------------------------------------|
//! | Client          | 400    | `{error}`                                         |
//! | Configuration   | 500    | `{error}`                                         |
//! | Service         | 502    | `{error: "Failed to contact Azure AI Agent", details}` |

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use relay_application::{ChatError, ChatInput, ChatUseCase, ErrorCategory};
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

pub const SERVICE_ERROR: &str = "Failed to contact Azure AI Agent";

#[derive(Clone)]
pub struct ChatState {
    use_case: Arc<dyn ChatUseCase>,
}

impl ChatState {
    pub fn new(use_case: Arc<dyn ChatUseCase>) -> Self {
        Self { use_case }
    }
}

/// Build the chat router; `/` and unmatched paths are served from `static_dir`.
pub fn chat_router(state: ChatState, static_dir: &Path) -> Router {
    let assets = ServeDir::new(static_dir)
        .not_found_service(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/api/chat", post(chat))
        .route("/healthz", get(healthz))
        .fallback_service(assets)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn chat(State(state): State<ChatState>, body: Bytes) -> Response {
    let input = chat_input(&body);
    match state.use_case.execute(input).await {
        Ok(output) => Json(output).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Bodies that are not a JSON object count as empty requests.
fn chat_input(body: &[u8]) -> ChatInput {
    let payload: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
    let text = |key: &str| payload.get(key).and_then(Value::as_str).map(str::to_string);
    ChatInput {
        message: text("message"),
        agent_id: text("agentId"),
        thread: payload.get("thread").cloned(),
    }
}

fn error_response(err: &ChatError) -> Response {
    match err.category() {
        ErrorCategory::Client => {
            warn!("Rejected chat request: {}", err);
            (StatusCode::BAD_REQUEST, Json(json!({"error": err.to_string()}))).into_response()
        }
        ErrorCategory::Configuration => {
            error!("Chat service misconfigured: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": err.to_string()})),
            )
                .into_response()
        }
        ErrorCategory::Service => {
            error!("Agent call failed: {}", err);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({"error": SERVICE_ERROR, "details": err.to_string()})),
            )
                .into_response()
        }
    }
}
