//! In-process stand-in for the Agents REST API, for client tests.
//!
//! Every request is recorded as `"METHOD path"` with the path relative to the
//! project endpoint. Runs report the scripted statuses in order, one per poll,
//! and repeat the last one once the script runs out.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use reqwest::Url;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

const PROJECT_PATH: &str = "/api/projects/demo";

/// Thread id the service answers 404 for.
pub const MISSING_THREAD: &str = "thread_gone";

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub call: String,
    pub query: String,
    pub body: Option<Value>,
}

#[derive(Default)]
struct ServiceState {
    calls: Vec<RecordedCall>,
    statuses: VecDeque<String>,
    last_status: String,
    agents: usize,
    threads: usize,
    run_agent: String,
}

impl ServiceState {
    fn next_status(&mut self) -> String {
        if let Some(status) = self.statuses.pop_front() {
            self.last_status = status;
        }
        self.last_status.clone()
    }
}

type Shared = Arc<Mutex<ServiceState>>;

pub struct FakeService {
    addr: SocketAddr,
    state: Shared,
}

impl FakeService {
    pub async fn start(statuses: &[&str]) -> Self {
        let state: Shared = Arc::new(Mutex::new(ServiceState {
            statuses: statuses.iter().map(|s| s.to_string()).collect(),
            last_status: "completed".to_string(),
            ..ServiceState::default()
        }));
        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, state }
    }

    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}{}", self.addr, PROJECT_PATH)).unwrap()
    }

    pub fn calls(&self) -> Vec<String> {
        self.recorded().into_iter().map(|c| c.call).collect()
    }

    /// JSON body of the first request recorded as `call`.
    pub fn body_of(&self, call: &str) -> Option<Value> {
        self.recorded()
            .into_iter()
            .find(|c| c.call == call)
            .and_then(|c| c.body)
    }

    /// Raw query string of the first request recorded as `call`.
    pub fn query_of(&self, call: &str) -> Option<String> {
        self.recorded()
            .into_iter()
            .find(|c| c.call == call)
            .map(|c| c.query)
    }

    fn recorded(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }
}

async fn handle(State(state): State<Shared>, method: Method, uri: Uri, body: Bytes) -> Response {
    let path = uri
        .path()
        .strip_prefix(PROJECT_PATH)
        .unwrap_or(uri.path())
        .trim_start_matches('/')
        .to_string();
    let mut state = state.lock().unwrap();
    state.calls.push(RecordedCall {
        call: format!("{} {}", method, path),
        query: uri.query().unwrap_or_default().to_string(),
        body: serde_json::from_slice(&body).ok(),
    });

    let segments: Vec<&str> = path.split('/').collect();
    if segments.get(1) == Some(&MISSING_THREAD) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {
                "code": "NotFound",
                "message": format!("No thread found with id '{}'.", MISSING_THREAD)
            }})),
        )
            .into_response();
    }

    let reply = match (method.as_str(), segments.as_slice()) {
        ("POST", ["assistants"]) => {
            state.agents += 1;
            json!({"id": format!("asst_{}", state.agents), "object": "assistant"})
        }
        ("DELETE", [_, _]) => json!({"deleted": true}),
        ("POST", ["threads"]) => {
            state.threads += 1;
            json!({"id": format!("thread_{}", state.threads), "object": "thread"})
        }
        ("POST", ["threads", _, "messages"]) => json!({"id": "msg_1", "object": "thread.message"}),
        ("POST", ["threads", _, "runs"]) => {
            state.run_agent = serde_json::from_slice::<Value>(&body)
                .ok()
                .and_then(|b| b["assistant_id"].as_str().map(str::to_string))
                .unwrap_or_default();
            let status = state.next_status();
            run_json(&status)
        }
        ("GET", ["threads", _, "runs", _]) => {
            let status = state.next_status();
            run_json(&status)
        }
        ("GET", ["threads", _, "messages"]) => json!({
            "object": "list",
            "data": [
                {"id": "msg_1", "role": "user", "content": [
                    {"type": "text", "text": {"value": "question", "annotations": []}}
                ]},
                {"id": "msg_2", "role": "assistant", "content": [
                    {"type": "text", "text": {
                        "value": format!("reply from {}", state.run_agent),
                        "annotations": []
                    }}
                ]}
            ]
        }),
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    Json(reply).into_response()
}

fn run_json(status: &str) -> Value {
    if status == "completed" || status == "queued" || status == "in_progress" {
        json!({"id": "run_1", "object": "thread.run", "status": status})
    } else {
        json!({
            "id": "run_1",
            "object": "thread.run",
            "status": status,
            "last_error": {"code": "server_error", "message": format!("run {}", status)}
        })
    }
}
