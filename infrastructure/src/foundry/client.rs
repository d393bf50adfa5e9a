//! Request-scoped Agents REST client.

use super::protocol::{
    AgentObject, CreateAgentRequest, CreateRunRequest, CreateThreadRequest, MessageInput,
    MessageList, RunObject, RunPhase, ThreadObject, error_message,
};
use super::runtime::FoundryOptions;
use async_trait::async_trait;
use relay_application::{AgentClient, RuntimeError, TurnOutcome};
use relay_domain::util::preview;
use relay_domain::{
    AgentHandle, AgentId, AgentSpec, ChatMessage, Retention, Role, StageOutput, ThreadState,
    ToolDescriptor,
};
use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

pub struct FoundryAgentClient {
    http: reqwest::Client,
    base: Url,
    token: String,
    options: FoundryOptions,
    /// Agents to delete on close.
    ephemeral: Mutex<Vec<AgentId>>,
}

impl FoundryAgentClient {
    /// `base` is the project endpoint, e.g.
    /// `https://<resource>.services.ai.azure.com/api/projects/<project>`.
    pub fn new(
        http: reqwest::Client,
        base: Url,
        token: impl Into<String>,
        options: FoundryOptions,
    ) -> Self {
        Self {
            http,
            base,
            token: token.into(),
            options,
            ephemeral: Mutex::new(Vec::new()),
        }
    }

    /// Project URL with `segments` appended. Each segment is percent-encoded,
    /// so ids can never add path components or a query.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.url(segments))
            .query(&[("api-version", self.options.api_version.as_str())])
            .bearer_auth(&self.token)
    }

    /// Send a request and return the body of a successful response.
    async fn send_raw(&self, request: reqwest::RequestBuilder) -> Result<String, RuntimeError> {
        let response = request
            .send()
            .await
            .map_err(|e| RuntimeError::ConnectionError(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RuntimeError::ConnectionError(e.to_string()))?;

        if !status.is_success() {
            return Err(RuntimeError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(body)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, RuntimeError> {
        let body = self.send_raw(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            RuntimeError::InvalidResponse(format!("{}: {}", e, preview(&body, 200)))
        })
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, RuntimeError> {
        self.send(self.request(Method::POST, segments).json(body))
            .await
    }

    async fn delete(&self, segments: &[&str]) -> Result<(), RuntimeError> {
        self.send_raw(self.request(Method::DELETE, segments))
            .await
            .map(|_| ())
    }

    async fn create_thread(&self, request: &CreateThreadRequest) -> Result<String, RuntimeError> {
        let thread: ThreadObject = self.post(&["threads"], request).await?;
        debug!("Created thread {}", thread.id);
        Ok(thread.id)
    }

    /// Start a run and poll until it leaves the pending states.
    async fn run_to_completion(
        &self,
        thread_id: &str,
        request: &CreateRunRequest<'_>,
    ) -> Result<RunObject, RuntimeError> {
        let mut run: RunObject = self.post(&["threads", thread_id, "runs"], request).await?;
        debug!("Started run {} on thread {}", run.id, thread_id);

        loop {
            match run.phase() {
                RunPhase::Completed => return Ok(run),
                RunPhase::Failed => {
                    return Err(RuntimeError::RunFailed {
                        message: run.failure_message(),
                        run_id: run.id,
                        status: run.status,
                    });
                }
                RunPhase::Pending => {
                    tokio::time::sleep(self.options.poll_interval).await;
                    let request =
                        self.request(Method::GET, &["threads", thread_id, "runs", &run.id]);
                    run = self.send(request).await?;
                }
            }
        }
    }

    /// Messages the agent produced during a run, oldest first.
    async fn run_messages(
        &self,
        thread_id: &str,
        run_id: &str,
    ) -> Result<Vec<ChatMessage>, RuntimeError> {
        let request = self
            .request(Method::GET, &["threads", thread_id, "messages"])
            .query(&[("order", "asc"), ("run_id", run_id)]);
        let list: MessageList = self.send(request).await?;
        Ok(list
            .data
            .into_iter()
            .map(|m| m.into_chat_message())
            .filter(|m| m.role == Role::Assistant)
            .collect())
    }
}

#[async_trait]
impl AgentClient for FoundryAgentClient {
    async fn create_agent(
        &self,
        spec: &AgentSpec,
        retention: Retention,
    ) -> Result<AgentHandle, RuntimeError> {
        let request = CreateAgentRequest {
            model: &spec.model,
            name: &spec.name,
            instructions: spec.instructions.as_deref(),
        };
        let agent: AgentObject = self.post(&["assistants"], &request).await?;
        let id = AgentId::new(agent.id);
        debug!("Created agent {} ({:?}) id={}", spec.name, retention, id);

        if retention == Retention::Ephemeral && !id.is_empty() {
            self.ephemeral
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(id.clone());
        }
        Ok(AgentHandle::created(id, &spec.name, retention))
    }

    async fn run_turn(
        &self,
        agent: &AgentHandle,
        thread: ThreadState,
        message: &str,
        tool: Option<&ToolDescriptor>,
    ) -> Result<TurnOutcome, RuntimeError> {
        let thread_id = match thread.service_thread_id() {
            Some(id) => id.to_string(),
            None => self.create_thread(&CreateThreadRequest::default()).await?,
        };

        let _: serde_json::Value = self
            .post(
                &["threads", &thread_id, "messages"],
                &MessageInput::user(message),
            )
            .await?;

        let mut request = CreateRunRequest::new(agent.id.as_str());
        if let Some(tool) = tool {
            request = request.with_mcp_tool(tool);
        }
        let run = self.run_to_completion(&thread_id, &request).await?;

        let reply = self
            .run_messages(&thread_id, &run.id)
            .await?
            .iter()
            .map(ChatMessage::full_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(TurnOutcome {
            reply,
            thread: ThreadState::bound(thread_id),
        })
    }

    async fn run_stage(
        &self,
        agent: &AgentHandle,
        conversation: &[ChatMessage],
    ) -> Result<StageOutput, RuntimeError> {
        let thread_id = self
            .create_thread(&CreateThreadRequest::seeded(conversation))
            .await?;

        let result = async {
            let run = self
                .run_to_completion(&thread_id, &CreateRunRequest::new(agent.id.as_str()))
                .await?;
            self.run_messages(&thread_id, &run.id).await
        }
        .await;

        if let Err(e) = self.delete(&["threads", &thread_id]).await {
            warn!("Failed to delete stage thread {}: {}", thread_id, e);
        }

        let messages = result?
            .into_iter()
            .map(|m| m.with_author(&agent.name))
            .collect();
        Ok(StageOutput::from_messages(messages))
    }

    async fn close(&self) -> Result<(), RuntimeError> {
        let ids: Vec<AgentId> = self
            .ephemeral
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();

        let mut first_error = None;
        for id in ids {
            match self.delete(&["assistants", id.as_str()]).await {
                Ok(()) => debug!("Deleted agent {}", id),
                Err(e) => {
                    warn!("Failed to delete agent {}: {}", id, e);
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundry::fake_service::{FakeService, MISSING_THREAD};
    use relay_domain::ContentPart;
    use std::time::Duration;

    const BASE: &str = "https://w.services.ai.azure.com/api/projects/demo";

    fn client() -> FoundryAgentClient {
        FoundryAgentClient::new(
            reqwest::Client::new(),
            Url::parse(BASE).unwrap(),
            "token",
            FoundryOptions::default(),
        )
    }

    fn client_for(service: &FakeService) -> FoundryAgentClient {
        FoundryAgentClient::new(
            reqwest::Client::new(),
            service.base_url(),
            "token",
            FoundryOptions {
                poll_interval: Duration::from_millis(1),
                ..FoundryOptions::default()
            },
        )
    }

    fn spec(name: &str) -> AgentSpec {
        AgentSpec::new(name, "gpt-4o").with_instructions("Be brief.")
    }

    #[test]
    fn test_requests_carry_api_version_and_bearer_token() {
        let client = client();
        let request = client
            .request(Method::GET, &["assistants"])
            .build()
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://w.services.ai.azure.com/api/projects/demo/assistants?api-version=v1"
        );
        assert_eq!(request.headers()["authorization"], "Bearer token");
    }

    #[test]
    fn test_extra_query_is_appended() {
        let client = client();
        let request = client
            .request(Method::GET, &["threads", "t1", "messages"])
            .query(&[("order", "asc"), ("run_id", "run_9")])
            .build()
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://w.services.ai.azure.com/api/projects/demo/threads/t1/messages?api-version=v1&order=asc&run_id=run_9"
        );
    }

    #[test]
    fn test_ids_cannot_escape_their_path_segment() {
        let client = client();
        let url = client.url(&[
            "threads",
            "../assistants/asst_victim?api-version=v1#",
            "messages",
        ]);
        assert_eq!(url.host_str(), Some("w.services.ai.azure.com"));
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
        let segments: Vec<&str> = url.path_segments().unwrap().collect();
        assert_eq!(segments.len(), 6);
        assert_eq!(&segments[..3], &["api", "projects", "demo"]);
        assert_eq!(segments[3], "threads");
        assert!(segments[4].contains("%2F"));
        assert!(segments[4].contains("%3F"));
        assert_eq!(segments[5], "messages");
    }

    #[tokio::test]
    async fn test_first_turn_creates_thread_then_posts_runs_and_polls() {
        let service = FakeService::start(&["queued", "in_progress", "completed"]).await;
        let client = client_for(&service);
        let agent = AgentHandle::attached(AgentId::new("asst_1"), "WorkshopAssistant");

        let outcome = client
            .run_turn(&agent, ThreadState::new(), "今何時？", None)
            .await
            .unwrap();

        assert_eq!(outcome.reply, "reply from asst_1");
        assert_eq!(outcome.thread, ThreadState::bound("thread_1"));
        assert_eq!(
            service.calls(),
            vec![
                "POST threads",
                "POST threads/thread_1/messages",
                "POST threads/thread_1/runs",
                "GET threads/thread_1/runs/run_1",
                "GET threads/thread_1/runs/run_1",
                "GET threads/thread_1/messages",
            ]
        );

        let message = service.body_of("POST threads/thread_1/messages").unwrap();
        assert_eq!(message["role"], "user");
        assert_eq!(message["content"], "今何時？");
        let run = service.body_of("POST threads/thread_1/runs").unwrap();
        assert_eq!(run["assistant_id"], "asst_1");
        assert!(run.get("tools").is_none());

        let query = service.query_of("GET threads/thread_1/messages").unwrap();
        assert!(query.contains("api-version=v1"));
        assert!(query.contains("run_id=run_1"));
    }

    #[tokio::test]
    async fn test_restored_thread_is_reused() {
        let service = FakeService::start(&["completed"]).await;
        let client = client_for(&service);
        let agent = AgentHandle::attached(AgentId::new("asst_1"), "WorkshopAssistant");

        let outcome = client
            .run_turn(&agent, ThreadState::bound("thread_existing"), "続けて", None)
            .await
            .unwrap();

        assert_eq!(outcome.thread, ThreadState::bound("thread_existing"));
        let calls = service.calls();
        assert!(!calls.contains(&"POST threads".to_string()));
        assert_eq!(calls[0], "POST threads/thread_existing/messages");
    }

    #[tokio::test]
    async fn test_turn_attaches_mcp_tool() {
        let service = FakeService::start(&["completed"]).await;
        let client = client_for(&service);
        let agent = AgentHandle::attached(AgentId::new("asst_1"), "WorkshopAssistant");
        let tool = ToolDescriptor::new("current_time_mcp", "https://fn.example/runtime/webhooks/mcp")
            .with_auth_key(Some("k"));

        client
            .run_turn(&agent, ThreadState::new(), "hi", Some(&tool))
            .await
            .unwrap();

        let run = service.body_of("POST threads/thread_1/runs").unwrap();
        assert_eq!(run["tools"][0]["type"], "mcp");
        assert_eq!(
            run["tool_resources"]["mcp"][0]["headers"]["x-functions-key"],
            "k"
        );
    }

    #[tokio::test]
    async fn test_terminal_failures_become_run_failed() {
        for status in ["failed", "requires_action", "expired"] {
            let service = FakeService::start(&["in_progress", status]).await;
            let client = client_for(&service);
            let agent = AgentHandle::attached(AgentId::new("asst_1"), "WorkshopAssistant");

            let err = client
                .run_turn(&agent, ThreadState::new(), "hi", None)
                .await
                .unwrap_err();
            match err {
                RuntimeError::RunFailed {
                    run_id,
                    status: seen,
                    ..
                } => {
                    assert_eq!(run_id, "run_1");
                    assert_eq!(seen, status);
                }
                other => panic!("expected RunFailed for {status}, got {other:?}"),
            }
            assert!(
                !service
                    .calls()
                    .contains(&"GET threads/thread_1/messages".to_string())
            );
        }
    }

    #[tokio::test]
    async fn test_service_errors_carry_status_and_message() {
        let service = FakeService::start(&["completed"]).await;
        let client = client_for(&service);
        let agent = AgentHandle::attached(AgentId::new("asst_missing"), "WorkshopAssistant");

        let err = client
            .run_turn(&agent, ThreadState::bound(MISSING_THREAD), "hi", None)
            .await
            .unwrap_err();
        match err {
            RuntimeError::Status { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "No thread found with id 'thread_gone'.");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stage_seeds_thread_and_deletes_it() {
        let service = FakeService::start(&["completed"]).await;
        let client = client_for(&service);
        let writer = AgentHandle::created(AgentId::new("asst_w"), "WorkshopWriter", Retention::Ephemeral);
        let conversation = vec![
            ChatMessage::user("調べて"),
            ChatMessage::assistant_parts(vec![ContentPart::text("research notes")])
                .with_author("WorkshopAssistant"),
        ];

        let output = client.run_stage(&writer, &conversation).await.unwrap();

        assert_eq!(output.extract_reply(), "reply from asst_w");
        match &output {
            StageOutput::MessageList(messages) => {
                assert_eq!(messages[0].author_name.as_deref(), Some("WorkshopWriter"));
            }
            other => panic!("expected MessageList, got {other:?}"),
        }
        assert_eq!(
            service.calls(),
            vec![
                "POST threads",
                "POST threads/thread_1/runs",
                "GET threads/thread_1/messages",
                "DELETE threads/thread_1",
            ]
        );
        let seeded = service.body_of("POST threads").unwrap();
        assert_eq!(seeded["messages"][0]["role"], "user");
        assert_eq!(seeded["messages"][1]["role"], "assistant");
        assert_eq!(seeded["messages"][1]["content"], "research notes");
    }

    #[tokio::test]
    async fn test_failed_stage_still_deletes_its_thread() {
        let service = FakeService::start(&["failed"]).await;
        let client = client_for(&service);
        let reviewer =
            AgentHandle::created(AgentId::new("asst_v"), "WorkshopReviewer", Retention::Ephemeral);

        let err = client
            .run_stage(&reviewer, &[ChatMessage::user("draft")])
            .await
            .unwrap_err();

        assert!(matches!(err, RuntimeError::RunFailed { .. }));
        assert_eq!(service.calls().last().unwrap(), "DELETE threads/thread_1");
    }

    #[tokio::test]
    async fn test_close_deletes_only_ephemeral_agents() {
        let service = FakeService::start(&["completed"]).await;
        let client = client_for(&service);

        let primary = client
            .create_agent(&spec("WorkshopAssistant"), Retention::Retain)
            .await
            .unwrap();
        let writer = client
            .create_agent(&spec("WorkshopWriter"), Retention::Ephemeral)
            .await
            .unwrap();
        let reviewer = client
            .create_agent(&spec("WorkshopReviewer"), Retention::Ephemeral)
            .await
            .unwrap();
        assert_eq!(primary.id.as_str(), "asst_1");

        client.close().await.unwrap();

        let deletes: Vec<String> = service
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("DELETE"))
            .collect();
        assert_eq!(
            deletes,
            vec![
                format!("DELETE assistants/{}", writer.id),
                format!("DELETE assistants/{}", reviewer.id),
            ]
        );

        let created = service.body_of("POST assistants").unwrap();
        assert_eq!(created["model"], "gpt-4o");
        assert_eq!(created["instructions"], "Be brief.");

        // A second close has nothing left to delete.
        client.close().await.unwrap();
        assert_eq!(
            service.calls().iter().filter(|c| c.starts_with("DELETE")).count(),
            2
        );
    }

    #[tokio::test]
    async fn test_ephemeral_agents_survive_poisoned_registry() {
        let service = FakeService::start(&["completed"]).await;
        let client = client_for(&service);

        std::thread::scope(|s| {
            let _ = s
                .spawn(|| {
                    let _guard = client.ephemeral.lock().unwrap();
                    panic!("poison the registry");
                })
                .join();
        });
        assert!(client.ephemeral.is_poisoned());

        let writer = client
            .create_agent(&spec("WorkshopWriter"), Retention::Ephemeral)
            .await
            .unwrap();
        client.close().await.unwrap();

        assert_eq!(
            service.calls().last().unwrap(),
            &format!("DELETE assistants/{}", writer.id)
        );
    }
}
