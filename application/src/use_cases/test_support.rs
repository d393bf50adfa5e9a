//! Test doubles for the credential and agent runtime ports.

use crate::config::RelaySettings;
use crate::ports::agent_runtime::{AgentClient, AgentRuntime, RuntimeError, TurnOutcome};
use crate::ports::credential::{AccessToken, CredentialError, CredentialProvider};
use async_trait::async_trait;
use relay_domain::{
    AgentHandle, AgentId, AgentSpec, ChatMessage, Retention, StageOutput, ThreadState,
    ToolDescriptor,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub(crate) fn configured_settings() -> RelaySettings {
    RelaySettings::default()
        .with_project_endpoint("https://workshop.services.ai.azure.com/api/projects/demo")
        .with_model_deployment("gpt-4o")
}

pub(crate) struct TurnCall {
    pub agent_id: String,
    pub thread_id: String,
    pub message: String,
    pub tool: Option<ToolDescriptor>,
}

pub(crate) struct StageCall {
    pub agent_id: String,
    pub agent_name: String,
    pub conversation: Vec<ChatMessage>,
}

/// Shared record of everything the mocks were asked to do.
#[derive(Default)]
pub(crate) struct MockState {
    acquires: AtomicUsize,
    connects: AtomicUsize,
    closes: AtomicUsize,
    next_id: AtomicUsize,
    blank_agent_ids: AtomicBool,
    fail_turns: AtomicBool,
    fail_stage: Mutex<Option<usize>>,
    stage_outputs: Mutex<VecDeque<StageOutput>>,
    threads: Mutex<HashMap<String, Vec<String>>>,
    pub created: Mutex<Vec<(AgentSpec, Retention)>>,
    pub turns: Mutex<Vec<TurnCall>>,
    pub stages: Mutex<Vec<StageCall>>,
}

impl MockState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_blank_agent_ids(self: Arc<Self>) -> Arc<Self> {
        self.blank_agent_ids.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_failing_turns(self: Arc<Self>) -> Arc<Self> {
        self.fail_turns.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_failing_stage(self: Arc<Self>, position: usize) -> Arc<Self> {
        *self.fail_stage.lock().unwrap() = Some(position);
        self
    }

    pub fn with_stage_outputs(self: Arc<Self>, outputs: Vec<StageOutput>) -> Arc<Self> {
        *self.stage_outputs.lock().unwrap() = outputs.into();
        self
    }

    pub fn runtime(self: &Arc<Self>) -> Arc<dyn AgentRuntime> {
        Arc::new(MockRuntime {
            state: Arc::clone(self),
        })
    }

    pub fn client(self: &Arc<Self>) -> MockClient {
        MockClient {
            state: Arc::clone(self),
        }
    }

    pub fn acquire_count(&self) -> usize {
        self.acquires.load(Ordering::SeqCst)
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Messages stored in a service thread so far.
    pub fn history(&self, thread_id: &str) -> Vec<String> {
        self.threads
            .lock()
            .unwrap()
            .get(thread_id)
            .cloned()
            .unwrap_or_default()
    }

    fn next(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        format!("{}_{}", prefix, n)
    }
}

pub(crate) struct MockCredentials {
    state: Arc<MockState>,
    fail: bool,
}

impl MockCredentials {
    pub fn new(state: Arc<MockState>) -> Self {
        Self { state, fail: false }
    }

    pub fn failing(state: Arc<MockState>) -> Self {
        Self { state, fail: true }
    }
}

#[async_trait]
impl CredentialProvider for MockCredentials {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn acquire(&self, _scope: &str) -> Result<AccessToken, CredentialError> {
        self.state.acquires.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CredentialError::Unavailable("not signed in".to_string()));
        }
        Ok(AccessToken::new("token", None))
    }
}

struct MockRuntime {
    state: Arc<MockState>,
}

#[async_trait]
impl AgentRuntime for MockRuntime {
    async fn connect(
        &self,
        _endpoint: &str,
        _token: &AccessToken,
    ) -> Result<Box<dyn AgentClient>, RuntimeError> {
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.state.client()))
    }
}

pub(crate) struct MockClient {
    state: Arc<MockState>,
}

#[async_trait]
impl AgentClient for MockClient {
    async fn create_agent(
        &self,
        spec: &AgentSpec,
        retention: Retention,
    ) -> Result<AgentHandle, RuntimeError> {
        self.state
            .created
            .lock()
            .unwrap()
            .push((spec.clone(), retention));
        let id = if self.state.blank_agent_ids.load(Ordering::SeqCst) {
            String::new()
        } else {
            self.state.next("asst")
        };
        Ok(AgentHandle::created(AgentId::new(id), &spec.name, retention))
    }

    async fn run_turn(
        &self,
        agent: &AgentHandle,
        thread: ThreadState,
        message: &str,
        tool: Option<&ToolDescriptor>,
    ) -> Result<TurnOutcome, RuntimeError> {
        if self.state.fail_turns.load(Ordering::SeqCst) {
            return Err(RuntimeError::RunFailed {
                run_id: "run_0".to_string(),
                status: "failed".to_string(),
                message: "model overloaded".to_string(),
            });
        }

        let thread_id = match thread.service_thread_id() {
            Some(id) => id.to_string(),
            None => self.state.next("thread"),
        };
        let reply = format!("echo: {}", message);
        {
            let mut threads = self.state.threads.lock().unwrap();
            let history = threads.entry(thread_id.clone()).or_default();
            history.push(format!("user: {}", message));
            history.push(format!("assistant: {}", reply));
        }
        self.state.turns.lock().unwrap().push(TurnCall {
            agent_id: agent.id.to_string(),
            thread_id: thread_id.clone(),
            message: message.to_string(),
            tool: tool.cloned(),
        });

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
        let position = {
            let mut stages = self.state.stages.lock().unwrap();
            stages.push(StageCall {
                agent_id: agent.id.to_string(),
                agent_name: agent.name.clone(),
                conversation: conversation.to_vec(),
            });
            stages.len() - 1
        };

        if *self.state.fail_stage.lock().unwrap() == Some(position) {
            return Err(RuntimeError::Status {
                status: 500,
                message: "stage failed".to_string(),
            });
        }

        let scripted = self.state.stage_outputs.lock().unwrap().pop_front();
        Ok(scripted.unwrap_or_else(|| {
            StageOutput::PlainText(format!("{} saw {} messages", agent.name, conversation.len()))
        }))
    }

    async fn close(&self) -> Result<(), RuntimeError> {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
