#![allow(dead_code)]

use agent_debate::agent::process::{CommandRunner, CommandSpec, RawOutput};
use agent_debate::{AgentGateway, AgentProfile, BackendKind, GatewayError, RetryPolicy, Role};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Gateway that replays scripted replies per role and counts every attempt.
pub struct MockGateway {
    profile_a: AgentProfile,
    profile_b: AgentProfile,
    script_a: Mutex<VecDeque<Result<String, GatewayError>>>,
    script_b: Mutex<VecDeque<Result<String, GatewayError>>>,
    calls_a: Arc<AtomicU32>,
    calls_b: Arc<AtomicU32>,
    received_a: Mutex<Vec<String>>,
    received_b: Mutex<Vec<String>>,
    retry: RetryPolicy,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            profile_a: AgentProfile::new(Role::A, BackendKind::Claude),
            profile_b: AgentProfile::new(Role::B, BackendKind::Gemini),
            script_a: Mutex::new(VecDeque::new()),
            script_b: Mutex::new(VecDeque::new()),
            calls_a: Arc::new(AtomicU32::new(0)),
            calls_b: Arc::new(AtomicU32::new(0)),
            received_a: Mutex::new(Vec::new()),
            received_b: Mutex::new(Vec::new()),
            retry: RetryPolicy::new(3, Duration::ZERO),
        }
    }

    /// Queues successful replies for `role`.
    pub fn replies(self, role: Role, replies: &[&str]) -> Self {
        for reply in replies {
            self.push(role, Ok(reply.to_string()));
        }
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn push(&self, role: Role, result: Result<String, GatewayError>) {
        self.script(role).lock().unwrap().push_back(result);
    }

    /// Backend invocations made for `role`, retries included.
    pub fn calls(&self, role: Role) -> u32 {
        match role {
            Role::A => self.calls_a.load(Ordering::SeqCst),
            Role::B => self.calls_b.load(Ordering::SeqCst),
        }
    }

    /// Every message `role` was sent, in order.
    pub fn received(&self, role: Role) -> Vec<String> {
        match role {
            Role::A => self.received_a.lock().unwrap().clone(),
            Role::B => self.received_b.lock().unwrap().clone(),
        }
    }

    fn script(&self, role: Role) -> &Mutex<VecDeque<Result<String, GatewayError>>> {
        match role {
            Role::A => &self.script_a,
            Role::B => &self.script_b,
        }
    }
}

#[async_trait]
impl AgentGateway for MockGateway {
    fn profile(&self, role: Role) -> &AgentProfile {
        match role {
            Role::A => &self.profile_a,
            Role::B => &self.profile_b,
        }
    }

    fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    async fn call_once(&self, role: Role, message: &str) -> Result<String, GatewayError> {
        match role {
            Role::A => {
                self.calls_a.fetch_add(1, Ordering::SeqCst);
                self.received_a.lock().unwrap().push(message.to_string());
            }
            Role::B => {
                self.calls_b.fetch_add(1, Ordering::SeqCst);
                self.received_b.lock().unwrap().push(message.to_string());
            }
        }
        self.script(role)
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Transport(format!("{} script exhausted", role))))
    }
}

/// Command runner that replays canned process outputs and counts spawns.
pub struct ScriptedRunner {
    outputs: Mutex<VecDeque<RawOutput>>,
    specs: Mutex<Vec<CommandSpec>>,
    pub calls: Arc<AtomicU32>,
    delay: Option<Duration>,
}

impl ScriptedRunner {
    pub fn new(outputs: Vec<RawOutput>) -> Self {
        Self {
            outputs: Mutex::new(outputs.into()),
            specs: Mutex::new(Vec::new()),
            calls: Arc::new(AtomicU32::new(0)),
            delay: None,
        }
    }

    /// Every call sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn specs(&self) -> Vec<CommandSpec> {
        self.specs.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, spec: &CommandSpec) -> std::io::Result<RawOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.specs.lock().unwrap().push(spec.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.outputs.lock().unwrap().pop_front();
        next.ok_or_else(|| std::io::Error::other("no scripted output left"))
    }
}

pub fn claude_reply(text: &str, session: &str) -> RawOutput {
    RawOutput::ok(
        serde_json::json!({
            "type": "result",
            "subtype": "success",
            "is_error": false,
            "result": text,
            "session_id": session,
        })
        .to_string(),
    )
}

pub fn gemini_reply(text: &str) -> RawOutput {
    RawOutput::ok(serde_json::json!({ "response": text }).to_string())
}

pub fn codex_reply(text: &str, thread: &str) -> RawOutput {
    let events = [
        serde_json::json!({"type": "thread.started", "thread_id": thread}),
        serde_json::json!({"type": "turn.started"}),
        serde_json::json!({"type": "item.completed", "item": {"id": "item_0", "type": "agent_message", "text": text}}),
        serde_json::json!({"type": "turn.completed", "usage": {"input_tokens": 10, "output_tokens": 5}}),
    ];
    RawOutput::ok(
        events
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
