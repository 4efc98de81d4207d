//! The subprocess-backed [`AgentGateway`].

use super::impls::{BackendAdapter, CliAgentConfig, adapter_for};
use super::process::{CommandRunner, ProcessRunner};
use super::{AgentGateway, AgentProfile, GatewayError, RetryPolicy, Role, SessionRegistry};
use crate::config::DebateConfig;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

struct AgentSlot {
    profile: AgentProfile,
    adapter: Box<dyn BackendAdapter>,
}

/// Reaches both debaters by spawning their CLI tools.
///
/// Every call is bounded by `timeout`; the subprocess is killed when the
/// bound elapses. Session tokens are captured on each agent's first
/// successful call and passed back on every later one.
pub struct CliGateway {
    agent_a: AgentSlot,
    agent_b: AgentSlot,
    runner: Arc<dyn CommandRunner>,
    sessions: SessionRegistry,
    retry: RetryPolicy,
    timeout: Duration,
}

impl CliGateway {
    /// Builds a gateway for two profiles, using default CLI settings and
    /// the timeout and retry policy from `config`.
    pub fn new(profile_a: AgentProfile, profile_b: AgentProfile, config: &DebateConfig) -> Self {
        let adapter_a = adapter_for(&profile_a, CliAgentConfig::new());
        let adapter_b = adapter_for(&profile_b, CliAgentConfig::new());
        Self {
            agent_a: AgentSlot {
                profile: AgentProfile { role: Role::A, ..profile_a },
                adapter: adapter_a,
            },
            agent_b: AgentSlot {
                profile: AgentProfile { role: Role::B, ..profile_b },
                adapter: adapter_b,
            },
            runner: Arc::new(ProcessRunner),
            sessions: SessionRegistry::new(),
            retry: config.retry_policy(),
            timeout: config.timeout(),
        }
    }

    /// Replaces the subprocess runner.
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Applies CLI settings (path, working dir, env, extra args) to one role.
    pub fn with_cli_config(mut self, role: Role, config: CliAgentConfig) -> Self {
        let adapter = adapter_for(&self.slot(role).profile, config);
        self.slot_mut(role).adapter = adapter;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn slot(&self, role: Role) -> &AgentSlot {
        match role {
            Role::A => &self.agent_a,
            Role::B => &self.agent_b,
        }
    }

    fn slot_mut(&mut self, role: Role) -> &mut AgentSlot {
        match role {
            Role::A => &mut self.agent_a,
            Role::B => &mut self.agent_b,
        }
    }
}

#[async_trait]
impl AgentGateway for CliGateway {
    fn profile(&self, role: Role) -> &AgentProfile {
        &self.slot(role).profile
    }

    fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    #[instrument(skip(self, message), fields(
        agent = %self.slot(role).profile.label,
        prompt_length = message.len()
    ))]
    async fn call_once(&self, role: Role, message: &str) -> Result<String, GatewayError> {
        let slot = self.slot(role);
        let session = self.sessions.get(role).await;
        let spec = slot.adapter.encode_request(message, session.as_deref());

        debug!(
            target: "agent_debate::agent::gateway",
            "Spawning: {}", spec.display()
        );

        let raw = match tokio::time::timeout(self.timeout, self.runner.run(&spec)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                error!(
                    target: "agent_debate::agent::gateway",
                    "Failed to spawn {}: {}", spec.program, e
                );
                return Err(GatewayError::Transport(format!(
                    "failed to spawn {}: {}",
                    spec.program, e
                )));
            }
            Err(_) => {
                error!(
                    target: "agent_debate::agent::gateway",
                    "{} did not answer within {:?}", slot.profile.label, self.timeout
                );
                return Err(GatewayError::Timeout(self.timeout));
            }
        };

        let decoded = slot.adapter.decode_response(&raw)?;

        if session.is_none() {
            if let Some(token) = decoded.session_token {
                if self.sessions.set_if_absent(role, token.clone()).await {
                    info!(
                        target: "agent_debate::agent::gateway",
                        "{} session established: {}", slot.profile.label, token
                    );
                }
            }
        }

        debug!(
            target: "agent_debate::agent::gateway",
            "{} replied with {} bytes", slot.profile.label, decoded.text.len()
        );

        Ok(decoded.text)
    }

    async fn session_token(&self, role: Role) -> Option<String> {
        self.sessions.get(role).await
    }

    async fn session_tokens(&self) -> HashMap<Role, String> {
        self.sessions.snapshot().await
    }
}
