//! Agent layer: who the two debaters are and how they are reached.
//!
//! The debate engine never talks to a CLI directly. It goes through the
//! [`AgentGateway`] trait, which exposes a single-attempt call
//! ([`AgentGateway::call_once`]) and a call with the gateway's own
//! rate-limit retry applied ([`AgentGateway::call`]). The production
//! implementation is [`gateway::CliGateway`], which drives one
//! [`impls::BackendAdapter`] per role through a [`process::CommandRunner`].

pub mod error;
pub mod gateway;
pub mod impls;
pub mod process;
pub mod retry;
pub mod session;

pub use error::GatewayError;
pub use gateway::CliGateway;
pub use retry::RetryPolicy;
pub use session::SessionRegistry;

use crate::models::{ClaudeModel, GeminiModel, Model, ModelError, OpenAIModel};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One side of the debate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    A,
    B,
}

impl Role {
    /// Returns the other side.
    pub fn counterpart(self) -> Self {
        match self {
            Role::A => Role::B,
            Role::B => Role::A,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::A => "A",
            Role::B => "B",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Agent {}", self.as_str())
    }
}

/// The CLI tool backing an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Claude,
    Gemini,
    Codex,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [BackendKind::Claude, BackendKind::Gemini, BackendKind::Codex];

    /// Name of the executable looked up in `PATH`.
    pub fn command_name(self) -> &'static str {
        match self {
            BackendKind::Claude => "claude",
            BackendKind::Gemini => "gemini",
            BackendKind::Codex => "codex",
        }
    }

    /// Parses a model string against this backend's model table.
    pub fn parse_model(self, model: &str) -> Result<Model, ModelError> {
        Ok(match self {
            BackendKind::Claude => Model::Claude(model.parse::<ClaudeModel>()?),
            BackendKind::Gemini => Model::Gemini(model.parse::<GeminiModel>()?),
            BackendKind::Codex => Model::OpenAI(model.parse::<OpenAIModel>()?),
        })
    }

    /// Checks whether this backend's CLI is installed.
    ///
    /// Uses `which` on Unix/macOS or `where` on Windows.
    pub fn is_available(self) -> bool {
        #[cfg(unix)]
        let check_cmd = "which";
        #[cfg(windows)]
        let check_cmd = "where";

        std::process::Command::new(check_cmd)
            .arg(self.command_name())
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Returns every backend whose CLI is installed, in a stable order.
    pub fn detect_available() -> Vec<BackendKind> {
        Self::ALL
            .into_iter()
            .filter(|kind| kind.is_available())
            .collect()
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command_name())
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "claude" | "claude-code" => Ok(BackendKind::Claude),
            "gemini" => Ok(BackendKind::Gemini),
            "codex" | "openai" => Ok(BackendKind::Codex),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

/// Static identity of one debater.
///
/// The session token is not stored here; it lives in the
/// [`SessionRegistry`] owned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentProfile {
    pub role: Role,
    pub kind: BackendKind,
    pub model: Option<Model>,
    pub label: String,
}

impl AgentProfile {
    pub fn new(role: Role, kind: BackendKind) -> Self {
        Self {
            role,
            kind,
            model: None,
            label: format!("{} ({})", role, kind),
        }
    }

    /// Selects a model, validating it against the backend's model table.
    pub fn with_model_str(mut self, model: &str) -> Result<Self, ModelError> {
        self.model = Some(self.kind.parse_model(model)?);
        Ok(self)
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Model identifier as handed to the CLI, if one was selected.
    pub fn model_name(&self) -> Option<&str> {
        self.model.as_ref().map(|m| m.as_cli_name())
    }
}

/// Uniform request/response contract to the two debaters.
///
/// `call_once` performs exactly one backend invocation. `call` wraps it in
/// the gateway's rate-limit retry policy; callers that need their own retry
/// loop (the round-0 dispatcher) drive `call_once` through
/// [`RetryPolicy::run`] themselves.
#[async_trait]
pub trait AgentGateway: Send + Sync {
    /// Identity of the agent playing `role`.
    fn profile(&self, role: Role) -> &AgentProfile;

    /// Retry policy applied to rate-limited calls.
    fn retry_policy(&self) -> &RetryPolicy;

    /// One backend invocation, no retry.
    async fn call_once(&self, role: Role, message: &str) -> Result<String, GatewayError>;

    /// One logical call with rate-limit retry applied.
    async fn call(&self, role: Role, message: &str) -> Result<String, GatewayError> {
        let policy = *self.retry_policy();
        let label = self.profile(role).label.clone();
        policy
            .run(&label, move |_attempt| self.call_once(role, message))
            .await
    }

    /// Current continuation token for `role`, if the backend issued one.
    async fn session_token(&self, _role: Role) -> Option<String> {
        None
    }

    /// Tokens for every agent that has a session.
    async fn session_tokens(&self) -> HashMap<Role, String> {
        let mut tokens = HashMap::new();
        for role in [Role::A, Role::B] {
            if let Some(token) = self.session_token(role).await {
                tokens.insert(role, token);
            }
        }
        tokens
    }
}
