//! Asking whether to keep going once the message budget runs out.

use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::Mutex;

/// What the negotiator is shown when the budget is exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRequest {
    pub messages_used: u32,
    pub message_budget: u32,
    pub increment: u32,
    pub last_a: String,
    pub last_b: String,
    /// Proposal still awaiting confirmation, if any.
    pub pending_conclusion: Option<String>,
}

/// Answer to an [`ExtensionRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionDecision {
    Decline,
    /// Grant another increment, optionally with context for both agents.
    Extend { context: Option<String> },
}

/// Decides whether an exhausted debate gets more budget.
///
/// The engine never prompts a terminal itself; a CLI front end implements
/// this by asking the user.
#[async_trait]
pub trait ExtensionNegotiator: Send + Sync {
    async fn negotiate(&self, request: &ExtensionRequest) -> ExtensionDecision;
}

/// Always declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclineExtension;

#[async_trait]
impl ExtensionNegotiator for DeclineExtension {
    async fn negotiate(&self, _request: &ExtensionRequest) -> ExtensionDecision {
        ExtensionDecision::Decline
    }
}

/// Replays a fixed list of decisions, then declines.
#[derive(Debug, Default)]
pub struct ScriptedExtension {
    decisions: Mutex<VecDeque<ExtensionDecision>>,
    requests: Mutex<Vec<ExtensionRequest>>,
}

impl ScriptedExtension {
    pub fn new(decisions: impl IntoIterator<Item = ExtensionDecision>) -> Self {
        Self {
            decisions: Mutex::new(decisions.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request seen so far.
    pub async fn requests(&self) -> Vec<ExtensionRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl ExtensionNegotiator for ScriptedExtension {
    async fn negotiate(&self, request: &ExtensionRequest) -> ExtensionDecision {
        self.requests.lock().await.push(request.clone());
        self.decisions
            .lock()
            .await
            .pop_front()
            .unwrap_or(ExtensionDecision::Decline)
    }
}
