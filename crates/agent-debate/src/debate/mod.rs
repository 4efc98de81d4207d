//! The debate engine.
//!
//! A [`Debate`] runs round 0 (both agents answer the problem concurrently),
//! then alternates turns between the two agents, relaying each one's
//! latest message to the other, until one proposes a conclusion with
//! `AGREED:` and the other confirms it, or the message budget runs out.
//! On exhaustion an [`ExtensionNegotiator`] may grant more budget.
//!
//! # Example
//!
//! ```rust,ignore
//! use agent_debate::{AgentProfile, BackendKind, CliGateway, Debate, DebateConfig, Role};
//! use std::sync::Arc;
//!
//! let config = DebateConfig::from_env()?;
//! let gateway = CliGateway::new(
//!     AgentProfile::new(Role::A, BackendKind::Claude),
//!     AgentProfile::new(Role::B, BackendKind::Gemini),
//!     &config,
//! );
//! let mut debate = Debate::new("Is 2^61 - 1 prime?", Arc::new(gateway), config)?;
//! let report = debate.run().await?;
//! println!("{:?}", report.outcome);
//! ```

pub mod agreement;
pub mod extension;
pub mod prompts;
mod round_zero;
mod scheduler;
pub mod state;

pub use extension::{
    DeclineExtension, ExtensionDecision, ExtensionNegotiator, ExtensionRequest, ScriptedExtension,
};
pub use state::{AgreementProposal, DebatePhase, DebateState, ProposalOutcome};

use crate::agent::{AgentGateway, GatewayError, Role};
use crate::config::{ConfigError, DebateConfig};
use crate::prompt::PromptError;
use crate::transcript::{
    AgentMetadata, ExportError, NO_AGREEMENT, Transcript, TranscriptExport, Turn, TurnKind,
    current_timestamp_ms,
};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors that end a debate run.
#[derive(Debug, Error)]
pub enum DebateError {
    /// A backend call failed for good.
    #[error("{label} failed: {source}")]
    Agent {
        role: Role,
        label: String,
        #[source]
        source: GatewayError,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl DebateError {
    /// Role of the agent whose call failed, if the error came from a call.
    pub fn role(&self) -> Option<Role> {
        match self {
            DebateError::Agent { role, .. } => Some(*role),
            _ => None,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebateOutcome {
    Agreed { conclusion: String },
    /// Budget ran out and no extension was granted.
    Exhausted { last_a: String, last_b: String },
}

/// Outcome plus accounting for a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebateReport {
    pub outcome: DebateOutcome,
    pub messages_used: u32,
    pub message_budget: u32,
    pub extensions_granted: u32,
}

impl DebateReport {
    pub fn is_agreed(&self) -> bool {
        matches!(self.outcome, DebateOutcome::Agreed { .. })
    }

    pub fn conclusion(&self) -> Option<&str> {
        match &self.outcome {
            DebateOutcome::Agreed { conclusion } => Some(conclusion),
            DebateOutcome::Exhausted { .. } => None,
        }
    }
}

/// A two-agent debate over one problem.
pub struct Debate {
    problem: String,
    gateway: Arc<dyn AgentGateway>,
    config: DebateConfig,
    negotiator: Box<dyn ExtensionNegotiator>,
    state: DebateState,
    transcript: Transcript,
}

impl Debate {
    /// Creates a debate. Nothing is sent until [`Debate::run`].
    pub fn new(
        problem: impl Into<String>,
        gateway: Arc<dyn AgentGateway>,
        config: DebateConfig,
    ) -> Result<Self, DebateError> {
        let problem = problem.into();
        if problem.trim().is_empty() {
            return Err(ConfigError::Invalid("problem statement must not be empty".into()).into());
        }
        config.validate()?;

        Ok(Self {
            problem,
            gateway,
            state: DebateState::new(config.max_messages),
            config,
            negotiator: Box::new(DeclineExtension),
            transcript: Transcript::new(),
        })
    }

    /// Sets who decides on budget extensions. Defaults to [`DeclineExtension`].
    pub fn with_negotiator(mut self, negotiator: impl ExtensionNegotiator + 'static) -> Self {
        self.negotiator = Box::new(negotiator);
        self
    }

    pub fn problem(&self) -> &str {
        &self.problem
    }

    pub fn config(&self) -> &DebateConfig {
        &self.config
    }

    pub fn state(&self) -> &DebateState {
        &self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Runs the debate to agreement or to a declined extension.
    ///
    /// Round 0 is sent only once; calling `run` again after exhaustion
    /// resumes the turn loop where it stopped.
    pub async fn run(&mut self) -> Result<DebateReport, DebateError> {
        if self.state.phase == DebatePhase::NotStarted {
            self.run_round_zero().await?;
        }

        loop {
            if self.state.phase.is_agreed() {
                return Ok(self.report());
            }

            self.run_exchange().await?;

            if self.state.phase.is_agreed() {
                return Ok(self.report());
            }

            let request = ExtensionRequest {
                messages_used: self.state.message_count,
                message_budget: self.state.message_budget,
                increment: self.config.extension_increment,
                last_a: self.state.last_message(Role::A).to_string(),
                last_b: self.state.last_message(Role::B).to_string(),
                pending_conclusion: self
                    .state
                    .pending_proposal
                    .as_ref()
                    .map(|p| p.conclusion.clone()),
            };

            match self.negotiator.negotiate(&request).await {
                ExtensionDecision::Decline => {
                    info!(
                        target: "agent_debate::debate",
                        "Budget of {} messages exhausted without agreement",
                        self.state.message_budget
                    );
                    return Ok(self.report());
                }
                ExtensionDecision::Extend { context } => {
                    self.state.extend(self.config.extension_increment, context);
                    info!(
                        target: "agent_debate::debate",
                        "Budget extended to {} messages", self.state.message_budget
                    );
                }
            }
        }
    }

    /// Sends a free-form message to one agent in its existing session.
    ///
    /// The exchange is recorded as a chat turn and does not count against
    /// the message budget.
    pub async fn chat(&mut self, role: Role, message: &str) -> Result<String, DebateError> {
        let response = self
            .gateway
            .call(role, message)
            .await
            .map_err(|e| self.agent_error(role, e))?;
        self.transcript
            .record(Turn::new(role, TurnKind::Chat, message, response.clone()));
        Ok(response)
    }

    /// Snapshot of the debate for archiving.
    pub async fn export(&self) -> TranscriptExport {
        let mut sessions = self.gateway.session_tokens().await;
        let agents = [Role::A, Role::B]
            .into_iter()
            .map(|role| {
                AgentMetadata::from_profile(
                    self.gateway.profile(role),
                    sessions.remove(&role),
                    self.state.turn_count(role),
                )
            })
            .collect();

        let (agreed, conclusion) = match &self.state.phase {
            DebatePhase::Agreed { conclusion } => (true, conclusion.clone()),
            _ => (false, NO_AGREEMENT.to_string()),
        };

        TranscriptExport {
            problem: self.problem.clone(),
            agents,
            turns: self.transcript.turns().to_vec(),
            agreed,
            conclusion,
            messages_used: self.state.message_count,
            message_budget: self.state.message_budget,
            exported_at_ms: current_timestamp_ms(),
        }
    }

    /// Writes the export as JSON to `path`.
    pub async fn export_to(&self, path: impl AsRef<Path>) -> Result<(), DebateError> {
        self.export().await.write_json(path).await?;
        Ok(())
    }

    fn report(&self) -> DebateReport {
        let outcome = match &self.state.phase {
            DebatePhase::Agreed { conclusion } => DebateOutcome::Agreed {
                conclusion: conclusion.clone(),
            },
            _ => DebateOutcome::Exhausted {
                last_a: self.state.last_message(Role::A).to_string(),
                last_b: self.state.last_message(Role::B).to_string(),
            },
        };
        DebateReport {
            outcome,
            messages_used: self.state.message_count,
            message_budget: self.state.message_budget,
            extensions_granted: self.state.extensions_granted,
        }
    }

    fn agent_error(&self, role: Role, source: GatewayError) -> DebateError {
        DebateError::Agent {
            role,
            label: self.gateway.profile(role).label.clone(),
            source,
        }
    }

    /// Records one counted message from `role`.
    fn record_turn(&mut self, role: Role, kind: TurnKind, prompt: String, response: String) {
        self.state.record_message(role, response.clone());
        self.transcript.record(Turn::new(role, kind, prompt, response));
    }
}
