//! `agent-debate` - let two AI coding agents argue a problem out.
//!
//! Two agents, each backed by a CLI tool (`claude`, `gemini` or `codex`),
//! first answer the same problem independently and concurrently, then take
//! turns responding to each other. The debate ends when one agent proposes
//! a conclusion with an `AGREED:` line and the other confirms it, or when
//! the message budget is spent and no extension is granted.
//!
//! The pieces:
//!
//! - [`agent`]: the [`AgentGateway`] contract, the subprocess-backed
//!   [`CliGateway`], backend adapters, retry policy and session registry.
//! - [`debate`]: the [`Debate`] engine (round 0, turn scheduling,
//!   agreement protocol, extensions).
//! - [`transcript`]: the ordered record of every message and its JSON and
//!   Markdown export.
//! - [`config`]: [`DebateConfig`] with defaults and environment overrides.
//! - [`models`]: model identifiers per backend.
//! - [`observability`]: tracing setup.

pub mod agent;
pub mod config;
pub mod debate;
pub mod models;
pub mod observability;
pub mod prompt;
pub mod transcript;

pub use agent::{
    AgentGateway, AgentProfile, BackendKind, CliGateway, GatewayError, RetryPolicy, Role,
};
pub use config::{ConfigError, DebateConfig};
pub use debate::{
    Debate, DebateError, DebateOutcome, DebateReport, ExtensionDecision, ExtensionNegotiator,
};
pub use transcript::{Transcript, TranscriptExport, Turn, TurnKind};
