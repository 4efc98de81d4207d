//! Mutable state of a running debate.

use crate::agent::Role;
use serde::{Deserialize, Serialize};

/// Where the debate currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum DebatePhase {
    /// Nothing sent yet.
    NotStarted,
    /// Both openings are in.
    RoundZeroDone,
    /// Waiting on the given agent.
    Turn { role: Role },
    /// A proposal is out for confirmation.
    Confirming { confirmer: Role },
    /// Budget used up with no confirmed agreement.
    Exhausted,
    /// Terminal.
    Agreed { conclusion: String },
}

impl DebatePhase {
    pub fn is_agreed(&self) -> bool {
        matches!(self, DebatePhase::Agreed { .. })
    }
}

/// Resolution of an agreement proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalOutcome {
    Pending,
    Confirmed,
    Rejected,
}

/// A conclusion one agent put forward and the other has not yet answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementProposal {
    pub proposer: Role,
    pub conclusion: String,
    /// The proposer's full message, shown to the confirmer.
    pub message: String,
    pub outcome: ProposalOutcome,
}

impl AgreementProposal {
    pub fn new(proposer: Role, conclusion: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            proposer,
            conclusion: conclusion.into(),
            message: message.into(),
            outcome: ProposalOutcome::Pending,
        }
    }

    pub fn confirmer(&self) -> Role {
        self.proposer.counterpart()
    }
}

/// User context attached to an extension, delivered once to each agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionContext {
    pub text: String,
    pending_a: bool,
    pending_b: bool,
}

impl ExtensionContext {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pending_a: true,
            pending_b: true,
        }
    }

    /// Hands out the context if `role` has not received it yet.
    pub fn take_for(&mut self, role: Role) -> Option<&str> {
        let pending = match role {
            Role::A => &mut self.pending_a,
            Role::B => &mut self.pending_b,
        };
        if !*pending {
            return None;
        }
        *pending = false;
        Some(&self.text)
    }

    pub fn is_delivered(&self) -> bool {
        !self.pending_a && !self.pending_b
    }
}

/// Counters, proposals and turn order for one debate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateState {
    pub message_count: u32,
    pub message_budget: u32,
    pub phase: DebatePhase,
    pub next_role: Role,
    pub pending_proposal: Option<AgreementProposal>,
    pub extension_context: Option<ExtensionContext>,
    pub extensions_granted: u32,
    last_a: String,
    last_b: String,
    turns_a: u32,
    turns_b: u32,
}

impl DebateState {
    pub fn new(message_budget: u32) -> Self {
        Self {
            message_count: 0,
            message_budget,
            phase: DebatePhase::NotStarted,
            next_role: Role::A,
            pending_proposal: None,
            extension_context: None,
            extensions_granted: 0,
            last_a: String::new(),
            last_b: String::new(),
            turns_a: 0,
            turns_b: 0,
        }
    }

    pub fn has_budget(&self) -> bool {
        self.message_count < self.message_budget
    }

    pub fn remaining(&self) -> u32 {
        self.message_budget.saturating_sub(self.message_count)
    }

    /// Counts one message from `role` and remembers it as that agent's
    /// latest position.
    pub fn record_message(&mut self, role: Role, text: impl Into<String>) {
        self.message_count += 1;
        match role {
            Role::A => {
                self.last_a = text.into();
                self.turns_a += 1;
            }
            Role::B => {
                self.last_b = text.into();
                self.turns_b += 1;
            }
        }
    }

    pub fn last_message(&self, role: Role) -> &str {
        match role {
            Role::A => &self.last_a,
            Role::B => &self.last_b,
        }
    }

    pub fn turn_count(&self, role: Role) -> u32 {
        match role {
            Role::A => self.turns_a,
            Role::B => self.turns_b,
        }
    }

    /// Grows the budget and, when given, queues context for both agents.
    ///
    /// A proposal still pending stays pending and is resolved first.
    pub fn extend(&mut self, increment: u32, context: Option<String>) {
        self.message_budget = self.message_budget.saturating_add(increment);
        self.extensions_granted += 1;
        self.extension_context = context
            .filter(|c| !c.trim().is_empty())
            .map(ExtensionContext::new);
        self.phase = match &self.pending_proposal {
            Some(proposal) => DebatePhase::Confirming {
                confirmer: proposal.confirmer(),
            },
            None => DebatePhase::Turn {
                role: self.next_role,
            },
        };
    }

    /// Context still owed to `role`, consumed on read.
    pub fn take_extension_context(&mut self, role: Role) -> Option<String> {
        let context = self.extension_context.as_mut()?;
        let text = context.take_for(role).map(str::to_string);
        if context.is_delivered() {
            self.extension_context = None;
        }
        text
    }
}
