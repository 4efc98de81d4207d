use super::agreement::extract_conclusion;
use super::prompts::{ConfirmationPrompt, TurnPrompt, with_extension_context};
use super::state::{AgreementProposal, DebatePhase, ProposalOutcome};
use super::{Debate, DebateError};
use crate::agent::Role;
use crate::transcript::TurnKind;
use tracing::{debug, info};

impl Debate {
    /// Alternates turns until a proposal is confirmed or the budget is spent.
    ///
    /// A pending proposal is always resolved before the next regular turn.
    /// Leaves the phase at `Agreed` or `Exhausted`.
    pub(super) async fn run_exchange(&mut self) -> Result<(), DebateError> {
        loop {
            if !self.state.has_budget() {
                debug!(
                    target: "agent_debate::debate",
                    "No budget left ({}/{})", self.state.message_count, self.state.message_budget
                );
                self.state.phase = DebatePhase::Exhausted;
                return Ok(());
            }

            if let Some(proposal) = self.state.pending_proposal.clone() {
                self.confirm(proposal).await?;
                if self.state.phase.is_agreed() {
                    return Ok(());
                }
                continue;
            }

            self.take_turn().await?;
        }
    }

    async fn take_turn(&mut self) -> Result<(), DebateError> {
        let role = self.state.next_role;
        self.state.phase = DebatePhase::Turn { role };

        let body = TurnPrompt {
            counterpart_message: self.state.last_message(role.counterpart()),
            // Counts the reply this turn is about to produce.
            remaining: self.state.remaining(),
        }
        .render()?;
        let outgoing = self.outgoing(role, body)?;

        debug!(
            target: "agent_debate::debate",
            "Turn {}: {}", self.state.message_count + 1, role
        );

        let response = self
            .gateway
            .call(role, &outgoing)
            .await
            .map_err(|e| self.agent_error(role, e))?;

        self.record_turn(role, TurnKind::Exchange, outgoing, response.clone());
        self.state.next_role = role.counterpart();

        if let Some(conclusion) = extract_conclusion(&response) {
            self.propose(role, conclusion, response);
        }

        Ok(())
    }

    async fn confirm(&mut self, mut proposal: AgreementProposal) -> Result<(), DebateError> {
        let confirmer = proposal.confirmer();
        self.state.phase = DebatePhase::Confirming { confirmer };

        let body = ConfirmationPrompt {
            conclusion: &proposal.conclusion,
            proposer_message: &proposal.message,
            critical: self.config.strict_confirmation,
        }
        .render()?;
        let outgoing = self.outgoing(confirmer, body)?;

        let response = self
            .gateway
            .call(confirmer, &outgoing)
            .await
            .map_err(|e| self.agent_error(confirmer, e))?;

        self.record_turn(confirmer, TurnKind::Confirmation, outgoing, response.clone());
        self.state.pending_proposal = None;

        match extract_conclusion(&response) {
            Some(conclusion) => {
                proposal.outcome = ProposalOutcome::Confirmed;
                // A bare marker confirms the proposal as worded.
                let conclusion = if conclusion.is_empty() {
                    proposal.conclusion.clone()
                } else {
                    conclusion
                };
                info!(
                    target: "agent_debate::debate",
                    "{} confirmed agreement: {}", confirmer, conclusion
                );
                self.state.phase = DebatePhase::Agreed { conclusion };
            }
            None => {
                proposal.outcome = ProposalOutcome::Rejected;
                info!(
                    target: "agent_debate::debate",
                    "{} rejected the proposal from {}", confirmer, proposal.proposer
                );
                self.state.next_role = proposal.proposer;
                self.state.phase = DebatePhase::Turn {
                    role: proposal.proposer,
                };
            }
        }

        debug!(
            target: "agent_debate::debate",
            "Proposal resolved: {:?}", proposal.outcome
        );
        Ok(())
    }

    /// Prepends extension context if `role` has not received it yet.
    fn outgoing(&mut self, role: Role, body: String) -> Result<String, DebateError> {
        match self.state.take_extension_context(role) {
            Some(context) => Ok(with_extension_context(&context, &body)?),
            None => Ok(body),
        }
    }
}
