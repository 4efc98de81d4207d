use super::agreement::extract_conclusion;
use super::prompts::OpeningPrompt;
use super::state::{AgreementProposal, DebatePhase};
use super::{Debate, DebateError};
use crate::agent::{GatewayError, Role};
use crate::transcript::TurnKind;
use tracing::{debug, info};

impl Debate {
    /// Sends the opening prompt to both agents at once and records both
    /// replies, A first.
    ///
    /// Each side retries its own rate limits inside the concurrent region;
    /// one side failing never cancels the other.
    pub(super) async fn run_round_zero(&mut self) -> Result<(), DebateError> {
        let opening = OpeningPrompt {
            problem: &self.problem,
            instruction: self.config.opening_instruction.as_deref(),
        }
        .render()?;

        info!(
            target: "agent_debate::debate",
            "Round 0: sending opening prompt to both agents"
        );

        let gateway = self.gateway.as_ref();
        let policy = *gateway.retry_policy();
        let opening_ref = opening.as_str();

        let open = move |role: Role| async move {
            let label = gateway.profile(role).label.as_str();
            policy
                .run(label, move |attempt| {
                    debug!(
                        target: "agent_debate::debate",
                        "Round 0: {} attempt {}", label, attempt
                    );
                    gateway.call_once(role, opening_ref)
                })
                .await
        };

        let (result_a, result_b) = tokio::join!(open(Role::A), open(Role::B));

        let text_a = self.opening_reply(Role::A, result_a)?;
        let text_b = self.opening_reply(Role::B, result_b)?;

        self.record_turn(Role::A, TurnKind::Opening, opening.clone(), text_a.clone());
        self.record_turn(Role::B, TurnKind::Opening, opening, text_b.clone());
        self.state.next_role = Role::A;

        match (extract_conclusion(&text_a), extract_conclusion(&text_b)) {
            (Some(from_a), Some(from_b)) => {
                let conclusion = if from_a.is_empty() { from_b } else { from_a };
                info!(
                    target: "agent_debate::debate",
                    "Both agents agreed in round 0: {}", conclusion
                );
                self.state.phase = DebatePhase::Agreed { conclusion };
            }
            (Some(conclusion), None) => {
                self.propose(Role::A, conclusion, text_a);
                self.state.phase = DebatePhase::RoundZeroDone;
            }
            (None, Some(conclusion)) => {
                self.propose(Role::B, conclusion, text_b);
                self.state.phase = DebatePhase::RoundZeroDone;
            }
            (None, None) => {
                self.state.phase = DebatePhase::RoundZeroDone;
            }
        }

        Ok(())
    }

    fn opening_reply(
        &self,
        role: Role,
        result: Result<String, GatewayError>,
    ) -> Result<String, DebateError> {
        match result {
            Ok(text) if text.trim().is_empty() => {
                Err(self.agent_error(role, GatewayError::EmptyResponse))
            }
            Ok(text) => Ok(text),
            Err(e) => Err(self.agent_error(role, e)),
        }
    }

    pub(super) fn propose(&mut self, proposer: Role, conclusion: String, message: String) {
        info!(
            target: "agent_debate::debate",
            "{} proposed agreement: {}", proposer, conclusion
        );
        self.state.pending_proposal = Some(AgreementProposal::new(proposer, conclusion, message));
    }
}
