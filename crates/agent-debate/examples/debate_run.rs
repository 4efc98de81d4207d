//! Runs a debate between two installed CLI agents.
//!
//! ```bash
//! cargo run --example debate_run -- "Is 2^61 - 1 prime?" claude gemini
//! ```
//!
//! Backends default to the first two detected on `PATH`. Settings come from
//! `DEBATE_*` environment variables. When the budget runs out you are asked
//! on stdin whether to extend it.

use agent_debate::debate::{DeclineExtension, ExtensionRequest};
use agent_debate::observability::{self, ObservabilityConfig};
use agent_debate::{
    AgentProfile, BackendKind, CliGateway, Debate, DebateConfig, DebateOutcome,
    ExtensionDecision, ExtensionNegotiator, Role,
};
use anyhow::Context;
use async_trait::async_trait;
use std::io::{BufRead, Write};
use std::sync::Arc;

/// Asks on the terminal whether to extend.
struct StdinExtension;

#[async_trait]
impl ExtensionNegotiator for StdinExtension {
    async fn negotiate(&self, request: &ExtensionRequest) -> ExtensionDecision {
        println!(
            "\nNo agreement after {}/{} messages.",
            request.messages_used, request.message_budget
        );
        if let Some(conclusion) = &request.pending_conclusion {
            println!("Pending proposal: {}", conclusion);
        }
        let increment = request.increment;

        let answer = tokio::task::spawn_blocking(move || {
            print!(
                "Extend by {} messages? Optional context after a colon (y[: context]/n): ",
                increment
            );
            let _ = std::io::stdout().flush();
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).map(|_| line)
        })
        .await;

        let line = match answer {
            Ok(Ok(line)) => line,
            _ => return ExtensionDecision::Decline,
        };
        let line = line.trim();
        if !line.to_lowercase().starts_with('y') {
            return ExtensionDecision::Decline;
        }
        let context = line
            .split_once(':')
            .map(|(_, c)| c.trim().to_string())
            .filter(|c| !c.is_empty());
        ExtensionDecision::Extend { context }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init(ObservabilityConfig::default())
        .map_err(|e| anyhow::anyhow!("failed to initialise tracing: {e}"))?;

    let mut args = std::env::args().skip(1);
    let problem = args
        .next()
        .context("usage: debate_run <problem> [backend_a] [backend_b]")?;

    let available = BackendKind::detect_available();
    let pick = |arg: Option<String>, fallback: usize| -> anyhow::Result<BackendKind> {
        match arg {
            Some(name) => name.parse::<BackendKind>().map_err(anyhow::Error::msg),
            None => available
                .get(fallback)
                .or_else(|| available.first())
                .copied()
                .context("no supported CLI (claude, gemini, codex) found on PATH"),
        }
    };
    let kind_a = pick(args.next(), 0)?;
    let kind_b = pick(args.next(), 1)?;

    let config = DebateConfig::from_env()?;
    let mut profile_a = AgentProfile::new(Role::A, kind_a);
    let mut profile_b = AgentProfile::new(Role::B, kind_b);
    if let Ok(model) = std::env::var("DEBATE_MODEL_A") {
        profile_a = profile_a.with_model_str(&model)?;
    }
    if let Ok(model) = std::env::var("DEBATE_MODEL_B") {
        profile_b = profile_b.with_model_str(&model)?;
    }

    println!("{} vs {}", profile_a.label, profile_b.label);

    let gateway = CliGateway::new(profile_a, profile_b, &config);
    let unattended = std::env::var("DEBATE_UNATTENDED").is_ok();
    let mut debate = Debate::new(problem, Arc::new(gateway), config)?;
    debate = if unattended {
        debate.with_negotiator(DeclineExtension)
    } else {
        debate.with_negotiator(StdinExtension)
    };

    let report = debate.run().await?;

    match &report.outcome {
        DebateOutcome::Agreed { conclusion } => {
            println!("\nAgreed after {} messages: {}", report.messages_used, conclusion);
        }
        DebateOutcome::Exhausted { last_a, last_b } => {
            println!("\nNo agreement after {} messages.", report.messages_used);
            println!("\n--- Agent A ---\n{}", last_a);
            println!("\n--- Agent B ---\n{}", last_b);
        }
    }

    if let Ok(path) = std::env::var("DEBATE_TRANSCRIPT") {
        debate.export_to(&path).await?;
        println!("Transcript written to {}", path);
    }

    Ok(())
}
