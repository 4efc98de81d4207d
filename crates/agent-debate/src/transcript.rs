//! Turn-by-turn record of a debate and its JSON/Markdown export.

use crate::agent::{AgentProfile, BackendKind, Role};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Conclusion text recorded when the debate ended without agreement.
pub const NO_AGREEMENT: &str = "no agreement reached";

/// Failure writing a transcript to disk.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize transcript: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write transcript: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a message was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    /// Round 0, sent to both agents at once.
    Opening,
    /// Regular exchange relaying the counterpart's message.
    Exchange,
    /// Accept-or-reject challenge for a proposed conclusion.
    Confirmation,
    /// Direct message from the user outside the turn loop.
    Chat,
}

/// One message sent and the reply received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub kind: TurnKind,
    pub prompt: String,
    pub response: String,
    pub recorded_at_ms: u64,
}

impl Turn {
    pub fn new(
        role: Role,
        kind: TurnKind,
        prompt: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Self::with_timestamp(role, kind, prompt, response, current_timestamp_ms())
    }

    /// Same as `new` but with explicit timestamp control (useful for deterministic tests).
    pub fn with_timestamp(
        role: Role,
        kind: TurnKind,
        prompt: impl Into<String>,
        response: impl Into<String>,
        recorded_at_ms: u64,
    ) -> Self {
        Self {
            role,
            kind,
            prompt: prompt.into(),
            response: response.into(),
            recorded_at_ms,
        }
    }
}

/// Append-only record of every message in a debate, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Turns that count against the message budget (everything but chat).
    pub fn counted_len(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| t.kind != TurnKind::Chat)
            .count()
    }

    pub fn last_response(&self, role: Role) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == role)
            .map(|t| t.response.as_str())
    }
}

/// Who played a role, as written to the export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMetadata {
    pub role: Role,
    pub label: String,
    pub backend: BackendKind,
    pub model: Option<String>,
    pub session_token: Option<String>,
    pub turns: u32,
}

impl AgentMetadata {
    pub fn from_profile(profile: &AgentProfile, session_token: Option<String>, turns: u32) -> Self {
        Self {
            role: profile.role,
            label: profile.label.clone(),
            backend: profile.kind,
            model: profile.model_name().map(str::to_string),
            session_token,
            turns,
        }
    }
}

/// Self-contained snapshot of a debate for archiving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptExport {
    pub problem: String,
    pub agents: Vec<AgentMetadata>,
    pub turns: Vec<Turn>,
    pub agreed: bool,
    /// The agreed conclusion, or [`NO_AGREEMENT`].
    pub conclusion: String,
    pub messages_used: u32,
    pub message_budget: u32,
    pub exported_at_ms: u64,
}

impl TranscriptExport {
    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the export as pretty-printed JSON.
    pub async fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        tokio::fs::write(path, self.to_json_pretty()?).await?;
        Ok(())
    }

    pub async fn read_json(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let text = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Human-readable rendering of the whole debate.
    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Debate transcript\n\n");
        out.push_str("## Problem\n\n");
        out.push_str(self.problem.trim());
        out.push_str("\n\n## Agents\n\n");
        for agent in &self.agents {
            out.push_str(&format!(
                "- **{}**: {}{} ({} turns)\n",
                agent.role.as_str(),
                agent.backend,
                agent
                    .model
                    .as_deref()
                    .map(|m| format!(" / {}", m))
                    .unwrap_or_default(),
                agent.turns
            ));
        }

        out.push_str("\n## Messages\n");
        for (index, turn) in self.turns.iter().enumerate() {
            let kind = match turn.kind {
                TurnKind::Opening => "opening",
                TurnKind::Exchange => "exchange",
                TurnKind::Confirmation => "confirmation",
                TurnKind::Chat => "chat",
            };
            out.push_str(&format!(
                "\n### {}. {} ({})\n\n{}\n",
                index + 1,
                turn.role,
                kind,
                turn.response.trim()
            ));
        }

        out.push_str("\n## Outcome\n\n");
        if self.agreed {
            out.push_str(&format!("Agreed: {}\n", self.conclusion));
        } else {
            out.push_str(&format!("{}\n", NO_AGREEMENT));
        }
        out.push_str(&format!(
            "\nMessages used: {}/{}\n",
            self.messages_used, self.message_budget
        ));
        out
    }
}

/// Unix time in milliseconds, or 0 if the clock is before the epoch.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_export(agreed: bool) -> TranscriptExport {
        let mut transcript = Transcript::new();
        transcript.record(Turn::with_timestamp(Role::A, TurnKind::Opening, "p", "AGREED: 42", 1));
        transcript.record(Turn::with_timestamp(Role::B, TurnKind::Opening, "p", "I think 41", 2));
        transcript.record(Turn::with_timestamp(
            Role::B,
            TurnKind::Confirmation,
            "confirm?",
            "AGREED: 42",
            3,
        ));

        TranscriptExport {
            problem: "What is 6*7?".into(),
            agents: vec![
                AgentMetadata::from_profile(
                    &AgentProfile::new(Role::A, BackendKind::Claude),
                    Some("s-a".into()),
                    1,
                ),
                AgentMetadata::from_profile(
                    &AgentProfile::new(Role::B, BackendKind::Gemini),
                    None,
                    2,
                ),
            ],
            turns: transcript.turns().to_vec(),
            agreed,
            conclusion: if agreed { "42".into() } else { NO_AGREEMENT.into() },
            messages_used: 3,
            message_budget: 3,
            exported_at_ms: 4,
        }
    }

    #[test]
    fn test_transcript_is_ordered() {
        let mut transcript = Transcript::new();
        transcript.record(Turn::new(Role::A, TurnKind::Opening, "p", "a"));
        transcript.record(Turn::new(Role::B, TurnKind::Opening, "p", "b"));
        transcript.record(Turn::new(Role::A, TurnKind::Chat, "hi", "hello"));

        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.counted_len(), 2);
        assert_eq!(transcript.last_response(Role::A), Some("hello"));
        assert_eq!(transcript.last_response(Role::B), Some("b"));
    }

    #[test]
    fn test_export_json_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&sample_export(true).to_json_pretty().unwrap()).unwrap();

        assert_eq!(json["problem"], "What is 6*7?");
        assert_eq!(json["conclusion"], "42");
        assert_eq!(json["agents"][0]["backend"], "claude");
        assert_eq!(json["agents"][0]["session_token"], "s-a");
        assert_eq!(json["turns"][2]["kind"], "confirmation");
        assert_eq!(json["turns"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_export_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debate.json");
        let export = sample_export(false);

        export.write_json(&path).await.unwrap();
        let loaded = TranscriptExport::read_json(&path).await.unwrap();

        assert_eq!(loaded, export);
        assert_eq!(loaded.conclusion, NO_AGREEMENT);
    }

    #[test]
    fn test_render_markdown() {
        let text = sample_export(true).render_markdown();
        assert!(text.contains("## Problem\n\nWhat is 6*7?"));
        assert!(text.contains("### 3. Agent B (confirmation)"));
        assert!(text.contains("Agreed: 42"));

        let text = sample_export(false).render_markdown();
        assert!(text.contains(NO_AGREEMENT));
    }
}
