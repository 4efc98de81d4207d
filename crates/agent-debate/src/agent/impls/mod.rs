//! Backend adapters for the supported CLI tools.

pub mod claude_code;
pub mod cli_agent;
pub mod codex_agent;
pub mod gemini;

pub use claude_code::ClaudeCodeAdapter;
pub use cli_agent::{BackendAdapter, CliAgentConfig, Decoded, is_rate_limited};
pub use codex_agent::CodexAdapter;
pub use gemini::GeminiAdapter;

use crate::agent::AgentProfile;
use crate::agent::BackendKind;
use crate::models::Model;
use tracing::warn;

/// Builds the adapter matching a profile's backend, with its model applied.
pub fn adapter_for(profile: &AgentProfile, config: CliAgentConfig) -> Box<dyn BackendAdapter> {
    let model = profile.model.clone();
    match profile.kind {
        BackendKind::Claude => {
            let mut adapter = ClaudeCodeAdapter::new().with_config(config);
            match model {
                Some(Model::Claude(m)) => adapter = adapter.with_model(m),
                Some(other) => warn_mismatch(profile, &other),
                None => {}
            }
            Box::new(adapter)
        }
        BackendKind::Gemini => {
            let mut adapter = GeminiAdapter::new().with_config(config);
            match model {
                Some(Model::Gemini(m)) => adapter = adapter.with_model(m),
                Some(other) => warn_mismatch(profile, &other),
                None => {}
            }
            Box::new(adapter)
        }
        BackendKind::Codex => {
            let mut adapter = CodexAdapter::new().with_config(config);
            match model {
                Some(Model::OpenAI(m)) => adapter = adapter.with_model(m),
                Some(other) => warn_mismatch(profile, &other),
                None => {}
            }
            Box::new(adapter)
        }
    }
}

fn warn_mismatch(profile: &AgentProfile, model: &Model) {
    warn!(
        target: "agent_debate::agent",
        "{}: model '{}' does not belong to the {} backend, using the CLI default",
        profile.label, model, profile.kind
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Role;
    use crate::models::ClaudeModel;

    #[test]
    fn test_adapter_for_applies_model() {
        let profile = AgentProfile::new(Role::A, BackendKind::Claude).with_model(ClaudeModel::Haiku45.into());
        let adapter = adapter_for(&profile, CliAgentConfig::new());
        assert_eq!(adapter.kind(), BackendKind::Claude);

        let spec = adapter.encode_request("hi", None);
        assert!(spec.args.contains(&"claude-haiku-4-5-20251001".to_string()));
    }

    #[test]
    fn test_adapter_for_ignores_foreign_model() {
        let profile = AgentProfile::new(Role::B, BackendKind::Codex).with_model(ClaudeModel::Opus46.into());
        let spec = adapter_for(&profile, CliAgentConfig::new()).encode_request("hi", None);
        assert!(!spec.args.iter().any(|a| a == "-m"));
    }
}
