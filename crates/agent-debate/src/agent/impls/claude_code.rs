//! Adapter for the `claude` CLI (Claude Code).
//!
//! Invoked as `claude -p <prompt> --output-format json [--model M] [--resume TOKEN]`.
//! The JSON envelope carries the reply in `result` and the conversation id
//! in `session_id`; failures set `is_error`.

use crate::agent::process::{CommandSpec, RawOutput};
use crate::agent::{BackendKind, GatewayError};
use crate::models::ClaudeModel;
use serde::Deserialize;
use tracing::debug;

use super::cli_agent::{
    BackendAdapter, CliAgentConfig, Decoded, classify_error_message, classify_exit,
    json_object_slice, require_text,
};

#[derive(Debug, Deserialize)]
struct ClaudeEnvelope {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    is_error: bool,
    #[serde(default)]
    subtype: Option<String>,
}

/// Talks to Claude through the `claude` executable.
#[derive(Debug, Clone, Default)]
pub struct ClaudeCodeAdapter {
    model: Option<ClaudeModel>,
    config: CliAgentConfig,
}

impl ClaudeCodeAdapter {
    pub fn new() -> Self {
        Self::default()
    }


    pub fn with_model(mut self, model: ClaudeModel) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_config(mut self, config: CliAgentConfig) -> Self {
        self.config = config;
        self
    }

    fn parse_envelope(raw: &RawOutput) -> Option<ClaudeEnvelope> {
        json_object_slice(&raw.stdout).and_then(|json| serde_json::from_str(json).ok())
    }
}

impl BackendAdapter for ClaudeCodeAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Claude
    }

    fn encode_request(&self, prompt: &str, session: Option<&str>) -> CommandSpec {
        let mut spec = self
            .config
            .command_for(BackendKind::Claude)
            .arg("-p")
            .arg(prompt)
            .args(["--output-format", "json"]);

        if let Some(model) = &self.model {
            debug!(
                target: "agent_debate::agent::claude_code",
                "Using model: {}", model.as_cli_name()
            );
            spec = spec.arg("--model").arg(model.as_cli_name());
        }

        if let Some(token) = session {
            debug!(
                target: "agent_debate::agent::claude_code",
                "Resuming session: {}", token
            );
            spec = spec.arg("--resume").arg(token);
        }

        spec.args(self.config.extra_args.iter().cloned())
    }

    fn decode_response(&self, raw: &RawOutput) -> Result<Decoded, GatewayError> {
        if !raw.success {
            // A failed run may still print an error envelope with a better message.
            if let Some(envelope) = Self::parse_envelope(raw).filter(|e| e.is_error) {
                let message = envelope
                    .result
                    .or(envelope.subtype)
                    .unwrap_or_else(|| raw.stderr.clone());
                return Err(classify_error_message(BackendKind::Claude, &message));
            }
            return Err(classify_exit(BackendKind::Claude, raw));
        }

        let json = json_object_slice(&raw.stdout).ok_or_else(|| {
            GatewayError::MalformedResponse("claude output contains no JSON object".to_string())
        })?;
        let envelope: ClaudeEnvelope = serde_json::from_str(json).map_err(|e| {
            GatewayError::MalformedResponse(format!("claude output is not valid JSON: {}", e))
        })?;

        if envelope.is_error {
            let message = envelope
                .result
                .or(envelope.subtype)
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(classify_error_message(BackendKind::Claude, &message));
        }

        Ok(Decoded {
            text: require_text(BackendKind::Claude, "result", envelope.result)?,
            session_token: envelope.session_id.filter(|s| !s.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_first_call() {
        let adapter = ClaudeCodeAdapter::new().with_model(ClaudeModel::Opus46);
        let spec = adapter.encode_request("What is 6*7?", None);

        assert_eq!(spec.program, "claude");
        assert_eq!(
            spec.args,
            vec![
                "-p",
                "What is 6*7?",
                "--output-format",
                "json",
                "--model",
                "claude-opus-4-6"
            ]
        );
    }

    #[test]
    fn test_encode_resume_and_extra_args() {
        let adapter = ClaudeCodeAdapter::new()
            .with_config(CliAgentConfig::new().with_arg("--verbose"));
        let spec = adapter.encode_request("next", Some("sess-123"));

        assert_eq!(
            spec.args,
            vec![
                "-p",
                "next",
                "--output-format",
                "json",
                "--resume",
                "sess-123",
                "--verbose"
            ]
        );
    }

    #[test]
    fn test_decode_success() {
        let raw = RawOutput::ok(
            r#"{"type":"result","subtype":"success","is_error":false,"result":"AGREED: 42","session_id":"abc-1"}"#,
        );
        let decoded = ClaudeCodeAdapter::new().decode_response(&raw).unwrap();
        assert_eq!(decoded.text, "AGREED: 42");
        assert_eq!(decoded.session_token.as_deref(), Some("abc-1"));
    }

    #[test]
    fn test_decode_missing_result_is_malformed() {
        let raw = RawOutput::ok(r#"{"type":"result","session_id":"abc-1"}"#);
        assert!(matches!(
            ClaudeCodeAdapter::new().decode_response(&raw),
            Err(GatewayError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_decode_invalid_json_is_malformed() {
        let raw = RawOutput::ok("not json at all");
        assert!(matches!(
            ClaudeCodeAdapter::new().decode_response(&raw),
            Err(GatewayError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_decode_error_envelope_rate_limit() {
        let raw = RawOutput::failed(1, "").with_stdout(
            r#"{"type":"result","is_error":true,"result":"API Error: 429 rate_limit_error"}"#,
        );
        assert!(matches!(
            ClaudeCodeAdapter::new().decode_response(&raw),
            Err(GatewayError::RateLimited(_))
        ));
    }

    #[test]
    fn test_decode_error_envelope_on_success_exit() {
        let raw = RawOutput::ok(r#"{"is_error":true,"result":"Invalid API key"}"#);
        assert!(matches!(
            ClaudeCodeAdapter::new().decode_response(&raw),
            Err(GatewayError::Transport(_))
        ));
    }

    #[test]
    fn test_decode_plain_failure() {
        let raw = RawOutput::failed(127, "claude: command not found");
        assert!(matches!(
            ClaudeCodeAdapter::new().decode_response(&raw),
            Err(GatewayError::Transport(_))
        ));
    }
}
