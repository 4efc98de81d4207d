//! Adapter for the `codex` CLI.
//!
//! Invoked as `codex exec --json --skip-git-repo-check [-m M] <prompt>`, or
//! with `resume TOKEN` before the prompt to continue a thread. Output is a
//! stream of JSON events, one per line: the thread id comes from
//! `thread.started`, the reply from the last completed `agent_message` item.

use crate::agent::process::{CommandSpec, RawOutput};
use crate::agent::{BackendKind, GatewayError};
use crate::models::OpenAIModel;
use serde_json::Value;
use tracing::debug;

use super::cli_agent::{
    BackendAdapter, CliAgentConfig, Decoded, classify_error_message, classify_exit, require_text,
};

/// Talks to OpenAI models through the `codex` executable.
#[derive(Debug, Clone, Default)]
pub struct CodexAdapter {
    model: Option<OpenAIModel>,
    config: CliAgentConfig,
}

#[derive(Debug, Default)]
struct EventSummary {
    parsed_events: usize,
    thread_id: Option<String>,
    last_message: Option<String>,
    error: Option<String>,
}

impl CodexAdapter {
    pub fn new() -> Self {
        Self::default()
    }


    pub fn with_model(mut self, model: OpenAIModel) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_config(mut self, config: CliAgentConfig) -> Self {
        self.config = config;
        self
    }

    fn summarize(stdout: &str) -> EventSummary {
        let mut summary = EventSummary::default();

        for line in stdout.lines().map(str::trim).filter(|l| l.starts_with('{')) {
            let Ok(event) = serde_json::from_str::<Value>(line) else {
                continue;
            };
            summary.parsed_events += 1;

            match event.get("type").and_then(Value::as_str) {
                Some("thread.started") => {
                    summary.thread_id = event
                        .get("thread_id")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                }
                Some("item.completed") => {
                    let item = event.get("item");
                    let item_type = item
                        .and_then(|i| i.get("type").or_else(|| i.get("item_type")))
                        .and_then(Value::as_str);
                    if matches!(item_type, Some("agent_message") | Some("assistant_message")) {
                        summary.last_message = item
                            .and_then(|i| i.get("text"))
                            .and_then(Value::as_str)
                            .map(str::to_string);
                    }
                }
                Some("error") => {
                    summary.error = event
                        .get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                }
                Some("turn.failed") => {
                    summary.error = event
                        .get("error")
                        .and_then(|e| e.get("message"))
                        .and_then(Value::as_str)
                        .map(str::to_string);
                }
                _ => {}
            }
        }

        summary
    }
}

impl BackendAdapter for CodexAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Codex
    }

    fn encode_request(&self, prompt: &str, session: Option<&str>) -> CommandSpec {
        let mut spec = self
            .config
            .command_for(BackendKind::Codex)
            .args(["exec", "--json", "--skip-git-repo-check"]);

        if let Some(model) = &self.model {
            debug!(
                target: "agent_debate::agent::codex",
                "Using model: {}", model.as_cli_name()
            );
            spec = spec.arg("-m").arg(model.as_cli_name());
        }

        spec = spec.args(self.config.extra_args.iter().cloned());

        if let Some(token) = session {
            spec = spec.arg("resume").arg(token);
        }

        spec.arg(prompt)
    }

    fn decode_response(&self, raw: &RawOutput) -> Result<Decoded, GatewayError> {
        let summary = Self::summarize(&raw.stdout);

        if !raw.success {
            return Err(match &summary.error {
                Some(message) => classify_error_message(BackendKind::Codex, message),
                None => classify_exit(BackendKind::Codex, raw),
            });
        }

        if summary.parsed_events == 0 {
            return Err(GatewayError::MalformedResponse(
                "codex output contains no JSON events".to_string(),
            ));
        }

        if summary.last_message.is_none() {
            if let Some(message) = &summary.error {
                return Err(classify_error_message(BackendKind::Codex, message));
            }
        }

        Ok(Decoded {
            text: require_text(BackendKind::Codex, "item.text", summary.last_message)?,
            session_token: summary.thread_id.filter(|s| !s.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSCRIPT: &str = r#"{"type":"thread.started","thread_id":"0199a213-81c0-7800-8aa1-bbab2a035a53"}
{"type":"turn.started"}
{"type":"item.completed","item":{"id":"item_0","type":"reasoning","text":"thinking"}}
{"type":"item.completed","item":{"id":"item_1","type":"agent_message","text":"First draft"}}
{"type":"item.completed","item":{"id":"item_2","type":"agent_message","text":"AGREED: 42"}}
{"type":"turn.completed","usage":{"input_tokens":24763,"output_tokens":122}}
"#;

    #[test]
    fn test_encode_first_call() {
        let adapter = CodexAdapter::new().with_model(OpenAIModel::Gpt51Codex);
        let spec = adapter.encode_request("solve it", None);

        assert_eq!(spec.program, "codex");
        assert_eq!(
            spec.args,
            vec![
                "exec",
                "--json",
                "--skip-git-repo-check",
                "-m",
                "gpt-5.1-codex",
                "solve it"
            ]
        );
    }

    #[test]
    fn test_encode_resume() {
        let spec = CodexAdapter::new().encode_request("again", Some("thread-9"));
        assert_eq!(
            spec.args,
            vec![
                "exec",
                "--json",
                "--skip-git-repo-check",
                "resume",
                "thread-9",
                "again"
            ]
        );
    }

    #[test]
    fn test_decode_takes_last_agent_message() {
        let decoded = CodexAdapter::new()
            .decode_response(&RawOutput::ok(TRANSCRIPT))
            .unwrap();
        assert_eq!(decoded.text, "AGREED: 42");
        assert_eq!(
            decoded.session_token.as_deref(),
            Some("0199a213-81c0-7800-8aa1-bbab2a035a53")
        );
    }

    #[test]
    fn test_decode_skips_non_json_lines() {
        let stdout = format!("Reading prompt from stdin...\n{}", TRANSCRIPT);
        let decoded = CodexAdapter::new()
            .decode_response(&RawOutput::ok(stdout))
            .unwrap();
        assert_eq!(decoded.text, "AGREED: 42");
    }

    #[test]
    fn test_decode_no_message_is_malformed() {
        let stdout = r#"{"type":"thread.started","thread_id":"t"}
{"type":"turn.completed"}"#;
        assert!(matches!(
            CodexAdapter::new().decode_response(&RawOutput::ok(stdout)),
            Err(GatewayError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_decode_no_events_is_malformed() {
        assert!(matches!(
            CodexAdapter::new().decode_response(&RawOutput::ok("plain text")),
            Err(GatewayError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_decode_turn_failed_rate_limit() {
        let stdout = r#"{"type":"thread.started","thread_id":"t"}
{"type":"turn.failed","error":{"message":"You've hit your usage limit. 429 Too Many Requests"}}"#;
        let raw = RawOutput::failed(1, "").with_stdout(stdout);
        assert!(matches!(
            CodexAdapter::new().decode_response(&raw),
            Err(GatewayError::RateLimited(_))
        ));
    }

    #[test]
    fn test_decode_error_event_transport() {
        let stdout = r#"{"type":"error","message":"stream disconnected before completion"}"#;
        let raw = RawOutput::failed(1, "").with_stdout(stdout);
        assert!(matches!(
            CodexAdapter::new().decode_response(&raw),
            Err(GatewayError::Transport(_))
        ));
    }
}
