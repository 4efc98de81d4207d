//! Adapter for the `gemini` CLI.
//!
//! Invoked as `gemini -p <prompt> --output-format json [-m M] [--resume TOKEN]`.
//! The reply is in `response`; errors arrive as an `error` object.

use crate::agent::process::{CommandSpec, RawOutput};
use crate::agent::{BackendKind, GatewayError};
use crate::models::GeminiModel;
use serde::Deserialize;
use tracing::debug;

use super::cli_agent::{
    BackendAdapter, CliAgentConfig, Decoded, classify_error_message, classify_exit,
    json_object_slice, require_text,
};

#[derive(Debug, Deserialize)]
struct GeminiEnvelope {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    error: Option<GeminiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

impl GeminiErrorBody {
    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(code) = &self.code {
            parts.push(code.to_string());
        }
        if let Some(kind) = &self.kind {
            parts.push(kind.clone());
        }
        if let Some(message) = &self.message {
            parts.push(message.clone());
        }
        if parts.is_empty() {
            "unknown error".to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// Talks to Gemini through the `gemini` executable.
#[derive(Debug, Clone, Default)]
pub struct GeminiAdapter {
    model: Option<GeminiModel>,
    config: CliAgentConfig,
}

impl GeminiAdapter {
    pub fn new() -> Self {
        Self::default()
    }


    pub fn with_model(mut self, model: GeminiModel) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_config(mut self, config: CliAgentConfig) -> Self {
        self.config = config;
        self
    }

    fn parse_envelope(stdout: &str) -> Result<GeminiEnvelope, GatewayError> {
        let json = json_object_slice(stdout).ok_or_else(|| {
            GatewayError::MalformedResponse("gemini output contains no JSON object".to_string())
        })?;
        serde_json::from_str(json).map_err(|e| {
            GatewayError::MalformedResponse(format!("gemini output is not valid JSON: {}", e))
        })
    }
}

impl BackendAdapter for GeminiAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Gemini
    }

    fn encode_request(&self, prompt: &str, session: Option<&str>) -> CommandSpec {
        let mut spec = self
            .config
            .command_for(BackendKind::Gemini)
            .arg("-p")
            .arg(prompt)
            .args(["--output-format", "json"]);

        if let Some(model) = &self.model {
            debug!(
                target: "agent_debate::agent::gemini",
                "Using model: {}", model.as_cli_name()
            );
            spec = spec.arg("-m").arg(model.as_cli_name());
        }

        if let Some(token) = session {
            spec = spec.arg("--resume").arg(token);
        }

        spec.args(self.config.extra_args.iter().cloned())
    }

    fn decode_response(&self, raw: &RawOutput) -> Result<Decoded, GatewayError> {
        if !raw.success {
            if let Ok(GeminiEnvelope {
                error: Some(error), ..
            }) = Self::parse_envelope(&raw.stdout)
            {
                return Err(classify_error_message(BackendKind::Gemini, &error.describe()));
            }
            return Err(classify_exit(BackendKind::Gemini, raw));
        }

        let envelope = Self::parse_envelope(&raw.stdout)?;

        if let Some(error) = envelope.error {
            return Err(classify_error_message(BackendKind::Gemini, &error.describe()));
        }

        Ok(Decoded {
            text: require_text(BackendKind::Gemini, "response", envelope.response)?,
            session_token: envelope.session_id.filter(|s| !s.is_empty()),
        })
    }
}
