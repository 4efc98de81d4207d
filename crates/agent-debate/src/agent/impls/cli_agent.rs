//! Shared configuration and the adapter contract for CLI backends.
//!
//! An adapter knows two things about its tool: how to turn a prompt and an
//! optional session token into a command line, and how to turn the
//! finished process output back into text plus a continuation token.
//! Running the process is someone else's job (see
//! [`crate::agent::process::CommandRunner`]).

use crate::agent::process::{CommandSpec, RawOutput};
use crate::agent::{BackendKind, GatewayError};
use regex::Regex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Settings shared by every CLI backend.
#[derive(Debug, Clone, Default)]
pub struct CliAgentConfig {
    /// Path to the executable. Falls back to the backend's command name in `PATH`.
    pub cli_path: Option<PathBuf>,
    /// Working directory for command execution
    pub working_dir: Option<PathBuf>,
    /// Environment variables to set for command execution
    pub env_vars: HashMap<String, String>,
    /// Additional CLI arguments, placed before the prompt
    pub extra_args: Vec<String>,
}

impl CliAgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cli_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cli_path = Some(path.into());
        self
    }

    /// Sets the working directory where the command will be executed.
    pub fn with_cwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    pub fn with_envs(mut self, envs: HashMap<String, String>) -> Self {
        self.env_vars.extend(envs);
        self
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.extra_args.extend(args);
        self
    }

    /// Starts a command for `kind` with this configuration's executable,
    /// working directory and environment applied.
    pub fn command_for(&self, kind: BackendKind) -> CommandSpec {
        let program = self
            .cli_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| kind.command_name().to_string());

        let mut spec = CommandSpec::new(program);
        spec.working_dir = self.working_dir.clone();
        spec.env = self.env_vars.clone();
        spec
    }
}

/// Text and continuation token pulled out of a backend's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    pub session_token: Option<String>,
}

/// Per-backend encoding of requests and decoding of responses.
pub trait BackendAdapter: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Builds the command line for one call. `session` resumes a prior
    /// conversation when present.
    fn encode_request(&self, prompt: &str, session: Option<&str>) -> CommandSpec;

    /// Interprets the finished process.
    fn decode_response(&self, raw: &RawOutput) -> Result<Decoded, GatewayError>;
}

static RATE_LIMIT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b429\b|rate[ _-]?limit|quota|resource[_ ]exhausted|too many requests|overloaded")
        .expect("rate limit pattern is valid")
});

/// Whether a diagnostic text describes a rate limit or quota condition.
pub fn is_rate_limited(text: &str) -> bool {
    RATE_LIMIT_PATTERN.is_match(text)
}

/// Classifies an error message the backend reported.
pub(crate) fn classify_error_message(kind: BackendKind, message: &str) -> GatewayError {
    let message = message.trim();
    if is_rate_limited(message) {
        GatewayError::RateLimited(format!("{}: {}", kind, first_line(message)))
    } else {
        GatewayError::Transport(format!("{} reported an error: {}", kind, first_line(message)))
    }
}

/// Classifies a non-zero exit from its combined stderr and stdout.
pub(crate) fn classify_exit(kind: BackendKind, raw: &RawOutput) -> GatewayError {
    let diagnostic = format!("{}\n{}", raw.stderr, raw.stdout);
    let status = raw
        .status_code
        .map(|c| c.to_string())
        .unwrap_or_else(|| "signal".to_string());

    if is_rate_limited(&diagnostic) {
        GatewayError::RateLimited(format!(
            "{} exited with status {}: {}",
            kind,
            status,
            first_line(diagnostic.trim())
        ))
    } else {
        GatewayError::Transport(format!(
            "{} exited with status {}: {}",
            kind,
            status,
            first_line(raw.stderr.trim())
        ))
    }
}

/// Rejects an absent or empty text field in an otherwise valid envelope.
pub(crate) fn require_text(
    kind: BackendKind,
    field: &str,
    value: Option<String>,
) -> Result<String, GatewayError> {
    match value {
        Some(text) if !text.is_empty() => Ok(text),
        Some(_) => Err(GatewayError::MalformedResponse(format!(
            "{} returned an empty '{}' field",
            kind, field
        ))),
        None => Err(GatewayError::MalformedResponse(format!(
            "{} output has no '{}' field",
            kind, field
        ))),
    }
}

/// Slices the JSON object out of stdout, skipping banner lines some CLIs
/// print before it. The object starts on the first line that begins with `{`.
pub(crate) fn json_object_slice(stdout: &str) -> Option<&str> {
    let mut offset = 0;
    for line in stdout.split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        if line.trim_start().starts_with('{') {
            let rest = &stdout[offset + indent..];
            let end = rest.rfind('}')?;
            return Some(&rest[..=end]);
        }
        offset += line.len();
    }
    None
}

fn first_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("no diagnostic output")
}
