//! Subprocess execution behind a trait, so the gateway can be driven by
//! scripted runners in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// A fully resolved command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub env: HashMap<String, String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The command line as a single string, for logs.
    pub fn display(&self) -> String {
        // Prompts can be long; only the flags are useful in a log line.
        let args: Vec<&str> = self
            .args
            .iter()
            .map(|a| if a.len() > 64 { "<prompt>" } else { a.as_str() })
            .collect();
        format!("{} {}", self.program, args.join(" "))
    }
}

/// What a finished subprocess left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutput {
    pub status_code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl RawOutput {
    /// A successful exit with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status_code: Some(0),
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed exit with the given code and stderr.
    pub fn failed(status_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            status_code: Some(status_code),
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }
}

/// Runs a [`CommandSpec`] to completion.
///
/// Dropping the returned future must abort the subprocess; the gateway
/// relies on this to enforce its per-call timeout.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, spec: &CommandSpec) -> std::io::Result<RawOutput>;
}

/// Spawns real processes with `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> std::io::Result<RawOutput> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &spec.working_dir {
            debug!(
                target: "agent_debate::agent::process",
                "Setting working directory: {}", dir.display()
            );
            cmd.current_dir(dir);
        }

        for (key, value) in &spec.env {
            debug!(
                target: "agent_debate::agent::process",
                "Setting environment variable: {}", key
            );
            cmd.env(key, value);
        }

        let output = cmd.output().await?;

        Ok(RawOutput {
            status_code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
