//! # Observability
//!
//! One-call setup for tracing output. Events from this crate use explicit
//! `agent_debate::*` targets; `log` records (the retry loop emits those)
//! are bridged into the same subscriber.
//!
//! Console output goes to stderr so a debate's own stdout stays clean.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// How log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per event, for feeding debate logs into other tools.
    Json,
}

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogTarget {
    #[default]
    Stderr,
    /// A file path, created or truncated on init.
    File(String),
}

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Maximum level for `agent_debate` targets. `RUST_LOG` can add more.
    pub level: Level,
    pub target: LogTarget,
    pub format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            target: LogTarget::default(),
            format: LogFormat::default(),
        }
    }
}

impl ObservabilityConfig {
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_file(mut self, path: impl Into<String>) -> Self {
        self.target = LogTarget::File(path.into());
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// The filter directive added on top of `RUST_LOG`.
    pub fn directive(&self) -> String {
        format!("agent_debate={}", self.level.as_str().to_lowercase())
    }
}

/// Installs the global tracing subscriber and the `log` bridge.
///
/// Fails if a global subscriber or logger is already installed.
pub fn init(config: ObservabilityConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::from_default_env().add_directive(config.directive().parse()?);
    let registry = tracing_subscriber::registry().with(filter);

    match (config.target, config.format) {
        (LogTarget::Stderr, LogFormat::Text) => {
            let layer = fmt::layer().with_writer(std::io::stderr);
            tracing::subscriber::set_global_default(registry.with(layer))?;
        }
        (LogTarget::Stderr, LogFormat::Json) => {
            let layer = fmt::layer().json().with_writer(std::io::stderr);
            tracing::subscriber::set_global_default(registry.with(layer))?;
        }
        (LogTarget::File(path), format) => {
            let file = std::fs::File::create(path)?;
            let layer = fmt::layer().with_ansi(false).with_writer(file);
            match format {
                LogFormat::Text => tracing::subscriber::set_global_default(registry.with(layer))?,
                LogFormat::Json => {
                    tracing::subscriber::set_global_default(registry.with(layer.json()))?
                }
            }
        }
    }

    tracing_log::LogTracer::init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert_eq!(config.target, LogTarget::Stderr);
        assert_eq!(config.format, LogFormat::Text);
        assert_eq!(config.directive(), "agent_debate=info");
    }

    #[test]
    fn test_builders() {
        let config = ObservabilityConfig::default()
            .with_level(Level::DEBUG)
            .with_file("debate.log")
            .with_format(LogFormat::Json);

        assert_eq!(config.target, LogTarget::File("debate.log".to_string()));
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.directive().parse::<tracing_subscriber::filter::Directive>().is_ok());
        assert_eq!(config.directive(), "agent_debate=debug");
    }
}
