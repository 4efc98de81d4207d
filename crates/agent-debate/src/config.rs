//! Configuration for a debate run.

use crate::agent::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or validating a [`DebateConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Invalid(String),
}

/// Tunables for one debate.
///
/// # Example
///
/// ```
/// use agent_debate::DebateConfig;
///
/// let config = DebateConfig::default();
/// assert_eq!(config.max_messages, 10);
///
/// let custom = DebateConfig {
///     max_messages: 4,
///     ..Default::default()
/// };
/// assert!(custom.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebateConfig {
    /// Total messages the debate may produce before asking to extend.
    ///
    /// Round 0 alone produces two messages, so this must be at least 2.
    /// A confirmation exchange consumes one message like any other turn.
    ///
    /// **Default:** 10
    pub max_messages: u32,

    /// Upper bound on a single backend call, in seconds.
    ///
    /// When the bound elapses the subprocess is killed and the call fails
    /// with a timeout. Timeouts are never retried.
    ///
    /// **Default:** 300
    pub timeout_secs: u64,

    /// Retries after a rate-limited call, before giving up.
    ///
    /// **Default:** 3 (four attempts in total)
    pub max_retries: u32,

    /// Backoff before the first retry, in seconds. Doubles on each retry.
    ///
    /// **Default:** 5
    pub retry_base_delay_secs: u64,

    /// Messages added to the budget when an extension is granted.
    ///
    /// **Default:** 5
    pub extension_increment: u32,

    /// Free-form instruction placed at the top of the opening prompt.
    ///
    /// **Default:** `None`
    pub opening_instruction: Option<String>,

    /// Ask the confirming agent for a critical review instead of a plain
    /// yes/no confirmation.
    ///
    /// **Default:** `false`
    pub strict_confirmation: bool,
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            max_messages: 10,
            timeout_secs: 300,
            max_retries: 3,
            retry_base_delay_secs: 5,
            extension_increment: 5,
            opening_instruction: None,
            strict_confirmation: false,
        }
    }
}

impl DebateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_messages(mut self, max_messages: u32) -> Self {
        self.max_messages = max_messages;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_base_delay_secs(mut self, secs: u64) -> Self {
        self.retry_base_delay_secs = secs;
        self
    }

    pub fn with_extension_increment(mut self, increment: u32) -> Self {
        self.extension_increment = increment;
        self
    }

    pub fn with_opening_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.opening_instruction = Some(instruction.into());
        self
    }

    pub fn with_strict_confirmation(mut self, strict: bool) -> Self {
        self.strict_confirmation = strict;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_secs(self.retry_base_delay_secs),
        )
    }

    /// Checks the invariants the debate engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_messages < 2 {
            return Err(ConfigError::InvalidValue {
                key: "max_messages",
                value: self.max_messages.to_string(),
                reason: "round 0 needs at least 2 messages".to_string(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_secs",
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.retry_base_delay_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "retry_base_delay_secs",
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.extension_increment == 0 {
            return Err(ConfigError::InvalidValue {
                key: "extension_increment",
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Defaults overridden by `DEBATE_*` environment variables, validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().merge_env_with(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`, which maps variable names to values.
    ///
    /// Recognised keys: `DEBATE_MAX_MESSAGES`, `DEBATE_TIMEOUT_SECS`,
    /// `DEBATE_MAX_RETRIES`, `DEBATE_RETRY_BASE_DELAY_SECS`,
    /// `DEBATE_EXTENSION_INCREMENT`, `DEBATE_INSTRUCTION` and
    /// `DEBATE_STRICT_CONFIRMATION`.
    pub fn merge_env_with<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("DEBATE_MAX_MESSAGES") {
            self.max_messages = parse_number("DEBATE_MAX_MESSAGES", &v)?;
        }
        if let Some(v) = lookup("DEBATE_TIMEOUT_SECS") {
            self.timeout_secs = parse_number("DEBATE_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("DEBATE_MAX_RETRIES") {
            self.max_retries = parse_number("DEBATE_MAX_RETRIES", &v)?;
        }
        if let Some(v) = lookup("DEBATE_RETRY_BASE_DELAY_SECS") {
            self.retry_base_delay_secs = parse_number("DEBATE_RETRY_BASE_DELAY_SECS", &v)?;
        }
        if let Some(v) = lookup("DEBATE_EXTENSION_INCREMENT") {
            self.extension_increment = parse_number("DEBATE_EXTENSION_INCREMENT", &v)?;
        }
        if let Some(v) = lookup("DEBATE_INSTRUCTION") {
            let v = v.trim();
            self.opening_instruction = (!v.is_empty()).then(|| v.to_string());
        }
        if let Some(v) = lookup("DEBATE_STRICT_CONFIRMATION") {
            self.strict_confirmation = parse_bool("DEBATE_STRICT_CONFIRMATION", &v)?;
        }

        self.validate()?;
        Ok(self)
    }
}

fn parse_number<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DebateConfig::default();
        assert_eq!(config.max_messages, 10);
        assert_eq!(config.timeout(), Duration::from_secs(300));
        assert_eq!(
            config.retry_policy(),
            RetryPolicy::new(3, Duration::from_secs(5))
        );
        assert_eq!(config.extension_increment, 5);
        assert!(config.opening_instruction.is_none());
        assert!(!config.strict_confirmation);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_budget_below_round_zero() {
        let err = DebateConfig::default()
            .with_max_messages(1)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "max_messages",
                ..
            }
        ));
    }

    #[test]
    fn test_env_overrides() {
        let config = DebateConfig::default()
            .merge_env_with(lookup(&[
                ("DEBATE_MAX_MESSAGES", "6"),
                ("DEBATE_MAX_RETRIES", "0"),
                ("DEBATE_INSTRUCTION", "  Be terse.  "),
                ("DEBATE_STRICT_CONFIRMATION", "yes"),
            ]))
            .unwrap();

        assert_eq!(config.max_messages, 6);
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.opening_instruction.as_deref(), Some("Be terse."));
        assert!(config.strict_confirmation);
        assert_eq!(config.timeout_secs, 300);
    }

    #[test]
    fn test_env_invalid_number() {
        let err = DebateConfig::default()
            .merge_env_with(lookup(&[("DEBATE_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("DEBATE_TIMEOUT_SECS"));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: DebateConfig =
            serde_json::from_str(r#"{"max_messages": 4, "strict_confirmation": true}"#).unwrap();
        assert_eq!(config.max_messages, 4);
        assert!(config.strict_confirmation);
        assert_eq!(config.extension_increment, 5);
    }
}
