//! Model identifiers for the three supported CLI backends.
//!
//! Each backend accepts a fixed set of model names. Users can pass either a
//! shorthand (`"opus"`, `"flash"`, `"5.1-codex"`) or a full identifier, and
//! anything unrecognised is accepted as `Custom` only if it carries the
//! provider's prefix.

use std::fmt;
use thiserror::Error;

/// A model string could not be accepted for a backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unknown model '{model}', custom names must start with {}", .expected_prefixes.join(" or "))]
    InvalidPrefix {
        model: String,
        expected_prefixes: &'static [&'static str],
    },
    #[error("model name is empty")]
    Empty,
}

/// Declares a backend's model enum from a table of
/// `Variant => "cli-name" ["alias", ...]` rows.
///
/// Generates the enum with a trailing `Custom(String)` variant, its
/// `Default`, `as_cli_name`, `Display` and a `FromStr` that matches the CLI
/// name or any alias case-insensitively, falling back to a prefix check.
macro_rules! cli_models {
    (
        $(#[$meta:meta])*
        $name:ident {
            prefixes: [$($prefix:literal),+ $(,)?],
            default: $default:ident,
            $($variant:ident => $cli:literal [$($alias:literal),* $(,)?]),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[doc = concat!("`", $cli, "`")]
                $variant,
            )+
            /// Any other name carrying one of [`Self::PREFIXES`].
            Custom(String),
        }

        impl $name {
            /// Prefixes a `Custom` name must start with.
            pub const PREFIXES: &'static [&'static str] = &[$($prefix),+];

            /// Returns the identifier passed on the command line.
            pub fn as_cli_name(&self) -> &str {
                match self {
                    $(Self::$variant => $cli,)+
                    Self::Custom(name) => name,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_cli_name())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let name = s.trim().to_lowercase();
                match name.as_str() {
                    "" => Err(ModelError::Empty),
                    $($cli $(| $alias)* => Ok(Self::$variant),)+
                    _ => custom_name(name, Self::PREFIXES).map(Self::Custom),
                }
            }
        }
    };
}

fn custom_name(name: String, prefixes: &'static [&'static str]) -> Result<String, ModelError> {
    if prefixes.iter().any(|p| name.starts_with(p)) {
        Ok(name)
    } else {
        Err(ModelError::InvalidPrefix {
            model: name,
            expected_prefixes: prefixes,
        })
    }
}

cli_models! {
    /// Models selectable through `claude --model`.
    ///
    /// ```
    /// use agent_debate::models::ClaudeModel;
    ///
    /// let model: ClaudeModel = "opus".parse().unwrap();
    /// assert_eq!(model, ClaudeModel::Opus46);
    /// assert_eq!(model.as_cli_name(), "claude-opus-4-6");
    /// ```
    ClaudeModel {
        prefixes: ["claude-"],
        default: Sonnet46,
        Opus46 => "claude-opus-4-6" ["opus", "opus-4.6", "claude-opus-4.6"],
        Sonnet46 => "claude-sonnet-4-6" ["sonnet", "sonnet-4.6", "claude-sonnet-4.6"],
        Haiku45 => "claude-haiku-4-5-20251001" ["haiku", "haiku-4.5", "claude-haiku-4.5"],
        Opus45 => "claude-opus-4-5-20251101" ["opus-4.5", "claude-opus-4.5"],
        Sonnet45 => "claude-sonnet-4-5-20250929" ["sonnet-4.5", "claude-sonnet-4.5"],
    }
}

cli_models! {
    /// Models selectable through `gemini -m`.
    GeminiModel {
        prefixes: ["gemini-"],
        default: Flash25,
        Pro31 => "gemini-3.1-pro-preview" ["pro-3.1"],
        Flash3 => "gemini-3-flash-preview" ["flash-3", "gemini-3-flash"],
        Flash25 => "gemini-2.5-flash" ["flash", "flash-2.5"],
        Pro25 => "gemini-2.5-pro" ["pro", "pro-2.5"],
        FlashLite25 => "gemini-2.5-flash-lite" ["flash-lite", "lite"],
    }
}

cli_models! {
    /// Models selectable through `codex -m`.
    OpenAIModel {
        prefixes: ["gpt-", "o1-", "o3-"],
        default: Gpt52Codex,
        Gpt52 => "gpt-5.2" ["5.2"],
        Gpt51 => "gpt-5.1" ["5.1"],
        Gpt5 => "gpt-5" ["5"],
        Gpt52Codex => "gpt-5.2-codex" ["5.2-codex", "codex"],
        Gpt51Codex => "gpt-5.1-codex" ["5.1-codex"],
        Gpt51CodexMini => "gpt-5.1-codex-mini" ["5.1-codex-mini", "codex-mini"],
        O3 => "o3" [],
    }
}

/// A model bound to the backend that serves it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    Claude(ClaudeModel),
    Gemini(GeminiModel),
    OpenAI(OpenAIModel),
}

impl Model {
    pub fn as_cli_name(&self) -> &str {
        match self {
            Self::Claude(m) => m.as_cli_name(),
            Self::Gemini(m) => m.as_cli_name(),
            Self::OpenAI(m) => m.as_cli_name(),
        }
    }
}

impl From<ClaudeModel> for Model {
    fn from(m: ClaudeModel) -> Self {
        Self::Claude(m)
    }
}

impl From<GeminiModel> for Model {
    fn from(m: GeminiModel) -> Self {
        Self::Gemini(m)
    }
}

impl From<OpenAIModel> for Model {
    fn from(m: OpenAIModel) -> Self {
        Self::OpenAI(m)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_cli_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claude_shorthand() {
        assert_eq!("opus".parse::<ClaudeModel>().unwrap(), ClaudeModel::Opus46);
        assert_eq!("Sonnet".parse::<ClaudeModel>().unwrap(), ClaudeModel::Sonnet46);
        assert_eq!("haiku".parse::<ClaudeModel>().unwrap(), ClaudeModel::Haiku45);
        assert_eq!(
            "claude-opus-4-5-20251101".parse::<ClaudeModel>().unwrap(),
            ClaudeModel::Opus45
        );
    }

    #[test]
    fn test_claude_custom_requires_prefix() {
        let model: ClaudeModel = "claude-experimental-9".parse().unwrap();
        assert_eq!(model.as_cli_name(), "claude-experimental-9");

        let err = "gpt-5x".parse::<ClaudeModel>().unwrap_err();
        assert!(matches!(err, ModelError::InvalidPrefix { .. }));
        assert!(err.to_string().contains("claude-"));
    }

    #[test]
    fn test_gemini_parse() {
        assert_eq!("flash".parse::<GeminiModel>().unwrap(), GeminiModel::Flash25);
        assert_eq!("pro".parse::<GeminiModel>().unwrap(), GeminiModel::Pro25);
        assert_eq!(GeminiModel::default(), GeminiModel::Flash25);
        assert!("claude-opus-4".parse::<GeminiModel>().is_err());
    }

    #[test]
    fn test_openai_parse() {
        assert_eq!("codex".parse::<OpenAIModel>().unwrap(), OpenAIModel::Gpt52Codex);
        assert_eq!("o3".parse::<OpenAIModel>().unwrap(), OpenAIModel::O3);
        assert_eq!(
            "o3-mini".parse::<OpenAIModel>().unwrap(),
            OpenAIModel::Custom("o3-mini".to_string())
        );
        let err = "gemini-2.5-pro".parse::<OpenAIModel>().unwrap_err();
        assert!(err.to_string().contains("gpt- or o1- or o3-"));
    }

    #[test]
    fn test_empty_model_rejected() {
        assert_eq!("  ".parse::<ClaudeModel>().unwrap_err(), ModelError::Empty);
        assert_eq!("".parse::<GeminiModel>().unwrap_err(), ModelError::Empty);
    }

    #[test]
    fn test_model_display_uses_cli_name() {
        let model = Model::from(GeminiModel::Pro25);
        assert_eq!(model.to_string(), "gemini-2.5-pro");
        assert_eq!(OpenAIModel::Gpt51Codex.to_string(), "gpt-5.1-codex");
    }
}
