//! Template rendering for the messages sent to the agents.

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;
use thiserror::Error;

#[doc(hidden)]
pub use minijinja;

/// A template failed to compile or render.
#[derive(Debug, Error)]
#[error("prompt template error: {0}")]
pub struct PromptError(#[from] minijinja::Error);

/// Renders a prompt from a template string and a serializable context.
///
/// Undefined variables are an error rather than silently rendering empty,
/// so a misspelt key fails loudly. This is the underlying function for the
/// [`prompt!`](crate::prompt!) macro.
pub fn render_prompt<T: Serialize>(template: &str, context: T) -> Result<String, PromptError> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.add_template("prompt", template)?;
    let tmpl = env.get_template("prompt")?;
    Ok(tmpl.render(context)?)
}

/// Creates a prompt string from a template and key-value pairs.
///
/// # Example
///
/// ```
/// use agent_debate::prompt;
///
/// let text = prompt!("Hello {{ name }}, {{ count }} left.", name = "Ada", count = 3).unwrap();
/// assert_eq!(text, "Hello Ada, 3 left.");
/// ```
#[macro_export]
macro_rules! prompt {
    ($template:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::prompt::render_prompt($template, $crate::prompt::minijinja::context!($($key => $value),*))
    };
}
