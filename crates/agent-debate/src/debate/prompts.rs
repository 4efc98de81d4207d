//! Messages the debate engine sends to the agents.
//!
//! Each request is a serializable struct rendered through a minijinja
//! template.

use crate::prompt::{PromptError, render_prompt};
use serde::Serialize;

const OPENING_TEMPLATE: &str = r##"{% if instruction %}{{ instruction }}

{% endif %}# Debate

You are one of two independent AI agents working on the same problem. The other agent is answering it separately right now. After this round you will see each other's replies and discuss until you reach a shared conclusion.

## Problem
{{ problem }}

## Rules
- Give your own analysis and your current answer.
- Be concrete. Point out mistakes, including your own.
- Only when you are confident both of you hold the same conclusion, put it on its own line as:
  AGREED: <conclusion>
"##;

const TURN_TEMPLATE: &str = r##"The other agent replied:

---
{{ counterpart_message }}
---

Respond to their points. Keep what is right, challenge what is wrong, and refine your answer.
{% if remaining <= 2 %}Only {{ remaining }} message(s) remain in this debate, so converge if you can.
{% else %}{{ remaining }} messages remain in this debate.
{% endif %}
If you now agree on a conclusion, put it on its own line as:
AGREED: <conclusion>
"##;

const CONFIRMATION_TEMPLATE: &str = r##"The other agent proposes that you both agree on this conclusion:

  {{ conclusion }}

Their full message was:

---
{{ proposer_message }}
---

If you accept this conclusion, reply with a line:
AGREED: <conclusion>
Otherwise explain what you disagree with. Do not write AGREED unless you accept.
"##;

const CRITICAL_REVIEW_TEMPLATE: &str = r##"The other agent proposes that you both agree on this conclusion:

  {{ conclusion }}

Their full message was:

---
{{ proposer_message }}
---

Before accepting, review it critically. Check the reasoning step by step, look for counterexamples and anything left unverified.
Accept only if it survives this review, by replying with a line:
AGREED: <conclusion>
If you find a flaw, describe it and do not write AGREED.
"##;

const EXTENSION_TEMPLATE: &str = r##"[Additional context from the user]
{{ context }}

{{ message }}"##;

/// First message to both agents.
#[derive(Debug, Serialize)]
pub struct OpeningPrompt<'a> {
    pub problem: &'a str,
    pub instruction: Option<&'a str>,
}

impl OpeningPrompt<'_> {
    pub fn render(&self) -> Result<String, PromptError> {
        render_prompt(OPENING_TEMPLATE, self)
    }
}

/// Relays the counterpart's latest message.
#[derive(Debug, Serialize)]
pub struct TurnPrompt<'a> {
    pub counterpart_message: &'a str,
    pub remaining: u32,
}

impl TurnPrompt<'_> {
    pub fn render(&self) -> Result<String, PromptError> {
        render_prompt(TURN_TEMPLATE, self)
    }
}

/// Asks the counterpart to accept or reject a proposed conclusion.
#[derive(Debug, Serialize)]
pub struct ConfirmationPrompt<'a> {
    pub conclusion: &'a str,
    pub proposer_message: &'a str,
    #[serde(skip)]
    pub critical: bool,
}

impl ConfirmationPrompt<'_> {
    pub fn render(&self) -> Result<String, PromptError> {
        let template = if self.critical {
            CRITICAL_REVIEW_TEMPLATE
        } else {
            CONFIRMATION_TEMPLATE
        };
        render_prompt(template, self)
    }
}

/// Prepends extension context to an outgoing message.
pub fn with_extension_context(context: &str, message: &str) -> Result<String, PromptError> {
    crate::prompt!(EXTENSION_TEMPLATE, context = context, message = message)
}
