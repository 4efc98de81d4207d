//! Detection and extraction of agreement proposals.
//!
//! An agent proposes a conclusion by starting a line with `AGREED:`. The
//! keyword may carry Markdown emphasis (`**AGREED:**`, `__AGREED__:`) and
//! leading whitespace; it is matched case-insensitively.

use regex::Regex;
use std::sync::LazyLock;

static AGREEMENT_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*[*_]{0,2}AGREED[*_]{0,2}[ \t]*:(?P<rest>.*)$")
        .expect("agreement marker pattern is valid")
});

/// Whether `text` contains an agreement marker at the start of any line.
pub fn has_agreement_marker(text: &str) -> bool {
    AGREEMENT_MARKER.is_match(text)
}

/// Pulls the conclusion out of the first agreement marker in `text`.
///
/// The conclusion is the rest of the marker line with surrounding
/// whitespace and emphasis stripped. When that is empty, the next
/// non-empty line is used instead. Returns `None` when there is no marker.
///
/// ```
/// use agent_debate::debate::agreement::extract_conclusion;
///
/// assert_eq!(extract_conclusion("**AGREED:** 42").as_deref(), Some("42"));
/// assert_eq!(extract_conclusion("no marker here"), None);
/// ```
pub fn extract_conclusion(text: &str) -> Option<String> {
    let captures = AGREEMENT_MARKER.captures(text)?;
    let marker = captures.get(0)?;
    let rest = captures.name("rest").map(|m| m.as_str()).unwrap_or_default();

    let conclusion = strip_emphasis(rest);
    if !conclusion.is_empty() {
        return Some(conclusion.to_string());
    }

    let following = text[marker.end()..]
        .lines()
        .map(strip_emphasis)
        .find(|line| !line.is_empty())
        .unwrap_or_default();

    Some(following.to_string())
}

/// Trims whitespace and `*`/`_` emphasis from both ends until stable.
fn strip_emphasis(text: &str) -> &str {
    let mut current = text;
    loop {
        let next = current.trim().trim_matches(|c: char| c == '*' || c == '_');
        if next.len() == current.len() {
            return next;
        }
        current = next;
    }
}
