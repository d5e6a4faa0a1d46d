//! Prompt suggestions embedded in creative-assistant replies.
//!
//! The assistant is instructed to answer with a `[PROMPT: <text>]` tag. The
//! tagged text becomes the studio's working prompt; the tag itself is
//! hidden from the displayed reply.

use std::sync::LazyLock;

use regex::Regex;

/// Case-insensitive, non-greedy `[PROMPT: ...]` tag.
pub const PROMPT_TAG_PATTERN: &str = r"(?i)\[PROMPT:\s*(.*?)\]";

static PROMPT_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PROMPT_TAG_PATTERN).expect("valid regex"));

/// Return the text of the first prompt tag in `reply`, if any.
///
/// An empty tag (`[PROMPT: ]`) yields `None`.
pub fn extract_prompt_suggestion(reply: &str) -> Option<String> {
    let caps = PROMPT_TAG_RE.captures(reply)?;
    let text = caps.get(1)?.as_str().trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Remove every prompt tag from `reply` for display.
pub fn strip_prompt_tags(reply: &str) -> String {
    PROMPT_TAG_RE.replace_all(reply, "").trim().to_string()
}
