//! Strip chat boilerplate from generated prompts.

use std::sync::LazyLock;

use regex::Regex;

static LEAD_IN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:Here is the rewritten system prompt:|Here's the updated system prompt:)[ \t]*(?:\r?\n|$)\s*",
    )
    .expect("lead-in pattern")
});

static SIGN_OFF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\s*\n[ \t]*(?:I hope this helps!|Let me know if you need any adjustments!)[^\n]*$",
    )
    .expect("sign-off pattern")
});

static FENCE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[\w+.-]*[ \t]*\r?\n").expect("fence opener pattern"));

static FENCE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n```\s*$").expect("fence closer pattern"));

/// Reduce a generation service reply to the prompt body.
///
/// Rules run once each, in order: lead-in line, sign-off on the last line,
/// opening code fence, closing code fence. The result is trimmed. Text that is
/// already clean comes back unchanged apart from the trim.
pub fn clean(raw: &str) -> String {
    let text = raw.trim();
    let text = LEAD_IN.replace(text, "");
    let text = SIGN_OFF.replace(&text, "");
    let text = FENCE_OPEN.replace(&text, "");
    let text = FENCE_CLOSE.replace(&text, "");
    text.trim().to_string()
}
