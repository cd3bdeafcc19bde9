//! Cleanup of raw model output before anyone tries to parse it.

const THINK_OPEN: &str = "<think>";
const THINK_CLOSE: &str = "</think>";
const FENCE: &str = "```";

/// Removes `<think>…</think>` reasoning blocks.
///
/// Some reasoning models emit their chain of thought without the opening
/// tag; a dangling `</think>` therefore drops everything before it too.
pub fn strip_reasoning(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(THINK_OPEN) {
        let body_start = start + THINK_OPEN.len();
        match rest[body_start..].find(THINK_CLOSE) {
            Some(rel_end) => {
                out.push_str(&rest[..start]);
                rest = &rest[body_start + rel_end + THINK_CLOSE.len()..];
            }
            // Unterminated opener: nothing to pair it with.
            None => break,
        }
    }
    out.push_str(rest);

    match out.find(THINK_CLOSE) {
        Some(idx) => out[idx + THINK_CLOSE.len()..].trim().to_string(),
        None => out.trim().to_string(),
    }
}

/// Unwraps a single outer ```lang … ``` fence when it encloses the whole text.
pub fn strip_markdown_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix(FENCE) else {
        return text;
    };
    let Some(body) = body.strip_suffix(FENCE) else {
        return text;
    };

    let body = body.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let body = body.strip_prefix('\n').unwrap_or(body);
    body.trim()
}
