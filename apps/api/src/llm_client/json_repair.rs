//! Tolerant repair of truncated JSON.
//!
//! Models that hit their token budget stop mid-document. The rules below patch
//! the common shapes of that damage (an unterminated string, a dangling comma,
//! unclosed containers) and re-validate. Repair never fails: text that cannot
//! be fixed is handed back untouched so the caller's own parse reports it.

use std::borrow::Cow;

use tracing::warn;

/// A named recovery step applied during repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairRule {
    /// An object value was cut inside its string: the whole key/value pair goes.
    DropIncompletePair,
    /// A string started right after a separator was cut: the element goes.
    DropIncompleteElement,
    /// A string was cut mid-value: the quote is closed.
    CloseDanglingQuote,
    StripTrailingComma,
    /// Unclosed `[` then `{` are closed, arrays first.
    CloseOpenContainers,
    StripCommaBeforeCloser,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RepairOutcome {
    /// Does not start with `{` or `[`; not our business.
    NotJson,
    AlreadyValid,
    Repaired {
        text: String,
        rules: Vec<RepairRule>,
    },
    /// Rules ran but the result still does not parse.
    Unrepairable,
}

/// Returns repaired JSON when the heuristics succeed, otherwise the input.
pub fn repair_json(text: &str) -> Cow<'_, str> {
    match diagnose(text) {
        RepairOutcome::Repaired {
            text: repaired,
            rules,
        } => {
            warn!(
                original_len = text.len(),
                repaired_len = repaired.len(),
                ?rules,
                "Repaired truncated JSON from LLM"
            );
            Cow::Owned(repaired)
        }
        RepairOutcome::Unrepairable => {
            let tail: String = text
                .chars()
                .rev()
                .take(200)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            warn!(text_tail = %tail, "LLM JSON could not be repaired");
            Cow::Borrowed(text)
        }
        RepairOutcome::NotJson | RepairOutcome::AlreadyValid => Cow::Borrowed(text),
    }
}

/// Runs the repair rules and reports what happened.
pub fn diagnose(text: &str) -> RepairOutcome {
    match text.trim_start().chars().next() {
        Some('{') | Some('[') => {}
        _ => return RepairOutcome::NotJson,
    }

    if is_valid_json(text) {
        return RepairOutcome::AlreadyValid;
    }

    let mut rules = Vec::new();
    let mut repaired = text.trim_end().to_string();

    if let Some(rule) = resolve_dangling_quote(&mut repaired) {
        rules.push(rule);
    }
    if strip_trailing_comma(&mut repaired) {
        rules.push(RepairRule::StripTrailingComma);
    }
    if close_open_containers(&mut repaired) {
        rules.push(RepairRule::CloseOpenContainers);
    }
    if strip_commas_before_closers(&mut repaired) {
        rules.push(RepairRule::StripCommaBeforeCloser);
    }

    if is_valid_json(&repaired) {
        RepairOutcome::Repaired {
            text: repaired,
            rules,
        }
    } else {
        RepairOutcome::Unrepairable
    }
}

fn is_valid_json(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text).is_ok()
}

/// Byte offsets of every quote not escaped by a backslash.
fn unescaped_quotes(text: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        match ch {
            '\\' => escaped = !escaped,
            '"' if !escaped => positions.push(idx),
            _ => escaped = false,
        }
        if ch == '"' {
            escaped = false;
        }
    }
    positions
}

fn resolve_dangling_quote(repaired: &mut String) -> Option<RepairRule> {
    let quotes = unescaped_quotes(repaired);
    if quotes.len() % 2 == 0 {
        return None;
    }

    let last_quote = *quotes.last()?;
    let before = repaired[..last_quote].trim_end();

    if before.ends_with(':') {
        // quotes: [.., key_open, key_close, value_open]
        let kept = if quotes.len() >= 3 {
            let key_open = quotes[quotes.len() - 3];
            trim_separators(&repaired[..key_open])
        } else {
            trim_separators(before.trim_end_matches(':'))
        };
        *repaired = kept;
        Some(RepairRule::DropIncompletePair)
    } else if before.ends_with(',') {
        *repaired = trim_separators(before);
        Some(RepairRule::DropIncompleteElement)
    } else {
        let trailing_backslashes = repaired.chars().rev().take_while(|c| *c == '\\').count();
        if trailing_backslashes % 2 == 1 {
            repaired.pop();
        }
        repaired.push('"');
        Some(RepairRule::CloseDanglingQuote)
    }
}

fn trim_separators(text: &str) -> String {
    text.trim_end()
        .trim_end_matches(',')
        .trim_end()
        .to_string()
}

fn strip_trailing_comma(repaired: &mut String) -> bool {
    let len = repaired.trim_end().len();
    if repaired[..len].ends_with(',') {
        repaired.truncate(len - 1);
        true
    } else {
        false
    }
}

/// Counts `{` and `[` left open outside of string literals.
fn unclosed_counts(text: &str) -> (usize, usize) {
    let mut braces: i64 = 0;
    let mut brackets: i64 = 0;
    let mut in_string = false;
    let mut escaped = false;

    for ch in text.chars() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => braces += 1,
            '}' => braces -= 1,
            '[' => brackets += 1,
            ']' => brackets -= 1,
            _ => {}
        }
    }

    (braces.max(0) as usize, brackets.max(0) as usize)
}

fn close_open_containers(repaired: &mut String) -> bool {
    let (braces, brackets) = unclosed_counts(repaired);
    if braces == 0 && brackets == 0 {
        return false;
    }
    repaired.extend(std::iter::repeat(']').take(brackets));
    repaired.extend(std::iter::repeat('}').take(braces));
    true
}

fn strip_commas_before_closers(repaired: &mut String) -> bool {
    let mut out = String::with_capacity(repaired.len());
    let mut changed = false;
    let mut in_string = false;
    let mut escaped = false;
    let mut skip_until = 0;

    for (idx, ch) in repaired.char_indices() {
        if idx < skip_until {
            continue;
        }
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            out.push(ch);
            continue;
        }
        if ch == ',' {
            let rest = &repaired[idx + 1..];
            let next = rest.trim_start();
            if next.starts_with('}') || next.starts_with(']') {
                skip_until = idx + 1 + (rest.len() - next.len());
                changed = true;
                continue;
            }
        }
        if ch == '"' {
            in_string = true;
        }
        out.push(ch);
    }

    if changed {
        *repaired = out;
    }
    changed
}
