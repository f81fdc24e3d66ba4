use once_cell::sync::Lazy;
use regex::Regex;

static FENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n(.*?)```").unwrap()
});

static SQL_MARKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[/?SQL\]").unwrap()
});

/// pull the statement out of raw model output
///
/// strips a markdown fence and the `[SQL]` / `[/SQL]` markers the prompt
/// template invites; anything after a closing `[/SQL]` is dropped.
pub fn extract_statement(raw: &str) -> String {
    let text = raw.trim();

    let text = match FENCE_REGEX.captures(text) {
        Some(captures) => captures.get(1).map(|m| m.as_str()).unwrap_or(text),
        None => text,
    };

    let text = match text.to_ascii_uppercase().find("[/SQL]") {
        Some(end) => &text[..end],
        None => text,
    };

    SQL_MARKER_REGEX.replace_all(text, "").trim().to_string()
}
