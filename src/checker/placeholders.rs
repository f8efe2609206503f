//! Placeholder token extraction.

use regex_lite::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("placeholder pattern is valid"));

/// Extract placeholder names from prompt text.
///
/// Names keep their case and the order of first appearance; duplicates are
/// dropped and the delimiting braces are not part of the name.
pub fn extract_placeholders(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER_RE.captures_iter(text) {
        if let Some(name) = caps.get(1) {
            let name = name.as_str();
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// Byte ranges of every `{{name}}` token, braces included.
pub fn placeholder_spans(text: &str) -> Vec<Range<usize>> {
    PLACEHOLDER_RE.find_iter(text).map(|m| m.range()).collect()
}

/// Render a placeholder token for `name`.
pub fn placeholder_token(name: &str) -> String {
    format!("{{{{{}}}}}", name)
}
