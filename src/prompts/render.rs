//! `{placeholder}` substitution for instruction templates.
//!
//! Placeholders are lowercase identifiers in braces (`{target_language}`).
//! Anything else in braces (JSON snippets, code) is left untouched.
//! Substitution is single-pass: substituted values are never re-scanned.

use std::collections::HashMap;

/// If `rest` starts with a well-formed placeholder, return its name.
fn placeholder_at(rest: &str) -> Option<&str> {
    let inner = rest.strip_prefix('{')?;
    let close = inner.find('}')?;
    let name = &inner[..close];
    let valid = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    valid.then_some(name)
}

/// Placeholder names in order of first appearance, without duplicates.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    let mut rest = template;
    while let Some(pos) = rest.find('{') {
        let tail = &rest[pos..];
        match placeholder_at(tail) {
            Some(name) => {
                if !names.contains(&name) {
                    names.push(name);
                }
                rest = &tail[name.len() + 2..];
            }
            None => rest = &tail[1..],
        }
    }
    names
}

/// Replace every known placeholder with its value. Unknown placeholders
/// stay in the output verbatim.
pub fn render(template: &str, values: &HashMap<&str, &str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match placeholder_at(tail).and_then(|name| values.get(name).map(|v| (name, *v))) {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len() + 2..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
