//! `{{variable}}` placeholder handling for prompt templates.
//!
//! A placeholder is the shortest run of characters between `{{` and `}}`,
//! with surrounding whitespace ignored. Single braces and unterminated
//! `{{` never match. Nested braces are not special: in `{{ {{x}} }}` the
//! first `}}` closes the match, so the captured name is `{{x`.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::{Captures, Regex};

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*([\s\S]+?)\s*\}\}").expect("placeholder pattern must compile")
    })
}

/// Unique variable names in first-occurrence order.
pub fn extract_variables(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for caps in placeholder().captures_iter(content) {
        let name = caps.get(1).map_or("", |m| m.as_str()).trim();
        if name.is_empty() {
            continue;
        }
        if seen.insert(name) {
            names.push(name.to_string());
        }
    }

    names
}

/// Substitute every placeholder whose trimmed name is a key of `values`.
///
/// Placeholders without a value are left exactly as written, inner
/// whitespace included. An empty string is a value like any other.
pub fn resolve_prompt(content: &str, values: &HashMap<String, String>) -> String {
    placeholder()
        .replace_all(content, |caps: &Captures<'_>| {
            let name = caps.get(1).map_or("", |m| m.as_str()).trim();
            match values.get(name) {
                Some(value) if !name.is_empty() => value.clone(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Names from `content` that have no entry in `values`, in template order.
pub fn unresolved_variables(content: &str, values: &HashMap<String, String>) -> Vec<String> {
    extract_variables(content)
        .into_iter()
        .filter(|name| !values.contains_key(name))
        .collect()
}
