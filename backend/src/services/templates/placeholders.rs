use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Matches `{{name}}`; the name is any run of characters without `}`.
pub(crate) static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("placeholder pattern is valid"));

/// Distinct placeholder names of `text`, in order of first occurrence.
pub fn extract_placeholders(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    PLACEHOLDER_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let name = &caps[1];
            seen.insert(name.to_string()).then(|| name.to_string())
        })
        .collect()
}
