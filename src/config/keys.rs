//! API key discovery.
//!
//! Keys are collected from configuration entries named after a base name
//! plus numbered variants (`GROQ_API_KEY`, `GROQ_API_KEY_0`, `GROQ_API_KEY_1`,
//! ...). Discovery is a pure function over an injected `(name, value)`
//! iterator; only [`discover_from_env`] touches the process environment.

/// Collect keys from entries matching `base` or `base_<n>`, sorted
/// lexicographically by entry name so rotation order is reproducible.
pub fn discover_keys<I, N, V>(vars: I, base: &str) -> Vec<String>
where
    I: IntoIterator<Item = (N, V)>,
    N: AsRef<str>,
    V: AsRef<str>,
{
    let mut matched: Vec<(String, String)> = vars
        .into_iter()
        .filter(|(name, _)| is_key_entry(name.as_ref(), base))
        .map(|(name, value)| (name.as_ref().to_string(), value.as_ref().to_string()))
        .collect();

    matched.sort_by(|a, b| a.0.cmp(&b.0));

    sanitize_keys(matched.into_iter().map(|(_, value)| value))
}

/// Collect keys from the process environment. Composition-edge only;
/// everything below this reads injected values.
pub fn discover_from_env(base: &str) -> Vec<String> {
    discover_keys(std::env::vars(), base)
}

/// Trim whitespace and incidental quoting, drop blanks, and deduplicate by
/// exact value. First occurrence wins, so discovery order is preserved.
pub fn sanitize_keys<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut keys: Vec<String> = Vec::new();

    for value in values {
        let clean = value.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        if !clean.is_empty() && !keys.iter().any(|k| k == clean) {
            keys.push(clean.to_string());
        }
    }

    keys
}

fn is_key_entry(name: &str, base: &str) -> bool {
    if name == base {
        return true;
    }
    match name.strip_prefix(base).and_then(|rest| rest.strip_prefix('_')) {
        Some(suffix) => !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}
