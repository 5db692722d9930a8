//! Splitting of raw comma-separated option strings.

/// Splits a comma-separated option string into its non-empty tokens.
///
/// Order is preserved and no whitespace is trimmed; only tokens that are
/// entirely empty are dropped, so `""` yields no tokens at all and `"a,,b,"`
/// yields `["a", "b"]`.
pub fn split_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
