//! Token normalization.

/// Remove every space character from each string, collapsing multi-word
/// names such as "Tom Hanks" into a single token.
pub fn strip_inner_spaces<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.as_ref().chars().filter(|c| *c != ' ').collect())
        .collect()
}

/// Lowercase every token; tokens stay distinct.
pub fn to_lowercase<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items.iter().map(|s| s.as_ref().to_lowercase()).collect()
}
