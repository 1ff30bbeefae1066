/// Canonical form of a free-text answer: trimmed, lowercased, inner
/// whitespace runs collapsed to a single space.
pub fn normalize(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Length in code points, the unit edit distances are measured in.
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}
