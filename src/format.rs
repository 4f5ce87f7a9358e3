//! Canonical rendering of ranked entries.

/// Render ranked `(age, count)` pairs as `"<position>:<age>=<count>"`.
///
/// Position is 1-based and derived purely from the entry's index in the
/// already-sorted input, so repeated calls can never drift.
#[must_use]
pub fn format_ranked(entries: &[(i64, u64)]) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .map(|(i, &(age, count))| format!("{}:{age}={count}", i + 1))
        .collect()
}
