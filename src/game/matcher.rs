//! Input matching against several active targets

use super::session::{Target, TargetId};

/// Classification of the input buffer against the active targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// Input equals a target's text
    Exact(TargetId),
    /// Input is a prefix of a target's text
    Partial(TargetId),
    /// Input matches nothing
    Miss,
    /// Nothing typed
    Empty,
}

/// Maps an input buffer to a target
pub struct InputMatcher;

impl InputMatcher {
    /// Classify `input` against `targets` (in spawn order).
    ///
    /// Comparison is case-insensitive on the trimmed input. An exact match
    /// wins over any prefix match; the first exact match in spawn order wins
    /// among duplicates. Among prefix matches the leftmost target wins, ties
    /// going to the earliest spawned.
    pub fn classify(input: &str, targets: &[Target]) -> MatchResult {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return MatchResult::Empty;
        }

        if let Some(target) = targets
            .iter()
            .find(|t| t.text.to_lowercase() == needle)
        {
            return MatchResult::Exact(target.id);
        }

        targets
            .iter()
            .filter(|t| t.text.to_lowercase().starts_with(&needle))
            .min_by(|a, b| a.x.total_cmp(&b.x))
            .map(|t| MatchResult::Partial(t.id))
            .unwrap_or(MatchResult::Miss)
    }
}
