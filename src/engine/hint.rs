//! Hint purchases ("buy next letter/word").
//!
//! The host tracks how many units a student bought since their response was
//! last scored. Before re-scoring, the response is replaced by its correct
//! beginning plus that many further units of the matched answer:
//!
//! ```text
//! matched:  "the quick brown fox"
//! response: "the quikc"           corrected prefix "the"
//! 2 words   -> "the quick brown"
//! 3 letters -> "the qui"
//! ```
//!
//! The wrong tail of the response is dropped, so every purchase builds on the
//! correct part instead of starting over. A last word the student is still
//! typing ("the qu") is kept, and letters continue after it.

use super::closest::{ClosestMatch, CompletionStatus, MarkKind};
use super::words::unit_ends;
use serde::Deserialize;

/// Whether hints are on, and whether they cost anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintMode {
    #[default]
    None,
    Adaptive,
    AdaptiveNoPenalty,
}

/// What one purchase reveals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintUnit {
    Letter,
    #[default]
    Word,
    /// Words and punctuation marks are revealed separately.
    WordOrPunctuation,
}

/// Hint purchases for the current step of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HintState {
    /// Units bought since the response was last scored.
    pub revealed: usize,
    pub mode: HintMode,
    pub unit: HintUnit,
}

impl HintState {
    /// No hints bought.
    pub fn none() -> Self {
        HintState::default()
    }

    pub fn new(revealed: usize, mode: HintMode, unit: HintUnit) -> Self {
        HintState { revealed, mode, unit }
    }

    /// True when there is something to splice into the response.
    pub fn is_active(&self) -> bool {
        self.mode != HintMode::None && self.revealed > 0
    }

    /// Grade penalty for the purchases, `per_unit` being the question's
    /// penalty for one incorrect try.
    pub fn penalty(&self, per_unit: f64) -> f64 {
        match self.mode {
            HintMode::Adaptive => self.revealed as f64 * per_unit,
            HintMode::None | HintMode::AdaptiveNoPenalty => 0.0,
        }
    }
}

/// The response to score once `hint` is taken into account.
///
/// Pure: the same `(result, hint)` always yields the same string.
pub fn apply_hint(result: &ClosestMatch, hint: &HintState) -> String {
    if !hint.is_active() {
        return result.response.clone();
    }
    if result.completion == CompletionStatus::Complete {
        return result.matched_answer.clone();
    }

    let rest = [result.highlighted_fix.as_str(), result.remaining_suffix.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    // A half-typed last word counts as already revealed.
    let typed = match result.marks.last() {
        Some(mark) if mark.kind == MarkKind::Incomplete => result
            .highlighted_fix
            .char_indices()
            .nth(mark.word.chars().count())
            .map_or(result.highlighted_fix.len(), |(idx, _)| idx),
        _ => 0,
    };

    let ends = unit_ends(&rest, hint.unit);
    let revealed = match ends.iter().filter(|&&end| end > typed).nth(hint.revealed - 1) {
        Some(&end) => &rest[..end],
        None => rest.as_str(),
    };

    let effective = [result.corrected_prefix.as_str(), revealed]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    tracing::debug!(revealed = hint.revealed, unit = ?hint.unit, effective = %effective, "applied hint");
    effective
}
