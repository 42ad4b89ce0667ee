//! Closest-match run metrics.
//!
//! `closest_with` only needs the [`ClosestMatch`]; `closest_verbose_with`
//! also wants to know how long scoring took and how every candidate fared.
//! Both go through the same `closest::run`, which fills these structs.
//!
//! The per-candidate ranking is opt-in: it allocates one entry per literal
//! answer, which can be thousands for a heavily expanded question.

use super::closest::{ClosestMatch, WordScore};
use super::catalog::Candidate;
use std::time::Duration;

#[derive(Debug, Default, Clone)]
pub struct MatchMetrics {
    /// Total elapsed time for the run, hint re-scoring included.
    pub total: Duration,
    /// Time spent scoring the response against every candidate.
    pub scoring: Duration,
    /// Time spent splicing a hint in and re-scoring (zero without a hint).
    pub rescoring: Duration,
    pub candidates_scored: usize,
    /// One entry per candidate, in catalog order. Empty unless collected.
    pub ranking: Vec<ScoredCandidate>,
}

/// How one candidate scored against the (un-hinted) response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredCandidate {
    pub rank: usize,
    pub order: usize,
    pub text: String,
    pub distance: u32,
    pub wrong: usize,
    pub misplaced: usize,
    pub missing: usize,
}

impl ScoredCandidate {
    pub(crate) fn new(candidate: &Candidate<'_>, score: &WordScore) -> Self {
        ScoredCandidate {
            rank: candidate.rank,
            order: candidate.order,
            text: candidate.answer.text.clone(),
            distance: score.distance,
            wrong: score.wrong,
            misplaced: score.misplaced,
            missing: score.missing,
        }
    }
}

/// Engine output bundled with timing information.
#[derive(Debug, Clone)]
pub struct MatchRun {
    pub result: ClosestMatch,
    /// Response after the hint splice, when a hint was active.
    pub effective_response: Option<String>,
    pub metrics: MatchMetrics,
}
