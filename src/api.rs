use crate::engine::{self, AlternateAnswerCatalog, CatalogOptions, ClosestMatch, HintState};
use crate::{AnswerPattern, CatalogError};
use std::time::Duration;

pub use crate::engine::apply_hint;
pub use crate::pattern::{expand, validate, validate_with};

/// Options that affect closest-match scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchOptions {
    /// Compare words case-sensitively.
    pub case_sensitive: bool,
    pub weights: MatchWeights,
}

/// Cost of each kind of word error in the closest-match distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchWeights {
    pub wrong: u32,
    pub misplaced: u32,
    pub missing: u32,
}

impl Default for MatchWeights {
    fn default() -> Self {
        MatchWeights { wrong: 2, misplaced: 1, missing: 1 }
    }
}

/// A compact per-candidate summary used in verbose results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSummary {
    pub rank: usize,
    pub order: usize,
    pub text: String,
    pub distance: u32,
    pub wrong: usize,
    pub misplaced: usize,
    pub missing: usize,
}

/// Additional details returned by [`closest_verbose_with`].
///
/// Meant for debugging scores and timing, not for display to students.
#[derive(Debug, Clone)]
pub struct MatchDetails {
    /// Total elapsed time.
    pub total: Duration,
    /// Time spent scoring every candidate.
    pub scoring: Duration,
    /// Time spent on the hint splice and re-score.
    pub rescoring: Duration,
    pub candidates_scored: usize,
    /// Every candidate, best first (distance, then rank and order).
    pub ranking: Vec<CandidateSummary>,
    /// The response actually scored, when a hint was spliced in.
    pub effective_response: Option<String>,
}

/// Result from [`closest_verbose_with`].
#[derive(Debug, Clone)]
pub struct ClosestMatchVerbose {
    pub result: ClosestMatch,
    pub elapsed: Duration,
    pub details: MatchDetails,
}

/// Build the alternate-answer catalog with the default expansion ceiling.
pub fn build_catalog(patterns: &[AnswerPattern]) -> Result<AlternateAnswerCatalog, CatalogError> {
    AlternateAnswerCatalog::build_with(patterns, &CatalogOptions::default())
}

/// Closest answer to `response`, with default [`MatchOptions`].
///
/// # Example
/// ```
/// use regrade::{AnswerPattern, ErrorCode, Fraction, HintState, build_catalog, closest};
///
/// let catalog = build_catalog(&[
///     AnswerPattern::new("gray", Fraction::FULL),
///     AnswerPattern::new("gr(a|e)y", Fraction::FULL),
/// ])
/// .unwrap();
/// let result = closest("grey", &catalog, &HintState::none());
/// assert!(result.is_complete());
/// assert_eq!(result.error_code, ErrorCode::None);
/// ```
pub fn closest(response: &str, catalog: &AlternateAnswerCatalog, hint: &HintState) -> ClosestMatch {
    closest_with(response, catalog, hint, &MatchOptions::default())
}

/// Closest answer to `response`, re-scored after any bought hint.
///
/// Never fails: a response unrelated to every answer still gets a result.
pub fn closest_with(
    response: &str,
    catalog: &AlternateAnswerCatalog,
    hint: &HintState,
    options: &MatchOptions,
) -> ClosestMatch {
    engine::run(response, catalog, hint, options, false).result
}

/// Like [`closest_with`], also returning timing and the full candidate ranking.
///
/// The default path does not allocate the ranking.
pub fn closest_verbose_with(
    response: &str,
    catalog: &AlternateAnswerCatalog,
    hint: &HintState,
    options: &MatchOptions,
) -> ClosestMatchVerbose {
    let run = engine::run(response, catalog, hint, options, true);

    let mut ranking: Vec<CandidateSummary> = run
        .metrics
        .ranking
        .into_iter()
        .map(|scored| CandidateSummary {
            rank: scored.rank,
            order: scored.order,
            text: scored.text,
            distance: scored.distance,
            wrong: scored.wrong,
            misplaced: scored.misplaced,
            missing: scored.missing,
        })
        .collect();
    ranking.sort_by_key(|c| (c.distance, c.rank, c.order));

    let details = MatchDetails {
        total: run.metrics.total,
        scoring: run.metrics.scoring,
        rescoring: run.metrics.rescoring,
        candidates_scored: run.metrics.candidates_scored,
        ranking,
        effective_response: run.effective_response,
    };

    ClosestMatchVerbose { result: run.result, elapsed: run.metrics.total, details }
}
