//! Closest-match search and word-level diff.
//!
//! For every literal alternate answer the response is scored word by word:
//!
//! ```text
//! candidate: the quick brown fox
//! response:  the quikc brown fox
//!            ───       ───── ───   aligned (longest common subsequence)
//!                quikc             unaligned, not among the candidate's
//!                                  unaligned words -> Wrong
//! ```
//!
//! - Aligned words are in place.
//! - An unaligned response word that is one of the candidate's unaligned words
//!   is *misplaced* (right word, wrong slot).
//! - Any other unaligned response word is *wrong*.
//! - Candidate words nobody accounted for are *missing*.
//! - A last response word that is the start of the expected word (after an
//!   exact prefix) is *incomplete*: the student is still typing, so it only
//!   counts as missing.
//!
//! `distance = wrong·w_wrong + misplaced·w_misplaced + missing·w_missing`. The
//! lowest distance wins; ties keep the earliest candidate in (rank, expansion
//! order).

use super::catalog::{AlternateAnswerCatalog, Candidate, RankEntry};
use super::hint::{HintState, apply_hint};
use super::metrics::{MatchMetrics, MatchRun, ScoredCandidate};
use super::words::{fold, normalize_whitespace, words};
use crate::{ExpandedAnswer, Fraction, MatchOptions};
use std::borrow::Cow;
use std::collections::HashMap;
use std::time::Instant;

bitflags::bitflags! {
    /// The two independent error kinds a response can show.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ErrorFlags: u8 {
        const MISPLACED = 1 << 0;
        const WRONG     = 1 << 1;
    }
}

/// Error classification of a response against its closest answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorCode {
    #[default]
    None,
    Misplaced,
    Wrong,
    Both,
}

impl ErrorCode {
    /// Decimal code used by existing feedback lookups: 0, 1, 10 or 11.
    pub fn legacy(self) -> u8 {
        match self {
            ErrorCode::None => 0,
            ErrorCode::Misplaced => 1,
            ErrorCode::Wrong => 10,
            ErrorCode::Both => 11,
        }
    }

    pub fn from_legacy(code: u8) -> Option<Self> {
        match code {
            0 => Some(ErrorCode::None),
            1 => Some(ErrorCode::Misplaced),
            10 => Some(ErrorCode::Wrong),
            11 => Some(ErrorCode::Both),
            _ => None,
        }
    }

    pub fn flags(self) -> ErrorFlags {
        match self {
            ErrorCode::None => ErrorFlags::empty(),
            ErrorCode::Misplaced => ErrorFlags::MISPLACED,
            ErrorCode::Wrong => ErrorFlags::WRONG,
            ErrorCode::Both => ErrorFlags::all(),
        }
    }

    pub fn has_misplaced(self) -> bool {
        self.flags().contains(ErrorFlags::MISPLACED)
    }

    pub fn has_wrong(self) -> bool {
        self.flags().contains(ErrorFlags::WRONG)
    }
}

impl From<ErrorFlags> for ErrorCode {
    fn from(flags: ErrorFlags) -> Self {
        match (flags.contains(ErrorFlags::MISPLACED), flags.contains(ErrorFlags::WRONG)) {
            (false, false) => ErrorCode::None,
            (true, false) => ErrorCode::Misplaced,
            (false, true) => ErrorCode::Wrong,
            (true, true) => ErrorCode::Both,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionStatus {
    /// Every word slot of the matched answer is filled correctly.
    Complete,
    Partial,
}

/// Verdict on one response word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkKind {
    Correct,
    Misplaced,
    Wrong,
    /// Beginning of the expected word, still being typed.
    Incomplete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordMark {
    pub word: String,
    pub kind: MarkKind,
}

/// The closest alternate answer to a response and how the two differ.
///
/// `corrected_prefix`, `highlighted_fix` and `remaining_suffix` split
/// `matched_answer` on word boundaries: what the student already has right,
/// the next word to fix, and everything after it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosestMatch {
    /// The normalized response that was scored (after any hint splice).
    pub response: String,
    pub matched_answer: String,
    /// 1-based rank of the matched answer in the catalog (0 if none).
    pub rank: usize,
    /// Position of the matched answer within its rank.
    pub order: usize,
    pub fraction: Fraction,
    pub corrected_prefix: String,
    pub highlighted_fix: String,
    pub remaining_suffix: String,
    pub completion: CompletionStatus,
    pub error_code: ErrorCode,
    /// One mark per response word, in response order.
    pub marks: Vec<WordMark>,
    pub distance: u32,
}

impl ClosestMatch {
    pub fn is_complete(&self) -> bool {
        self.completion == CompletionStatus::Complete
    }

    /// Response words flagged with `kind`.
    pub fn words_marked(&self, kind: MarkKind) -> impl Iterator<Item = &str> {
        self.marks.iter().filter(move |m| m.kind == kind).map(|m| m.word.as_str())
    }
}

// --- Scoring ----------------------------------------------------------------

/// Word-level comparison of one response against one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WordScore {
    pub distance: u32,
    pub wrong: usize,
    pub misplaced: usize,
    pub missing: usize,
    /// Leading slots where response and candidate agree.
    pub prefix: usize,
    pub complete: bool,
    pub marks: Vec<WordMark>,
}

impl WordScore {
    fn flags(&self) -> ErrorFlags {
        let mut flags = ErrorFlags::empty();
        flags.set(ErrorFlags::MISPLACED, self.misplaced > 0);
        flags.set(ErrorFlags::WRONG, self.wrong > 0);
        flags
    }
}

pub(crate) fn score_words(response: &[&str], candidate: &[&str], options: &MatchOptions) -> WordScore {
    let n = response.len();
    let m = candidate.len();
    let r: Vec<Cow<'_, str>> = response.iter().map(|w| fold(w, options.case_sensitive)).collect();
    let c: Vec<Cow<'_, str>> = candidate.iter().map(|w| fold(w, options.case_sensitive)).collect();

    // lcs[i][j] = LCS length of r[i..] and c[j..].
    let mut lcs = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if r[i] == c[j] { lcs[i + 1][j + 1] + 1 } else { lcs[i + 1][j].max(lcs[i][j + 1]) };
        }
    }

    let mut r_aligned = vec![false; n];
    let mut c_aligned = vec![false; m];
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if r[i] == c[j] {
            r_aligned[i] = true;
            c_aligned[j] = true;
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }

    let prefix = r.iter().zip(c.iter()).take_while(|(a, b)| a == b).count();
    let incomplete = n > 0
        && prefix == n - 1
        && n - 1 < m
        && !r_aligned[n - 1]
        && c[n - 1].starts_with(r[n - 1].as_ref());

    let mut pool: HashMap<&str, usize> = HashMap::new();
    for (idx, word) in c.iter().enumerate() {
        if !c_aligned[idx] {
            *pool.entry(word.as_ref()).or_default() += 1;
        }
    }

    let (mut wrong, mut misplaced) = (0usize, 0usize);
    let mut marks = Vec::with_capacity(n);
    for idx in 0..n {
        let kind = if r_aligned[idx] {
            MarkKind::Correct
        } else if incomplete && idx == n - 1 {
            MarkKind::Incomplete
        } else if let Some(left) = pool.get_mut(r[idx].as_ref()).filter(|left| **left > 0) {
            *left -= 1;
            misplaced += 1;
            MarkKind::Misplaced
        } else {
            wrong += 1;
            MarkKind::Wrong
        };
        marks.push(WordMark { word: response[idx].to_string(), kind });
    }
    let missing: usize = pool.values().sum();

    let weights = options.weights;
    let distance = (wrong as u32)
        .saturating_mul(weights.wrong)
        .saturating_add((misplaced as u32).saturating_mul(weights.misplaced))
        .saturating_add((missing as u32).saturating_mul(weights.missing));

    WordScore { distance, wrong, misplaced, missing, prefix, complete: wrong + misplaced + missing == 0, marks }
}

fn build_result(response: String, candidate: &Candidate<'_>, score: WordScore) -> ClosestMatch {
    let answer_words = words(&candidate.answer.text);
    let split = if score.complete { answer_words.len() } else { score.prefix.min(answer_words.len()) };

    let corrected_prefix = answer_words[..split].join(" ");
    let highlighted_fix = answer_words.get(split).map(|w| w.to_string()).unwrap_or_default();
    let remaining_suffix = answer_words.get(split + 1..).map(|rest| rest.join(" ")).unwrap_or_default();

    ClosestMatch {
        response,
        matched_answer: candidate.answer.text.clone(),
        rank: candidate.rank,
        order: candidate.order,
        fraction: candidate.answer.fraction,
        corrected_prefix,
        highlighted_fix,
        remaining_suffix,
        completion: if score.complete { CompletionStatus::Complete } else { CompletionStatus::Partial },
        error_code: ErrorCode::from(score.flags()),
        distance: score.distance,
        marks: score.marks,
    }
}

// --- Search -----------------------------------------------------------------

/// Find the closest answer, splice in any bought hint, and re-score.
///
/// With `collect` set, every candidate's score is kept for reporting.
///
/// ```text
/// normalize ──▶ score every candidate ──▶ best (distance, rank, order)
///                                              │
///                       hint active? ──────────┤ no ─▶ result
///                                              │ yes
///                 apply_hint ──▶ re-score against the same candidate ─▶ result
/// ```
pub(crate) fn run(
    response: &str,
    catalog: &AlternateAnswerCatalog,
    hint: &HintState,
    options: &MatchOptions,
    collect: bool,
) -> MatchRun {
    let start = Instant::now();
    let normalized = normalize_whitespace(response);
    let response_words = words(&normalized);

    let mut metrics = MatchMetrics::default();
    let mut score_candidate = |candidate: &Candidate<'_>| {
        let score = score_words(&response_words, &words(&candidate.answer.text), options);
        metrics.candidates_scored += 1;
        tracing::trace!(
            rank = candidate.rank,
            order = candidate.order,
            answer = %candidate.answer.text,
            distance = score.distance,
            "scored candidate"
        );
        if collect {
            metrics.ranking.push(ScoredCandidate::new(candidate, &score));
        }
        score
    };

    let first = catalog.first_candidate();
    let mut best = (first, score_candidate(&first));
    for candidate in catalog.candidates().skip(1) {
        let score = score_candidate(&candidate);
        if score.distance < best.1.distance {
            best = (candidate, score);
        }
    }
    let (candidate, score) = best;
    metrics.scoring = start.elapsed();

    let base = build_result(normalized, &candidate, score);
    tracing::debug!(
        rank = base.rank,
        order = base.order,
        answer = %base.matched_answer,
        distance = base.distance,
        error_code = base.error_code.legacy(),
        "closest answer"
    );

    if !hint.is_active() {
        metrics.total = start.elapsed();
        return MatchRun { result: base, effective_response: None, metrics };
    }

    let rescore_start = Instant::now();
    let effective = apply_hint(&base, hint);
    let candidate_words = words(&candidate.answer.text);
    let score = score_words(&words(&effective), &candidate_words, options);
    let result = build_result(effective.clone(), &candidate, score);
    metrics.rescoring = rescore_start.elapsed();
    metrics.total = start.elapsed();

    MatchRun { result, effective_response: Some(effective), metrics }
}

/// A response accepted outright under `entry`, reported against itself.
///
/// Covers responses the grader accepts that are not among the listed
/// alternate answers (an expansion truncated at the ceiling). `order` points
/// past the listed answers of the rank.
pub(crate) fn accepted(response: &str, entry: &RankEntry, options: &MatchOptions) -> ClosestMatch {
    let normalized = normalize_whitespace(response);
    let answer = ExpandedAnswer { text: normalized.clone(), fraction: entry.fraction };
    let candidate = Candidate { rank: entry.rank, order: entry.answers.len(), answer: &answer };
    let response_words = words(&normalized);
    let score = score_words(&response_words, &response_words, options);
    tracing::debug!(rank = entry.rank, answer = %normalized, "response accepted outside the listed answers");
    build_result(normalized, &candidate, score)
}
