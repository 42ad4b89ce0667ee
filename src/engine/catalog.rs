//! Alternate-answer catalog: every literal accepted answer of a question,
//! grouped by the rank of the answer row that produced it.
//!
//! ```text
//! answers:  1 "gray"            100%   -> rank 1: gray            (literal)
//!           2 "gr(a|e)y"        100%   -> rank 2: gray, grey
//!           3 "colou?r"          80%   -> rank 3: colour, color
//!           4 "gr.*"              0%   -> skipped (not an accepted answer)
//! ```
//!
//! Answer 1 is never analysed as a pattern. Built once per question edit and
//! shared read-only afterwards.

use crate::engine::words::normalize_whitespace;
use crate::error::{CatalogError, ExpansionTooLarge};
use crate::pattern::{Expander, validate};
use crate::{AnswerPattern, ExpandedAnswer, Fraction};
use std::fmt;

/// Catalog build settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CatalogOptions {
    pub expander: Expander,
}

/// The literal answers derived from one answer row.
#[derive(Debug, Clone, PartialEq)]
pub struct RankEntry {
    /// 1-based, consecutive.
    pub rank: usize,
    /// 1-based index of the source row among the authored answers.
    pub answer: usize,
    pub fraction: Fraction,
    pub answers: Vec<ExpandedAnswer>,
    pub truncated_from: Option<u128>,
}

/// A pattern whose expansion was cut at the ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogWarning {
    pub answer: usize,
    pub source: ExpansionTooLarge,
}

impl fmt::Display for CatalogWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "answer {}: expansion truncated to {} of {} alternate answers",
            self.answer, self.source.limit, self.source.count
        )
    }
}

/// One literal answer as seen by the closest-match search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'a> {
    pub rank: usize,
    /// Position within the rank, in expansion order.
    pub order: usize,
    pub answer: &'a ExpandedAnswer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlternateAnswerCatalog {
    ranks: Vec<RankEntry>,
    warnings: Vec<CatalogWarning>,
}

impl AlternateAnswerCatalog {
    pub fn build(patterns: &[AnswerPattern]) -> Result<Self, CatalogError> {
        Self::build_with(patterns, &CatalogOptions::default())
    }

    pub fn build_with(patterns: &[AnswerPattern], options: &CatalogOptions) -> Result<Self, CatalogError> {
        let first = patterns.first().ok_or(CatalogError::MissingFirstAnswer)?;
        let best = normalize_whitespace(&first.raw_text);
        if best.is_empty() {
            return Err(CatalogError::MissingFirstAnswer);
        }

        let mut ranks = vec![RankEntry {
            rank: 1,
            answer: 1,
            fraction: first.fraction,
            answers: vec![ExpandedAnswer { text: best, fraction: first.fraction }],
            truncated_from: None,
        }];
        let mut warnings = Vec::new();

        for (idx, pattern) in patterns.iter().enumerate().skip(1) {
            let answer = idx + 1;
            if pattern.fraction.is_zero() || pattern.raw_text.trim().is_empty() {
                continue;
            }

            let validated =
                validate(&pattern.raw_text).map_err(|source| CatalogError::InvalidPattern { answer, source })?;
            let expansion = options
                .expander
                .expand(&validated, pattern.fraction)
                .map_err(|source| CatalogError::Expansion { answer, source })?;

            if let Some(count) = expansion.truncated_from {
                let source = ExpansionTooLarge { count, limit: options.expander.limit };
                tracing::warn!(answer, count, limit = source.limit, "alternate answers truncated");
                warnings.push(CatalogWarning { answer, source });
            }

            ranks.push(RankEntry {
                rank: ranks.len() + 1,
                answer,
                fraction: pattern.fraction,
                answers: expansion.answers,
                truncated_from: expansion.truncated_from,
            });
        }

        let catalog = AlternateAnswerCatalog { ranks, warnings };
        tracing::info!(ranks = catalog.ranks.len(), answers = catalog.len(), "built alternate-answer catalog");
        Ok(catalog)
    }

    /// Answer 1, normalized.
    pub fn best_answer(&self) -> &str {
        &self.ranks[0].answers[0].text
    }

    pub fn ranks(&self) -> &[RankEntry] {
        &self.ranks
    }

    /// Entry for a 1-based rank.
    pub fn rank(&self, rank: usize) -> Option<&RankEntry> {
        rank.checked_sub(1).and_then(|idx| self.ranks.get(idx))
    }

    /// Answer 1 as a candidate. Every catalog has it.
    pub(crate) fn first_candidate(&self) -> Candidate<'_> {
        Candidate { rank: 1, order: 0, answer: &self.ranks[0].answers[0] }
    }

    /// Every literal answer in (rank, order) order.
    pub fn candidates(&self) -> impl Iterator<Item = Candidate<'_>> + '_ {
        self.ranks.iter().flat_map(|entry| {
            entry.answers.iter().enumerate().map(move |(order, answer)| Candidate { rank: entry.rank, order, answer })
        })
    }

    /// Number of literal answers across all ranks.
    pub fn len(&self) -> usize {
        self.ranks.iter().map(|entry| entry.answers.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn warnings(&self) -> &[CatalogWarning] {
        &self.warnings
    }

    /// True when anything besides answer 1 is accepted.
    pub fn has_alternates(&self) -> bool {
        self.ranks.len() > 1
    }
}

/// The "correct answer" listing shown on review pages.
///
/// ```text
/// The best correct answer is: gray
/// The other accepted answers are:
/// 100%
///   gray
///   grey
/// ```
impl fmt::Display for AlternateAnswerCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_alternates() {
            return write!(f, "The correct answer is: {}", self.best_answer());
        }
        writeln!(f, "The best correct answer is: {}", self.best_answer())?;
        write!(f, "The other accepted answers are:")?;
        for entry in &self.ranks[1..] {
            write!(f, "\n{}", entry.fraction)?;
            for answer in &entry.answers {
                write!(f, "\n  {}", answer.text)?;
            }
        }
        Ok(())
    }
}
