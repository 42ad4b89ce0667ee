//! Error types.
//!
//! Everything here is an *authoring-time* failure: a pattern that cannot be
//! saved, an expansion that is too large, a question file that does not load.
//! Grading itself (`closest`, `apply_hint`, `Question::grade`) is total and has
//! no error type.

use thiserror::Error;

/// Why a teacher-entered pattern was refused.
///
/// Every variant carries the offending text or byte position so the message
/// can be shown to the question author as is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unescaped metacharacters are not allowed in answers with a grade above 0: {found}")]
    DisallowedMetacharacters { found: String },

    #[error("check your parentheses or square brackets: `{token}` opened at byte {position} is never closed")]
    UnbalancedOpen { token: String, position: usize },

    #[error("check your parentheses or square brackets: `{token}` closed at byte {position} was never opened")]
    UnbalancedClose { token: String, position: usize },

    #[error("odd number of underscores ({count}) inside the double square brackets at byte {position}")]
    OddUnderscoreCount { count: usize, position: usize },

    #[error("no more than 2 permutation sets allowed per answer, found {count}")]
    TooManyPermutationGroups { count: usize },

    #[error("no permuted words inside the double square brackets at byte {position}")]
    EmptyPermutationGroup { position: usize },

    #[error("permutation sets cannot be nested (`[[` at byte {position})")]
    NestedPermutationGroup { position: usize },

    #[error("empty character class `[]` at byte {position}")]
    EmptyCharacterClass { position: usize },

    #[error("invalid character range `{range}` at byte {position}")]
    InvalidClassRange { range: String, position: usize },

    #[error("dangling `\\` at the end of the pattern (byte {position})")]
    DanglingEscape { position: usize },

    #[error("`?` at byte {position} has nothing to make optional")]
    DanglingQuantifier { position: usize },
}

/// A pattern expands to more literal answers than the configured ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("pattern expands to {count} answers, more than the limit of {limit}")]
pub struct ExpansionTooLarge {
    /// Exact expansion count (saturated at `u128::MAX`).
    pub count: u128,
    pub limit: usize,
}

/// Failure to build an [`AlternateAnswerCatalog`](crate::AlternateAnswerCatalog).
///
/// `answer` is the 1-based answer number as the teacher sees it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("answer 1 cannot be empty")]
    MissingFirstAnswer,

    #[error("answer {answer}: {source}")]
    InvalidPattern {
        answer: usize,
        #[source]
        source: ValidationError,
    },

    #[error("answer {answer}: {source}")]
    Expansion {
        answer: usize,
        #[source]
        source: ExpansionTooLarge,
    },
}

/// Failure to load or assemble a [`Question`](crate::Question).
#[derive(Debug, Error)]
pub enum QuestionError {
    #[error("a question requires at least one answer")]
    NoAnswers,

    #[error("answer 1 must be a correct answer (grade = 100%), found {fraction}")]
    FirstAnswerNotFull { fraction: f64 },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("answer {answer}: {source}")]
    InvalidPattern {
        answer: usize,
        #[source]
        source: ValidationError,
    },

    #[error("answer {answer}: permutation orderings cannot be combined with raw regex syntax: {source}")]
    Orderings {
        answer: usize,
        #[source]
        source: ExpansionTooLarge,
    },

    #[error("answer {answer}: pattern does not compile to a regex: {source}")]
    Regex {
        answer: usize,
        #[source]
        source: regex::Error,
    },

    #[error("invalid question definition: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A grade fraction outside `[0, 1]` (or NaN).
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("grade fraction {0} is outside [0, 1]")]
pub struct InvalidFraction(pub f64);
