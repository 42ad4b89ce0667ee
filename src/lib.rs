#[macro_use]
mod macros;
mod api;
mod engine;
mod error;
mod pattern;
mod question;

pub use api::{
    CandidateSummary, ClosestMatchVerbose, MatchDetails, MatchOptions, MatchWeights, apply_hint, build_catalog,
    closest, closest_verbose_with, closest_with, expand, validate, validate_with,
};
pub use engine::{
    AlternateAnswerCatalog, Candidate, CatalogCache, CatalogOptions, CatalogWarning, ClosestMatch, CompletionStatus,
    ErrorCode, ErrorFlags, HintMode, HintState, HintUnit, MarkKind, RankEntry, WordMark, normalize_whitespace,
};
pub use error::{CatalogError, ExpansionTooLarge, InvalidFraction, QuestionError, ValidationError};
pub use pattern::{
    DEFAULT_MAX_EXPANSIONS, Expander, Expansion, ExpansionPolicy, GroupKind, GroupSpan, Metachar, Node,
    PermutationGroup, Sequence, Span, ValidatedPattern, ValidationMode, accepts, ordering_count, regex_source,
    to_regex,
};
pub use question::{Grade, Question, QuestionConfig};

use serde::Deserialize;
use std::fmt;

// --- Data model -------------------------------------------------------------

/// A grade fraction in `[0, 1]` (1 = full marks).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize)]
#[serde(try_from = "f64")]
pub struct Fraction(f64);

impl Fraction {
    pub const ZERO: Fraction = Fraction(0.0);
    pub const FULL: Fraction = Fraction(1.0);

    pub fn new(value: f64) -> Result<Self, InvalidFraction> {
        if (0.0..=1.0).contains(&value) { Ok(Fraction(value)) } else { Err(InvalidFraction(value)) }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

impl TryFrom<f64> for Fraction {
    type Error = InvalidFraction;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Fraction::new(value)
    }
}

/// Percentage, without trailing zeros: `1.0` → `100%`, `0.3333333` → `33.33333%`.
impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pct = format!("{:.5}", self.0 * 100.0);
        let pct = pct.trim_end_matches('0').trim_end_matches('.');
        write!(f, "{pct}%")
    }
}

/// How an answer's feedback text is to be rendered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackFormat {
    Moodle,
    #[default]
    Html,
    Plain,
    Markdown,
}

/// One teacher-entered answer row.
///
/// Answer 1 is always taken literally; later rows are patterns.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnswerPattern {
    #[serde(rename = "text")]
    pub raw_text: String,
    pub fraction: Fraction,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub feedback_format: FeedbackFormat,
}

impl AnswerPattern {
    pub fn new(raw_text: impl Into<String>, fraction: Fraction) -> Self {
        AnswerPattern {
            raw_text: raw_text.into(),
            fraction,
            feedback: String::new(),
            feedback_format: FeedbackFormat::default(),
        }
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>, format: FeedbackFormat) -> Self {
        self.feedback = feedback.into();
        self.feedback_format = format;
        self
    }
}

/// A fully literal accepted answer, derived from one [`AnswerPattern`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedAnswer {
    pub text: String,
    pub fraction: Fraction,
}
