//! A complete question: answer rows, settings, the built catalog and the
//! matchers used for grading.
//!
//! Finite patterns are matched by walking their parse tree
//! ([`accepts`](crate::accepts)); only zero-grade answers with raw regex
//! syntax are compiled to a `regex::Regex`.
//!
//! Question definitions are TOML:
//!
//! ```toml
//! id = "colours"
//! hint_mode = "adaptive"
//! hint_unit = "word"
//!
//! [[answers]]
//! text = "gray"
//! fraction = 1.0
//!
//! [[answers]]
//! text = "gr(a|e)y"
//! fraction = 0.8
//! feedback = "Either spelling is fine."
//! ```

use crate::api::{ClosestMatchVerbose, MatchOptions, closest_verbose_with, closest_with};
use crate::engine::{self, AlternateAnswerCatalog, CatalogOptions, ClosestMatch, HintMode, HintState, HintUnit};
use crate::error::{ExpansionTooLarge, QuestionError};
use crate::pattern::{
    DEFAULT_MAX_EXPANSIONS, Expander, ExpansionPolicy, ValidatedPattern, ValidationMode, accepts, ordering_count,
    to_regex, validate_with,
};
use crate::{AnswerPattern, FeedbackFormat, Fraction, normalize_whitespace};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Question settings and answers as written in a definition file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuestionConfig {
    #[serde(default)]
    pub id: String,
    pub answers: Vec<AnswerPattern>,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub hint_mode: HintMode,
    #[serde(default)]
    pub hint_unit: HintUnit,
    /// Grade deducted per hint unit bought in adaptive mode.
    #[serde(default = "default_penalty")]
    pub penalty: f64,
    /// Students may see the alternate-answer listing on review.
    #[serde(default)]
    pub student_show_alternate: bool,
    #[serde(default = "default_max_expansions")]
    pub max_expansions: usize,
    #[serde(default)]
    pub expansion_policy: ExpansionPolicy,
}

fn default_penalty() -> f64 {
    0.1
}

fn default_max_expansions() -> usize {
    DEFAULT_MAX_EXPANSIONS
}

impl QuestionConfig {
    /// Settings with defaults around `answers`.
    pub fn new(answers: Vec<AnswerPattern>) -> Self {
        QuestionConfig {
            id: String::new(),
            answers,
            case_sensitive: false,
            hint_mode: HintMode::default(),
            hint_unit: HintUnit::default(),
            penalty: default_penalty(),
            student_show_alternate: false,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
            expansion_policy: ExpansionPolicy::default(),
        }
    }
}

/// Outcome of grading one response.
#[derive(Debug, Clone, PartialEq)]
pub struct Grade {
    /// 1-based number of the answer the response matched.
    pub answer: Option<usize>,
    pub fraction: Fraction,
    pub feedback: Option<String>,
    pub feedback_format: FeedbackFormat,
}

#[derive(Debug, Clone)]
enum Matcher {
    /// Answer 1, compared as text.
    Literal(String),
    /// Finite pattern, matched structurally.
    Pattern(ValidatedPattern),
    /// Pattern keeping raw regex syntax.
    Regex(Regex),
    /// Empty answer row; matches nothing.
    Blank,
}

#[derive(Debug, Clone)]
pub struct Question {
    config: QuestionConfig,
    catalog: Arc<AlternateAnswerCatalog>,
    matchers: Vec<Matcher>,
    options: MatchOptions,
}

impl Question {
    pub fn new(config: QuestionConfig) -> Result<Self, QuestionError> {
        let first = config.answers.first().ok_or(QuestionError::NoAnswers)?;
        if first.fraction != Fraction::FULL {
            return Err(QuestionError::FirstAnswerNotFull { fraction: first.fraction.value() });
        }

        let options = CatalogOptions { expander: Expander::new(config.max_expansions, config.expansion_policy) };
        let catalog = AlternateAnswerCatalog::build_with(&config.answers, &options)?;

        let mut matchers = Vec::with_capacity(config.answers.len());
        for (idx, pattern) in config.answers.iter().enumerate() {
            let answer = idx + 1;
            let matcher = if idx == 0 {
                Matcher::Literal(normalize_whitespace(&pattern.raw_text))
            } else if pattern.raw_text.trim().is_empty() {
                Matcher::Blank
            } else {
                let mode = if pattern.fraction.is_zero() { ValidationMode::Ungraded } else { ValidationMode::Graded };
                let validated = validate_with(&pattern.raw_text, mode)
                    .map_err(|source| QuestionError::InvalidPattern { answer, source })?;
                if validated.is_expandable() {
                    Matcher::Pattern(validated)
                } else {
                    let count = ordering_count(&validated);
                    if count > config.max_expansions as u128 {
                        let source = ExpansionTooLarge { count, limit: config.max_expansions };
                        return Err(QuestionError::Orderings { answer, source });
                    }
                    let regex = to_regex(&validated, config.case_sensitive)
                        .map_err(|source| QuestionError::Regex { answer, source })?;
                    Matcher::Regex(regex)
                }
            };
            matchers.push(matcher);
        }

        let options = MatchOptions { case_sensitive: config.case_sensitive, ..MatchOptions::default() };
        tracing::debug!(id = %config.id, answers = config.answers.len(), "question ready");
        Ok(Question { config, catalog: Arc::new(catalog), matchers, options })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, QuestionError> {
        let config: QuestionConfig = toml::from_str(text)?;
        Self::new(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, QuestionError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| QuestionError::Io { path: path.display().to_string(), source })?;
        Self::from_toml_str(&text)
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn config(&self) -> &QuestionConfig {
        &self.config
    }

    pub fn answers(&self) -> &[AnswerPattern] {
        &self.config.answers
    }

    /// The built catalog, shareable with a host cache.
    pub fn catalog(&self) -> &Arc<AlternateAnswerCatalog> {
        &self.catalog
    }

    pub fn match_options(&self) -> &MatchOptions {
        &self.options
    }

    /// Hint state for `revealed` units bought under this question's settings.
    pub fn hint_state(&self, revealed: usize) -> HintState {
        HintState::new(revealed, self.config.hint_mode, self.config.hint_unit)
    }

    /// First answer, in authored order, that accepts the whole response.
    pub fn matching_answer(&self, response: &str) -> Option<(usize, &AnswerPattern)> {
        let normalized = normalize_whitespace(response);
        self.matchers.iter().zip(&self.config.answers).enumerate().find_map(|(idx, (matcher, pattern))| {
            let hit = match matcher {
                Matcher::Literal(text) if self.config.case_sensitive => *text == normalized,
                Matcher::Literal(text) => text.to_lowercase() == normalized.to_lowercase(),
                Matcher::Pattern(validated) => accepts(validated, &normalized, self.config.case_sensitive),
                Matcher::Regex(regex) => regex.is_match(&normalized),
                Matcher::Blank => false,
            };
            hit.then_some((idx + 1, pattern))
        })
    }

    /// Grade a response. Unmatched responses get fraction 0 and no feedback.
    pub fn grade(&self, response: &str) -> Grade {
        match self.matching_answer(response) {
            Some((answer, pattern)) => Grade {
                answer: Some(answer),
                fraction: pattern.fraction,
                feedback: (!pattern.feedback.is_empty()).then(|| pattern.feedback.clone()),
                feedback_format: pattern.feedback_format,
            },
            None => Grade {
                answer: None,
                fraction: Fraction::ZERO,
                feedback: None,
                feedback_format: FeedbackFormat::default(),
            },
        }
    }

    /// Closest alternate answer, honouring the question's case setting.
    ///
    /// A response that a graded answer accepts is complete and error free,
    /// even when it is missing from a truncated expansion.
    pub fn closest(&self, response: &str, hint: &HintState) -> ClosestMatch {
        let result = closest_with(response, &self.catalog, hint, &self.options);
        if result.is_complete() {
            return result;
        }
        self.accepted(response).unwrap_or(result)
    }

    /// [`closest`](Self::closest) with timing and the candidate ranking.
    pub fn closest_verbose(&self, response: &str, hint: &HintState) -> ClosestMatchVerbose {
        let mut run = closest_verbose_with(response, &self.catalog, hint, &self.options);
        if !run.result.is_complete() {
            if let Some(result) = self.accepted(response) {
                run.result = result;
                run.details.effective_response = None;
            }
        }
        run
    }

    fn accepted(&self, response: &str) -> Option<ClosestMatch> {
        let (answer, pattern) = self.matching_answer(response)?;
        if pattern.fraction.is_zero() {
            return None;
        }
        let entry = self.catalog.ranks().iter().find(|entry| entry.answer == answer)?;
        Some(engine::accepted(response, entry, &self.options))
    }

    /// Whether the alternate-answer listing may be shown; `can_view_all` is
    /// true for teachers.
    pub fn alternates_visible(&self, can_view_all: bool) -> bool {
        can_view_all || self.config.student_show_alternate
    }

    /// Grade deducted for the hints in `hint`.
    pub fn penalty_for(&self, hint: &HintState) -> f64 {
        hint.penalty(self.config.penalty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CatalogError, ErrorCode, ValidationError};

    const COLOURS: &str = r#"
        id = "colours"
        hint_mode = "adaptive"
        hint_unit = "letter"
        penalty = 0.2

        [[answers]]
        text = "gray"
        fraction = 1.0
        feedback = "Well done"

        [[answers]]
        text = "gr(a|e)y"
        fraction = 0.8
        feedback = "Either spelling works."
        feedback_format = "plain"

        [[answers]]
        text = "gr.*"
        fraction = 0.0
        feedback = "Right start, keep going."
    "#;

    fn colours() -> Question {
        Question::from_toml_str(COLOURS).unwrap()
    }

    #[test]
    fn loads_settings_from_toml() {
        let question = colours();
        assert_eq!(question.id(), "colours");
        assert_eq!(question.answers().len(), 3);
        assert_eq!(question.config().hint_unit, HintUnit::Letter);
        assert!(!question.config().student_show_alternate);
        assert_eq!(question.config().max_expansions, DEFAULT_MAX_EXPANSIONS);
        assert_eq!(question.catalog().ranks().len(), 2);
    }

    #[test]
    fn grades_by_first_matching_answer() {
        let question = colours();

        let grade = question.grade("  GRAY ");
        assert_eq!(grade.answer, Some(1));
        assert_eq!(grade.fraction, Fraction::FULL);
        assert_eq!(grade.feedback.as_deref(), Some("Well done"));

        let grade = question.grade("grey");
        assert_eq!(grade.answer, Some(2));
        assert_eq!(grade.fraction.value(), 0.8);
        assert_eq!(grade.feedback_format, FeedbackFormat::Plain);

        let grade = question.grade("green");
        assert_eq!(grade.answer, Some(3));
        assert!(grade.fraction.is_zero());

        let grade = question.grade("blue");
        let ungraded =
            Grade { answer: None, fraction: Fraction::ZERO, feedback: None, feedback_format: FeedbackFormat::Html };
        assert_eq!(grade, ungraded);
    }

    #[test]
    fn permutations_and_spacing_are_accepted() {
        let question = Question::new(QuestionConfig::new(vec![
            AnswerPattern::new("red blue car", Fraction::FULL),
            AnswerPattern::new("[[red_blue]] (big )?car", Fraction::FULL),
        ]))
        .unwrap();
        assert_eq!(question.matching_answer("blue red car").map(|(n, _)| n), Some(2));
        assert_eq!(question.matching_answer("blue  red big car").map(|(n, _)| n), Some(2));
        assert!(question.matching_answer("blue car").is_none());
    }

    #[test]
    fn case_sensitive_questions() {
        let mut config = QuestionConfig::new(vec![
            AnswerPattern::new("Paris", Fraction::FULL),
            AnswerPattern::new("(Paris|Lutetia), France", Fraction::new(0.5).unwrap()),
        ]);
        config.case_sensitive = true;
        let question = Question::new(config).unwrap();
        assert!(question.match_options().case_sensitive);

        assert_eq!(question.grade("Paris").answer, Some(1));
        assert_eq!(question.grade("paris").answer, None);
        assert_eq!(question.grade("Lutetia, France").answer, Some(2));
        assert_eq!(question.closest("paris", &HintState::none()).error_code, ErrorCode::Wrong);
    }

    #[test]
    fn seven_item_group_builds_and_grades() {
        for raw in ["[[a_b_c_d_e_f_g]]", "[[a_b_c_d_e_f_g_h]]"] {
            let question = Question::new(QuestionConfig::new(vec![
                AnswerPattern::new("a b c d e f g", Fraction::FULL),
                AnswerPattern::new(raw, Fraction::FULL),
            ]))
            .unwrap();
            assert_eq!(question.catalog().warnings().len(), 1);
            assert!(question.catalog().warnings()[0].source.count > 2000);
        }

        let question = Question::new(QuestionConfig::new(vec![
            AnswerPattern::new("a b c d e f g", Fraction::FULL),
            AnswerPattern::new("[[a_b_c_d_e_f_g]]", Fraction::FULL),
        ]))
        .unwrap();
        assert_eq!(question.grade("g f e d c b a").answer, Some(2));
        assert_eq!(question.grade("a a b c d e f").answer, None);
    }

    #[test]
    fn raw_regex_answers_refuse_too_many_orderings() {
        let err = Question::new(QuestionConfig::new(vec![
            AnswerPattern::new("a b c d e f g", Fraction::FULL),
            AnswerPattern::new("[[a_b_c_d_e_f_g]] .*", Fraction::ZERO),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            QuestionError::Orderings { answer: 2, source: ExpansionTooLarge { count: 5040, limit: 2000 } }
        ));

        let question = Question::new(QuestionConfig::new(vec![
            AnswerPattern::new("a b c", Fraction::FULL),
            AnswerPattern::new("[[a_b_c]] .*", Fraction::ZERO).with_feedback("Too long.", FeedbackFormat::Plain),
        ]))
        .unwrap();
        let grade = question.grade("c b a d");
        assert_eq!(grade.answer, Some(2));
        assert_eq!(grade.feedback.as_deref(), Some("Too long."));
        assert_eq!(grade.feedback_format, FeedbackFormat::Plain);
    }

    #[test]
    fn accepted_response_beyond_truncation_is_complete() {
        let question = Question::new(QuestionConfig::new(vec![
            AnswerPattern::new("a b c d e x p q r s t", Fraction::FULL),
            AnswerPattern::new("[[a_b_c_d_e]] x [[p_q_r_s_t]]", Fraction::FULL)
                .with_feedback("Any order works.", FeedbackFormat::Plain),
        ]))
        .unwrap();
        let response = "e d c b a x t s r q p";
        assert_eq!(question.catalog().rank(2).map(|entry| entry.answers.len()), Some(2000));

        let grade = question.grade(response);
        assert_eq!(grade.answer, Some(2));
        assert_eq!(grade.feedback.as_deref(), Some("Any order works."));

        let result = question.closest(response, &HintState::none());
        assert!(result.is_complete());
        assert_eq!(result.error_code, ErrorCode::None);
        assert_eq!(result.matched_answer, response);
        assert_eq!((result.rank, result.order, result.distance), (2, 2000, 0));
        assert_eq!(result.corrected_prefix, response);
        assert_eq!(result.highlighted_fix, "");

        let hinted = question.closest(response, &question.hint_state(1));
        assert!(hinted.is_complete());

        let verbose = question.closest_verbose(response, &HintState::none());
        assert_eq!(verbose.result, result);
        assert!(verbose.details.effective_response.is_none());

        let partial = question.closest("e d c b a x t s r q", &HintState::none());
        assert!(!partial.is_complete());
    }

    #[test]
    fn first_answer_must_be_full_marks() {
        let half = Fraction::new(0.5).unwrap();
        let err = Question::new(QuestionConfig::new(vec![AnswerPattern::new("gray", half)])).unwrap_err();
        assert!(matches!(err, QuestionError::FirstAnswerNotFull { fraction } if fraction == 0.5));
        assert!(matches!(Question::new(QuestionConfig::new(Vec::new())), Err(QuestionError::NoAnswers)));
    }

    #[test]
    fn graded_metacharacters_are_refused() {
        let err = Question::new(QuestionConfig::new(vec![
            AnswerPattern::new("gray", Fraction::FULL),
            AnswerPattern::new("gr.y", Fraction::new(0.5).unwrap()),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            QuestionError::Catalog(CatalogError::InvalidPattern {
                answer: 2,
                source: ValidationError::DisallowedMetacharacters { .. }
            })
        ));
    }

    #[test]
    fn ungraded_answers_are_checked_structurally() {
        let err = Question::new(QuestionConfig::new(vec![
            AnswerPattern::new("gray", Fraction::FULL),
            AnswerPattern::new("gr(a.*", Fraction::ZERO),
        ]))
        .unwrap_err();
        assert!(matches!(err, QuestionError::InvalidPattern { answer: 2, .. }));
    }

    #[test]
    fn unknown_keys_are_refused() {
        let err = Question::from_toml_str("answers = []\ncolour = \"red\"").unwrap_err();
        assert!(matches!(err, QuestionError::Toml(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Question::load("/nonexistent/question.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/question.toml"));
    }

    #[test]
    fn hints_and_penalties_follow_settings() {
        let question = colours();
        let hint = question.hint_state(2);
        assert_eq!(hint, HintState::new(2, HintMode::Adaptive, HintUnit::Letter));
        assert!((question.penalty_for(&hint) - 0.4).abs() < 1e-9);

        let result = question.closest("gr", &hint);
        assert_eq!(result.response, "gray");
        assert!(result.is_complete());
    }

    #[test]
    fn alternate_listing_visibility() {
        let question = colours();
        assert!(question.alternates_visible(true));
        assert!(!question.alternates_visible(false));

        let mut config = question.config().clone();
        config.student_show_alternate = true;
        assert!(Question::new(config).unwrap().alternates_visible(false));
    }
}
