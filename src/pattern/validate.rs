//! Authoring-time validation.
//!
//! A pattern is validated once, when the teacher saves it. The result keeps the
//! parse tree so the expander and the regex compiler never re-scan the text.

use super::ast::{GroupSpan, Metachar, PermutationGroup, Sequence};
use super::parser::{ParsedPattern, parse};
use crate::ValidationError;

/// Which rule set applies to a pattern.
///
/// Answers with a grade above zero are expanded into literal alternate
/// answers, so they may not contain unbounded regex syntax. Zero-grade answers
/// only ever match responses (to attach feedback) and may use it freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    #[default]
    Graded,
    Ungraded,
}

/// A pattern that passed validation, together with its parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPattern {
    parsed: ParsedPattern,
    mode: ValidationMode,
}

impl ValidatedPattern {
    pub fn source(&self) -> &str {
        &self.parsed.source
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn root(&self) -> &Sequence {
        &self.parsed.root
    }

    /// Unescaped metacharacters (always empty for graded patterns).
    pub fn metacharacters(&self) -> &[Metachar] {
        &self.parsed.metacharacters
    }

    /// Delimited groups, ordered by start offset.
    pub fn groups(&self) -> &[GroupSpan] {
        &self.parsed.groups
    }

    pub fn permutation_groups(&self) -> Vec<&PermutationGroup> {
        let mut out = Vec::new();
        self.parsed.root.collect_permutations(&mut out);
        out
    }

    /// True when the pattern denotes a finite set of strings.
    pub fn is_expandable(&self) -> bool {
        self.parsed.root.is_finite()
    }
}

/// Validate a pattern for an answer with a grade above zero.
pub fn validate(raw: &str) -> Result<ValidatedPattern, ValidationError> {
    validate_with(raw, ValidationMode::Graded)
}

/// Validate a pattern under the given rule set.
///
/// ```text
/// parse ──▶ structural errors (delimiters, permutation groups)
///       └─▶ Graded: any unescaped metacharacter is refused, all offenders listed
/// ```
pub fn validate_with(raw: &str, mode: ValidationMode) -> Result<ValidatedPattern, ValidationError> {
    let parsed = parse(raw)?;

    if mode == ValidationMode::Graded && !parsed.metacharacters.is_empty() {
        let mut found: Vec<char> = Vec::new();
        for meta in &parsed.metacharacters {
            if !found.contains(&meta.ch) {
                found.push(meta.ch);
            }
        }
        let found = found.iter().map(char::to_string).collect::<Vec<_>>().join(" ");
        return Err(ValidationError::DisallowedMetacharacters { found });
    }

    Ok(ValidatedPattern { parsed, mode })
}
