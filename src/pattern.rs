//! The answer-pattern dialect: parsing, validation, expansion and regex
//! compilation.
//!
//! ```text
//! raw text ── parse (parser.rs) ──▶ ParsedPattern (ast.rs)
//!                                      │
//!                validate (validate.rs)│ Graded / Ungraded rules
//!                                      v
//!                              ValidatedPattern
//!                 ┌────────────────────┼──────────────────────┐
//!                 v                    v                      v
//!   Expander::expand (expand.rs)  accepts (accept.rs)   to_regex (compile.rs)
//!   Vec<ExpandedAnswer>           finite patterns       raw regex syntax
//!   (alternate answers,           (grading)             (grading)
//!    closest match)
//! ```
//!
//! Everything downstream works from the one parse tree, so the alternate
//! answers a teacher is shown and the responses the grader accepts come from
//! the same structure.

#[path = "pattern/accept.rs"]
mod accept;
#[path = "pattern/ast.rs"]
mod ast;
#[path = "pattern/compile.rs"]
mod compile;
#[path = "pattern/expand.rs"]
mod expand;
#[path = "pattern/parser.rs"]
mod parser;
#[path = "pattern/validate.rs"]
mod validate;

pub use accept::accepts;
pub use ast::{GroupKind, GroupSpan, Metachar, Node, PermutationGroup, Sequence, Span};
pub use compile::{ordering_count, regex_source, to_regex};
pub use expand::{DEFAULT_MAX_EXPANSIONS, Expander, Expansion, ExpansionPolicy, expand};
pub use validate::{ValidatedPattern, ValidationMode, validate, validate_with};
