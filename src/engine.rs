//! Alternate answers and closest-match engine.
//!
//! This module is the grading-time side of the crate. It starts from
//! teacher-entered answer rows and ends with a diagnosis of one student
//! response.
//!
//! ## How the parts work together
//!
//! ```text
//! answers (AnswerPattern) ──┐
//!                           │  AlternateAnswerCatalog::build   (catalog.rs)
//!                           │    - answer 1 literal, rank 1
//!                           │    - answers 2.. validated + expanded
//!                           └───────────────┬──────────────
//!                                           │   (optionally cached per
//!                                           │    question, cache.rs)
//! response ── normalize_whitespace ─────────┤  (words.rs)
//!                                           v
//!                                 closest::run (closest.rs)
//!                                   - score every candidate
//!                                   - keep lowest distance
//!                                           │
//!                               hint bought?│
//!                                           v
//!                                 apply_hint (hint.rs)
//!                                   - prefix + revealed units
//!                                   - re-score, same candidate
//!                                           │
//!                                           v
//!                                     ClosestMatch
//! ```
//!
//! ## Responsibilities by module
//!
//! - `catalog.rs`: ranks and expands the answer rows, keeps truncation
//!   warnings, renders the "correct answer" listing.
//! - `cache.rs`: host-owned `Arc` cache of built catalogs.
//! - `closest.rs`: word scoring, candidate selection, error codes.
//! - `hint.rs`: hint state and the splice of bought units into a response.
//! - `words.rs`: whitespace normalization, word and hint-unit splitting.
//! - `metrics.rs`: optional timing and ranking data for a run.
//!
//! ## Debugging
//!
//! Everything logs through `tracing`: `RUST_LOG`-style filters such as
//! `regrade=trace` show each candidate's score.

#[path = "engine/cache.rs"]
mod cache;
#[path = "engine/catalog.rs"]
mod catalog;
#[path = "engine/closest.rs"]
mod closest;
#[path = "engine/hint.rs"]
mod hint;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/words.rs"]
mod words;

#[cfg(test)]
#[path = "engine/tests.rs"]
mod tests;

pub use cache::CatalogCache;
pub use catalog::{AlternateAnswerCatalog, Candidate, CatalogOptions, CatalogWarning, RankEntry};
pub use closest::{ClosestMatch, CompletionStatus, ErrorCode, ErrorFlags, MarkKind, WordMark};
pub use hint::{HintMode, HintState, HintUnit, apply_hint};
pub use words::normalize_whitespace;

pub(crate) use closest::{accepted, run};
