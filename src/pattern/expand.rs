//! Combinatorial expansion of a validated pattern into literal answers.
//!
//! ```text
//! "gr(a|e)y"            -> gray, grey
//! "colou?r"             -> colour, color
//! "[[red_blue]] car"    -> red blue car, blue red car
//! ```
//!
//! Ordering is a pure function of the tree, left to right:
//!
//! - alternation branches and class members in authored order,
//! - an optional atom *with* the atom first,
//! - permutation orderings lexicographic over item indices (authored order
//!   first).
//!
//! The size of the full product is computed before anything is generated, so a
//! runaway pattern is refused (or cut at a deterministic prefix) instead of
//! exhausting memory.

use super::ast::{Node, PermutationGroup, Sequence};
use super::validate::ValidatedPattern;
use crate::engine::normalize_whitespace;
use crate::{ExpandedAnswer, ExpansionTooLarge, Fraction};
use std::collections::HashSet;

/// Default ceiling on literal answers per pattern.
pub const DEFAULT_MAX_EXPANSIONS: usize = 2000;

/// What to do with a pattern whose expansion exceeds the ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionPolicy {
    /// Keep the first `limit` answers of the deterministic order.
    #[default]
    Truncate,
    /// Refuse the pattern with [`ExpansionTooLarge`].
    Reject,
}

/// Expansion settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expander {
    pub limit: usize,
    pub policy: ExpansionPolicy,
}

impl Default for Expander {
    fn default() -> Self {
        Expander { limit: DEFAULT_MAX_EXPANSIONS, policy: ExpansionPolicy::default() }
    }
}

/// Literal answers produced from one pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub answers: Vec<ExpandedAnswer>,
    /// Size of the full product when the answers were cut at the ceiling.
    pub truncated_from: Option<u128>,
}

impl Expander {
    pub fn new(limit: usize, policy: ExpansionPolicy) -> Self {
        Expander { limit, policy }
    }

    /// Size of the full product, before duplicate removal. Patterns with raw
    /// regex syntax match unboundedly many strings and report `u128::MAX`.
    pub fn count(pattern: &ValidatedPattern) -> u128 {
        count_sequence(pattern.root())
    }

    /// Expand `pattern`, tagging every answer with `fraction`.
    pub fn expand(&self, pattern: &ValidatedPattern, fraction: Fraction) -> Result<Expansion, ExpansionTooLarge> {
        let count = Self::count(pattern);
        let too_large = ExpansionTooLarge { count, limit: self.limit };

        if !pattern.is_expandable() {
            return Err(too_large);
        }
        let over = count > self.limit as u128;
        if over && self.policy == ExpansionPolicy::Reject {
            return Err(too_large);
        }

        let mut seen = HashSet::new();
        let answers = expand_sequence(pattern.root(), self.limit)
            .into_iter()
            .map(|text| normalize_whitespace(&text))
            .filter(|text| seen.insert(text.clone()))
            .take(self.limit)
            .map(|text| ExpandedAnswer { text, fraction })
            .collect();

        Ok(Expansion { answers, truncated_from: over.then_some(count) })
    }
}

/// Expand with the default ceiling and policy.
pub fn expand(pattern: &ValidatedPattern, fraction: Fraction) -> Result<Vec<ExpandedAnswer>, ExpansionTooLarge> {
    Expander::default().expand(pattern, fraction).map(|e| e.answers)
}

// --- Counting ---------------------------------------------------------------

fn count_sequence(seq: &Sequence) -> u128 {
    seq.nodes.iter().fold(1u128, |acc, node| acc.saturating_mul(count_node(node)))
}

fn count_node(node: &Node) -> u128 {
    match node {
        Node::Literal(_) => 1,
        Node::Class(chars) => chars.len() as u128,
        Node::Alternation(branches) => branches.iter().fold(0u128, |acc, b| acc.saturating_add(count_sequence(b))),
        Node::Optional(inner) => count_node(inner).saturating_add(1),
        Node::Permutation(group) => count_permutation(group),
        Node::Raw(_) => u128::MAX,
    }
}

fn count_permutation(group: &PermutationGroup) -> u128 {
    let orderings = (1..=group.items.len() as u128).fold(1u128, |acc, n| acc.saturating_mul(n));
    group.items.iter().chain(group.glue.iter()).fold(orderings, |acc, seq| acc.saturating_mul(count_sequence(seq)))
}

// --- Generation -------------------------------------------------------------
//
// Every helper returns at most `cap` strings, and always the *first* `cap`
// strings of the full order: a product is row-major over its left operand, so
// cutting the left operand at `cap` never drops anything from the prefix.

fn expand_sequence(seq: &Sequence, cap: usize) -> Vec<String> {
    let mut acc = vec![String::new()];
    for node in &seq.nodes {
        let alternatives = expand_node(node, cap);
        acc = product(&acc, &alternatives, cap);
    }
    acc
}

fn expand_node(node: &Node, cap: usize) -> Vec<String> {
    match node {
        Node::Literal(text) => vec![text.clone()],
        Node::Class(chars) => chars.iter().take(cap).map(char::to_string).collect(),
        Node::Alternation(branches) => {
            let mut out = Vec::new();
            for branch in branches {
                if out.len() >= cap {
                    break;
                }
                let remaining = cap - out.len();
                out.extend(expand_sequence(branch, remaining));
            }
            out
        }
        Node::Optional(inner) => {
            let mut out = expand_node(inner, cap);
            if out.len() < cap {
                out.push(String::new());
            }
            out
        }
        Node::Permutation(group) => expand_permutation(group, cap),
        // Callers check `is_expandable` first.
        Node::Raw(text) => vec![text.clone()],
    }
}

fn expand_permutation(group: &PermutationGroup, cap: usize) -> Vec<String> {
    let items: Vec<Vec<String>> = group.items.iter().map(|item| expand_sequence(item, cap)).collect();
    let glue: Vec<Vec<String>> = group.glue.iter().map(|g| expand_sequence(g, cap)).collect();

    let mut out = Vec::new();
    let mut order: Vec<usize> = (0..items.len()).collect();
    loop {
        let mut acc = product(&[String::new()], &glue[0], cap);
        for (slot, &item) in order.iter().enumerate() {
            acc = product(&acc, &items[item], cap);
            acc = product(&acc, &glue[slot + 1], cap);
        }
        let remaining = cap - out.len();
        out.extend(acc.into_iter().take(remaining));

        if out.len() >= cap || !next_permutation(&mut order) {
            break;
        }
    }
    out
}

fn product(left: &[String], right: &[String], cap: usize) -> Vec<String> {
    let mut out = Vec::with_capacity(left.len().saturating_mul(right.len()).min(cap));
    'outer: for l in left {
        for r in right {
            if out.len() >= cap {
                break 'outer;
            }
            let mut s = String::with_capacity(l.len() + r.len());
            s.push_str(l);
            s.push_str(r);
            out.push(s);
        }
    }
    out
}

/// Advance `order` to the next lexicographic permutation; false after the last.
fn next_permutation(order: &mut [usize]) -> bool {
    let n = order.len();
    if n < 2 {
        return false;
    }
    let mut i = n - 1;
    while i > 0 && order[i - 1] >= order[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = n - 1;
    while order[j] <= order[i - 1] {
        j -= 1;
    }
    order.swap(i - 1, j);
    order[i..].reverse();
    true
}
