//! Render a validated pattern as an anchored `regex::Regex`.
//!
//! Used to find the answer a response *matches* when the pattern keeps raw
//! regex syntax (zero-grade answers only). Finite patterns are matched by
//! `accept.rs` instead.
//!
//! ```text
//! Literal          escaped; each whitespace run becomes (?:\s|\b)
//! Class            [..] with escaped members
//! Alternation      (?:a|b)
//! Optional         (?:x)?
//! Permutation      (?:order1|order2|...)   every ordering spelled out
//! Raw              verbatim
//! ```
//!
//! `(?:\s|\b)` takes one space, or none at a word boundary, so `a (big )?cat`
//! accepts `a cat` and `a big cat` but not `acat`, and patterns whose optional
//! parts leave doubled spaces still match whitespace-normalized responses.

use super::ast::{Node, PermutationGroup, Sequence};
use super::validate::ValidatedPattern;
use regex::{Regex, RegexBuilder};

const WHITESPACE: &str = r"(?:\s|\b)";

/// Regex source for `pattern`, anchored at both ends.
pub fn regex_source(pattern: &ValidatedPattern) -> String {
    let mut out = String::from("^(?:");
    render_sequence(pattern.root(), &mut out);
    out.push_str(")$");
    out
}

/// Compile `pattern` for whole-response matching.
pub fn to_regex(pattern: &ValidatedPattern, case_sensitive: bool) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&regex_source(pattern)).case_insensitive(!case_sensitive).build()
}

/// Number of alternatives the permutation groups of `pattern` render to
/// (the product of `k!` over its groups, saturating).
pub fn ordering_count(pattern: &ValidatedPattern) -> u128 {
    pattern
        .permutation_groups()
        .iter()
        .map(|group| (1..=group.items.len() as u128).fold(1u128, u128::saturating_mul))
        .fold(1, u128::saturating_mul)
}

fn render_sequence(seq: &Sequence, out: &mut String) {
    for node in &seq.nodes {
        render_node(node, out);
    }
}

fn render_node(node: &Node, out: &mut String) {
    match node {
        Node::Literal(text) => render_literal(text, out),
        Node::Class(chars) => {
            out.push('[');
            for ch in chars {
                out.push_str(&regex::escape(&ch.to_string()));
            }
            out.push(']');
        }
        Node::Alternation(branches) => {
            out.push_str("(?:");
            for (idx, branch) in branches.iter().enumerate() {
                if idx > 0 {
                    out.push('|');
                }
                render_sequence(branch, out);
            }
            out.push(')');
        }
        Node::Optional(inner) => {
            out.push_str("(?:");
            render_node(inner, out);
            out.push_str(")?");
        }
        Node::Permutation(group) => render_permutation(group, out),
        Node::Raw(text) => out.push_str(text),
    }
}

fn render_literal(text: &str, out: &mut String) {
    let mut in_space = false;
    let mut run = String::new();
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push_str(&regex::escape(&run));
                run.clear();
                out.push_str(WHITESPACE);
            }
            in_space = true;
        } else {
            in_space = false;
            run.push(ch);
        }
    }
    out.push_str(&regex::escape(&run));
}

fn render_permutation(group: &PermutationGroup, out: &mut String) {
    let render = |seq: &Sequence| {
        let mut s = String::from("(?:");
        render_sequence(seq, &mut s);
        s.push(')');
        s
    };
    let items: Vec<String> = group.items.iter().map(render).collect();
    let glue: Vec<String> = group.glue.iter().map(render).collect();

    let mut order: Vec<usize> = (0..items.len()).collect();
    out.push_str("(?:");
    let mut first = true;
    loop {
        if !first {
            out.push('|');
        }
        first = false;
        out.push_str(&glue[0]);
        for (slot, &item) in order.iter().enumerate() {
            out.push_str(&items[item]);
            out.push_str(&glue[slot + 1]);
        }
        if !next_ordering(&mut order) {
            break;
        }
    }
    out.push(')');
}

fn next_ordering(order: &mut [usize]) -> bool {
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
