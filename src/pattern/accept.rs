//! Whole-response matching for finite patterns, walked over the parse tree.
//!
//! Follows the same rules as the compiled regex (`compile.rs`) but never
//! spells out permutation orderings: a group is matched slot by slot, each
//! item used exactly once, with its glue in place.
//!
//! ```text
//! "[[a_b_c]] x" against "c a b x"
//!
//! slot 0: {a,b,c} -> c      used {c}
//! slot 1: {a,b}   -> a      used {a,c}
//! slot 2: {b}     -> b      used {a,b,c}
//! " x"                      end of text -> accepted
//! ```
//!
//! The walk keeps the set of text positions reachable so far, so alternation
//! and optional parts never backtrack. A permutation state is (items used,
//! position) and each state is visited once.

use super::ast::{Node, PermutationGroup, Sequence};
use super::validate::ValidatedPattern;
use std::collections::{BTreeSet, HashSet};

type Positions = BTreeSet<usize>;

/// True when `pattern` accepts the whole of `text`.
///
/// `Raw` nodes match nothing here; patterns that keep raw regex syntax go
/// through [`to_regex`](super::to_regex) instead.
pub fn accepts(pattern: &ValidatedPattern, text: &str, case_sensitive: bool) -> bool {
    let walker = Walker { text: text.chars().collect(), case_sensitive };
    walker.sequence(pattern.root(), &Positions::from([0])).contains(&walker.text.len())
}

struct Walker {
    text: Vec<char>,
    case_sensitive: bool,
}

impl Walker {
    fn sequence(&self, seq: &Sequence, from: &Positions) -> Positions {
        let mut current = from.clone();
        for node in &seq.nodes {
            if current.is_empty() {
                break;
            }
            current = self.node(node, &current);
        }
        current
    }

    fn node(&self, node: &Node, from: &Positions) -> Positions {
        match node {
            Node::Literal(text) => self.literal(text, from),
            Node::Class(members) => from
                .iter()
                .filter(|&&pos| self.char_at(pos, |ch| members.iter().any(|&m| self.same(ch, m))))
                .map(|pos| pos + 1)
                .collect(),
            Node::Alternation(branches) => branches.iter().flat_map(|branch| self.sequence(branch, from)).collect(),
            Node::Optional(inner) => {
                let mut out = from.clone();
                out.extend(self.node(inner, from));
                out
            }
            Node::Permutation(group) => self.permutation(group, from),
            Node::Raw(_) => Positions::new(),
        }
    }

    /// A whitespace run in the pattern takes one whitespace character, or none
    /// at a word boundary.
    fn literal(&self, literal: &str, from: &Positions) -> Positions {
        let mut current = from.clone();
        let mut chars = literal.chars().peekable();
        while let Some(expected) = chars.next() {
            if expected.is_whitespace() {
                while chars.next_if(|ch| ch.is_whitespace()).is_some() {}
                current = current.iter().flat_map(|&pos| self.space(pos)).collect();
            } else {
                current = current
                    .iter()
                    .filter(|&&pos| self.char_at(pos, |ch| self.same(ch, expected)))
                    .map(|pos| pos + 1)
                    .collect();
            }
            if current.is_empty() {
                break;
            }
        }
        current
    }

    fn space(&self, pos: usize) -> Vec<usize> {
        let mut out = Vec::with_capacity(2);
        if self.is_boundary(pos) {
            out.push(pos);
        }
        if self.char_at(pos, char::is_whitespace) {
            out.push(pos + 1);
        }
        out
    }

    fn permutation(&self, group: &PermutationGroup, from: &Positions) -> Positions {
        let mut ends = Positions::new();
        let mut seen = HashSet::new();
        let mut used = vec![false; group.items.len()];
        for start in self.sequence(&group.glue[0], from) {
            self.place(group, 0, start, &mut used, &mut seen, &mut ends);
        }
        ends
    }

    /// Fill slots `slot..` starting at `pos`.
    fn place(
        &self,
        group: &PermutationGroup,
        slot: usize,
        pos: usize,
        used: &mut [bool],
        seen: &mut HashSet<(Vec<bool>, usize)>,
        ends: &mut Positions,
    ) {
        if slot == group.items.len() {
            ends.insert(pos);
            return;
        }
        if !seen.insert((used.to_vec(), pos)) {
            return;
        }
        for item in 0..group.items.len() {
            if used[item] {
                continue;
            }
            let after_item = self.sequence(&group.items[item], &Positions::from([pos]));
            if after_item.is_empty() {
                continue;
            }
            let after_glue = self.sequence(&group.glue[slot + 1], &after_item);
            used[item] = true;
            for next in after_glue {
                self.place(group, slot + 1, next, used, seen, ends);
            }
            used[item] = false;
        }
    }

    fn char_at(&self, pos: usize, pred: impl Fn(char) -> bool) -> bool {
        self.text.get(pos).is_some_and(|&ch| pred(ch))
    }

    fn is_boundary(&self, pos: usize) -> bool {
        let before = pos > 0 && is_word_char(self.text[pos - 1]);
        let after = self.char_at(pos, is_word_char);
        before != after
    }

    fn same(&self, a: char, b: char) -> bool {
        a == b || (!self.case_sensitive && a.to_lowercase().eq(b.to_lowercase()))
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}
