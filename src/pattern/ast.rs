//! Typed parse tree for the answer-pattern dialect.
//!
//! The parser (`parser.rs`) builds this once; validation, expansion and regex
//! compilation all walk the same tree, so they cannot disagree on structure.
//!
//! ```text
//! "the [[_red_ and _blue_]] car(s)?"
//!
//! Sequence
//! ├─ Literal("the ")
//! ├─ Permutation { items: [red, blue], glue: ["", " and ", ""] }
//! ├─ Literal(" car")
//! └─ Optional(Alternation([ "s" ]))
//! ```

/// Byte range in the raw pattern text (end exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// An ordered run of nodes. Concatenation is the only operator here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Literal text, escapes already resolved. Adjacent literal characters are
    /// merged into one node.
    Literal(String),
    /// `[abc]` / `[a-c]`: exactly one of the listed characters.
    Class(Vec<char>),
    /// `(a|b|)` and top-level `a|b`. A plain group `(ab)` is a one-branch
    /// alternation.
    Alternation(Vec<Sequence>),
    /// `x?`
    Optional(Box<Node>),
    /// `[[ ... ]]`
    Permutation(PermutationGroup),
    /// Regex text with no finite expansion (`.`, `*`, `[^..]`, ...). Only
    /// survives validation in ungraded answers.
    Raw(String),
}

/// A `[[ ... ]]` group whose items may appear in any order.
///
/// `glue` always has `items.len() + 1` entries: the fixed text before the
/// first item, between consecutive items and after the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationGroup {
    /// Raw text of each permuted item, as authored.
    pub tokens: Vec<String>,
    /// Number of `_` separators inside the brackets.
    pub separator_count: usize,
    pub items: Vec<Sequence>,
    pub glue: Vec<Sequence>,
    pub span: Span,
}

/// Which kind of delimiter a recorded group used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    Paren,
    Class,
    Permutation,
}

/// Boundaries of one delimited group, recorded during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSpan {
    pub kind: GroupKind,
    pub span: Span,
}

/// An unescaped regex metacharacter and where it was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metachar {
    pub position: usize,
    pub ch: char,
}

impl Sequence {
    pub(crate) fn push_char(&mut self, ch: char) {
        if let Some(Node::Literal(text)) = self.nodes.last_mut() {
            text.push(ch);
        } else {
            self.nodes.push(Node::Literal(ch.to_string()));
        }
    }

    /// Remove the last atom, splitting a trailing literal so that only its
    /// final character is taken (`colou?r` makes `u` optional, not `colou`).
    pub(crate) fn pop_atom(&mut self) -> Option<Node> {
        let split = matches!(self.nodes.last(), Some(Node::Literal(text)) if text.chars().count() > 1);
        if split {
            if let Some(Node::Literal(text)) = self.nodes.last_mut() {
                let ch = text.pop()?;
                return Some(Node::Literal(ch.to_string()));
            }
        }
        self.nodes.pop()
    }

    /// True when every node can be enumerated (no `Raw` anywhere below).
    pub fn is_finite(&self) -> bool {
        self.nodes.iter().all(Node::is_finite)
    }

    /// Visit every permutation group, depth first, left to right.
    pub(crate) fn collect_permutations<'a>(&'a self, out: &mut Vec<&'a PermutationGroup>) {
        for node in &self.nodes {
            node.collect_permutations(out);
        }
    }
}

impl Node {
    pub fn is_finite(&self) -> bool {
        match self {
            Node::Literal(_) | Node::Class(_) => true,
            Node::Alternation(branches) => branches.iter().all(Sequence::is_finite),
            Node::Optional(inner) => inner.is_finite(),
            Node::Permutation(group) => {
                group.items.iter().all(Sequence::is_finite) && group.glue.iter().all(Sequence::is_finite)
            }
            Node::Raw(_) => false,
        }
    }

    fn collect_permutations<'a>(&'a self, out: &mut Vec<&'a PermutationGroup>) {
        match self {
            Node::Alternation(branches) => branches.iter().for_each(|b| b.collect_permutations(out)),
            Node::Optional(inner) => inner.collect_permutations(out),
            Node::Permutation(group) => out.push(group),
            Node::Literal(_) | Node::Class(_) | Node::Raw(_) => {}
        }
    }
}
