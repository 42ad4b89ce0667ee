//! Recursive-descent parser for the answer-pattern dialect.
//!
//! The parser is permissive about regex metacharacters: it records them (and
//! keeps them as `Node::Raw`) instead of failing, so the same parse serves both
//! graded answers, where `validate.rs` refuses them, and ungraded answers, where
//! they are handed to the regex engine untouched.
//!
//! Structural problems (unbalanced delimiters, malformed permutation groups)
//! are errors here, reported with the exact delimiter text and byte offset.
//!
//! ## Permutation groups
//!
//! ```text
//! wrapped:  [[_Tom_ and _Jerry_]]   items between underscore pairs,
//!                                   glue text stays in place
//! bare:     [[red_blue_green]]      no whitespace, no leading `_`:
//!                                   every token is an item, joined by " "
//! ```
//!
//! A wrapped group needs an even number of underscores. Underscores nested in
//! parentheses or classes are plain text, not separators.

use super::ast::{GroupKind, GroupSpan, Metachar, Node, PermutationGroup, Sequence, Span};
use crate::ValidationError;

/// Characters that only make sense to a regex engine.
pub(crate) const METACHARACTERS: &[char] = &['.', '^', '$', '*', '+', '{', '}'];

/// Largest character range accepted inside a class (`[a-z]` is 26).
const MAX_CLASS_RANGE: u32 = 256;

/// Most permutation groups one pattern may carry.
pub(crate) const MAX_PERMUTATION_GROUPS: usize = 2;

/// Output of [`parse`]: the tree plus everything noticed on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPattern {
    pub source: String,
    pub root: Sequence,
    pub metacharacters: Vec<Metachar>,
    pub groups: Vec<GroupSpan>,
}

/// Parse `source` into a [`ParsedPattern`].
pub fn parse(source: &str) -> Result<ParsedPattern, ValidationError> {
    let mut parser = PatternParser::new(source);
    let branches = parser.parse_alternation(0)?;

    if let Some(ch) = parser.peek() {
        // Only a `)` stops the top-level alternation early.
        return Err(ValidationError::UnbalancedClose { token: ch.to_string(), position: parser.byte(parser.pos) });
    }

    if parser.permutation_count > MAX_PERMUTATION_GROUPS {
        return Err(ValidationError::TooManyPermutationGroups { count: parser.permutation_count });
    }

    parser.groups.sort_by_key(|g| (g.span.start, g.span.end));

    Ok(ParsedPattern {
        source: source.to_string(),
        root: sequence_from_branches(branches),
        metacharacters: parser.metacharacters,
        groups: parser.groups,
    })
}

fn sequence_from_branches(mut branches: Vec<Sequence>) -> Sequence {
    if branches.len() == 1 {
        branches.pop().unwrap_or_default()
    } else {
        Sequence { nodes: vec![Node::Alternation(branches)] }
    }
}

struct PatternParser<'a> {
    src: &'a str,
    chars: Vec<(usize, char)>,
    /// Index into `chars`.
    pos: usize,
    /// Exclusive upper bound of the region being parsed.
    end: usize,
    in_permutation: bool,
    metacharacters: Vec<Metachar>,
    groups: Vec<GroupSpan>,
    permutation_count: usize,
}

impl<'a> PatternParser<'a> {
    fn new(src: &'a str) -> Self {
        let chars: Vec<(usize, char)> = src.char_indices().collect();
        let end = chars.len();
        PatternParser {
            src,
            chars,
            pos: 0,
            end,
            in_permutation: false,
            metacharacters: Vec::new(),
            groups: Vec::new(),
            permutation_count: 0,
        }
    }

    /// Byte offset of char index `idx` (or the end of the source).
    fn byte(&self, idx: usize) -> usize {
        self.chars.get(idx).map(|(b, _)| *b).unwrap_or(self.src.len())
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        let idx = self.pos + offset;
        if idx < self.end { self.chars.get(idx).map(|(_, c)| *c) } else { None }
    }

    /// `seq ('|' seq)*`, stopping before a `)` or the end of the region.
    fn parse_alternation(&mut self, depth: usize) -> Result<Vec<Sequence>, ValidationError> {
        let mut branches = vec![self.parse_sequence(depth)?];
        while self.peek() == Some('|') {
            self.pos += 1;
            branches.push(self.parse_sequence(depth)?);
        }
        Ok(branches)
    }

    fn parse_sequence(&mut self, depth: usize) -> Result<Sequence, ValidationError> {
        let mut seq = Sequence::default();

        while let Some(ch) = self.peek() {
            let here = self.byte(self.pos);
            match ch {
                '|' | ')' => break,
                '(' => {
                    let node = self.parse_group(depth)?;
                    seq.nodes.push(node);
                }
                '[' if self.peek_at(1) == Some('[') => {
                    let node = self.parse_permutation()?;
                    seq.nodes.push(node);
                }
                '[' => {
                    let node = self.parse_class()?;
                    seq.nodes.push(node);
                }
                ']' => {
                    let token = if self.peek_at(1) == Some(']') { "]]" } else { "]" };
                    return Err(ValidationError::UnbalancedClose { token: token.to_string(), position: here });
                }
                '\\' => {
                    self.pos += 1;
                    let escaped = self.peek().ok_or(ValidationError::DanglingEscape { position: here })?;
                    self.pos += 1;
                    seq.push_char(escaped);
                }
                '?' => {
                    self.pos += 1;
                    let atom = seq.pop_atom().ok_or(ValidationError::DanglingQuantifier { position: here })?;
                    seq.nodes.push(Node::Optional(Box::new(atom)));
                }
                c if METACHARACTERS.contains(&c) => {
                    self.pos += 1;
                    self.metacharacters.push(Metachar { position: here, ch: c });
                    seq.nodes.push(Node::Raw(c.to_string()));
                }
                c => {
                    self.pos += 1;
                    seq.push_char(c);
                }
            }
        }

        Ok(seq)
    }

    fn parse_group(&mut self, depth: usize) -> Result<Node, ValidationError> {
        let open = self.byte(self.pos);
        self.pos += 1;
        let branches = self.parse_alternation(depth + 1)?;
        if self.peek() != Some(')') {
            return Err(ValidationError::UnbalancedOpen { token: "(".to_string(), position: open });
        }
        self.pos += 1;
        self.groups.push(GroupSpan { kind: GroupKind::Paren, span: Span { start: open, end: self.byte(self.pos) } });
        Ok(Node::Alternation(branches))
    }

    fn parse_class(&mut self) -> Result<Node, ValidationError> {
        let open_idx = self.pos;
        let open = self.byte(open_idx);
        self.pos += 1;

        match self.peek() {
            Some(']') => return Err(ValidationError::EmptyCharacterClass { position: open }),
            Some('^') => {
                self.metacharacters.push(Metachar { position: self.byte(self.pos), ch: '^' });
                return self.parse_negated_class(open_idx);
            }
            _ => {}
        }

        let mut chars: Vec<char> = Vec::new();
        loop {
            let ch =
                self.peek().ok_or_else(|| ValidationError::UnbalancedOpen { token: "[".to_string(), position: open })?;
            if ch == ']' {
                self.pos += 1;
                break;
            }
            let lo = self.class_char(open)?;

            let is_range = self.peek() == Some('-') && self.peek_at(1).is_some_and(|c| c != ']');
            if !is_range {
                chars.push(lo);
                continue;
            }

            let range_start = self.pos;
            self.pos += 1;
            let hi = self.class_char(open)?;
            if lo > hi || (hi as u32 - lo as u32) >= MAX_CLASS_RANGE {
                return Err(ValidationError::InvalidClassRange {
                    range: format!("{lo}-{hi}"),
                    position: self.byte(range_start),
                });
            }
            chars.extend(lo..=hi);
        }

        let mut seen = std::collections::HashSet::new();
        chars.retain(|c| seen.insert(*c));

        self.groups.push(GroupSpan { kind: GroupKind::Class, span: Span { start: open, end: self.byte(self.pos) } });
        Ok(Node::Class(chars))
    }

    /// One (possibly escaped) class member.
    fn class_char(&mut self, open: usize) -> Result<char, ValidationError> {
        let unclosed = || ValidationError::UnbalancedOpen { token: "[".to_string(), position: open };
        let ch = self.peek().ok_or_else(unclosed)?;
        self.pos += 1;
        if ch != '\\' {
            return Ok(ch);
        }
        let escaped = self.peek().ok_or(ValidationError::DanglingEscape { position: self.byte(self.pos - 1) })?;
        self.pos += 1;
        Ok(escaped)
    }

    /// `[^...]` has no finite expansion; keep its source text for the regex.
    fn parse_negated_class(&mut self, open_idx: usize) -> Result<Node, ValidationError> {
        let open = self.byte(open_idx);
        loop {
            match self.peek() {
                None => return Err(ValidationError::UnbalancedOpen { token: "[".to_string(), position: open }),
                Some('\\') => self.pos += 2,
                Some(']') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        let close = self.byte(self.pos);
        self.groups.push(GroupSpan { kind: GroupKind::Class, span: Span { start: open, end: close } });
        Ok(Node::Raw(self.src[open..close].to_string()))
    }

    fn parse_permutation(&mut self) -> Result<Node, ValidationError> {
        let open_idx = self.pos;
        let open = self.byte(open_idx);
        if self.in_permutation {
            return Err(ValidationError::NestedPermutationGroup { position: open });
        }

        let close_idx = self.find_permutation_close(open_idx)?;
        let segments = self.split_segments(open_idx + 2, close_idx);
        let separator_count = segments.len() - 1;
        if separator_count == 0 {
            return Err(ValidationError::EmptyPermutationGroup { position: open });
        }

        let content = &self.src[self.byte(open_idx + 2)..self.byte(close_idx)];
        let bare = !content.starts_with('_') && !content.chars().any(char::is_whitespace);
        if !bare && separator_count % 2 == 1 {
            return Err(ValidationError::OddUnderscoreCount { count: separator_count, position: open });
        }

        let mut parsed = Vec::with_capacity(segments.len());
        for &(start, end) in &segments {
            let text = self.src[self.byte(start)..self.byte(end)].to_string();
            let seq = self.parse_region(start, end)?;
            parsed.push((text, seq));
        }

        let mut tokens = Vec::new();
        let mut items = Vec::new();
        let mut glue = Vec::new();
        if bare {
            glue.push(Sequence::default());
            for (idx, (text, seq)) in parsed.into_iter().enumerate() {
                if idx > 0 {
                    glue.push(Sequence { nodes: vec![Node::Literal(" ".to_string())] });
                }
                tokens.push(text);
                items.push(seq);
            }
            glue.push(Sequence::default());
        } else {
            for (idx, (text, seq)) in parsed.into_iter().enumerate() {
                if idx % 2 == 0 {
                    glue.push(seq);
                } else {
                    tokens.push(text);
                    items.push(seq);
                }
            }
        }

        if tokens.iter().any(|t| t.trim().is_empty()) {
            return Err(ValidationError::EmptyPermutationGroup { position: open });
        }

        self.pos = close_idx + 2;
        self.permutation_count += 1;
        let span = Span { start: open, end: self.byte(self.pos) };
        self.groups.push(GroupSpan { kind: GroupKind::Permutation, span });

        Ok(Node::Permutation(PermutationGroup { tokens, separator_count, items, glue, span }))
    }

    /// Index of the first `]` of the closing `]]`.
    fn find_permutation_close(&self, open_idx: usize) -> Result<usize, ValidationError> {
        let at = |idx: usize| if idx < self.end { self.chars.get(idx).map(|(_, c)| *c) } else { None };
        let mut idx = open_idx + 2;
        let mut in_class = false;

        while let Some(ch) = at(idx) {
            match ch {
                '\\' => {
                    idx += 2;
                    continue;
                }
                '[' if !in_class && at(idx + 1) == Some('[') => {
                    return Err(ValidationError::NestedPermutationGroup { position: self.byte(idx) });
                }
                '[' if !in_class => in_class = true,
                ']' if in_class => in_class = false,
                ']' if at(idx + 1) == Some(']') => return Ok(idx),
                _ => {}
            }
            idx += 1;
        }

        Err(ValidationError::UnbalancedOpen { token: "[[".to_string(), position: self.byte(open_idx) })
    }

    /// Split `[start, end)` at top-level, unescaped underscores.
    fn split_segments(&self, start: usize, end: usize) -> Vec<(usize, usize)> {
        let mut segments = Vec::new();
        let mut seg_start = start;
        let mut depth = 0usize;
        let mut in_class = false;
        let mut idx = start;

        while idx < end {
            match self.chars[idx].1 {
                '\\' => {
                    idx += 2;
                    continue;
                }
                '[' if !in_class => in_class = true,
                ']' if in_class => in_class = false,
                '(' if !in_class => depth += 1,
                ')' if !in_class => depth = depth.saturating_sub(1),
                '_' if !in_class && depth == 0 => {
                    segments.push((seg_start, idx));
                    seg_start = idx + 1;
                }
                _ => {}
            }
            idx += 1;
        }
        segments.push((seg_start, end.max(seg_start)));
        segments
    }

    /// Parse the sub-range `[start, end)` as a standalone sequence.
    fn parse_region(&mut self, start: usize, end: usize) -> Result<Sequence, ValidationError> {
        let saved = (self.pos, self.end, self.in_permutation);
        self.pos = start;
        self.end = end;
        self.in_permutation = true;

        let result = self.parse_alternation(0).and_then(|branches| match self.peek() {
            Some(ch) => Err(ValidationError::UnbalancedClose { token: ch.to_string(), position: self.byte(self.pos) }),
            None => Ok(sequence_from_branches(branches)),
        });

        (self.pos, self.end, self.in_permutation) = saved;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> Node {
        Node::Literal(s.to_string())
    }

    fn seq(nodes: Vec<Node>) -> Sequence {
        Sequence { nodes }
    }

    #[test]
    fn parses_alternation_group() {
        let parsed = parse("gr(a|e)y").unwrap();
        assert_eq!(
            parsed.root.nodes,
            vec![lit("gr"), Node::Alternation(vec![seq(vec![lit("a")]), seq(vec![lit("e")])]), lit("y")]
        );
        assert_eq!(parsed.groups, vec![GroupSpan { kind: GroupKind::Paren, span: Span { start: 2, end: 7 } }]);
    }

    #[test]
    fn top_level_alternation_wraps_root() {
        let parsed = parse("cat|dog").unwrap();
        assert_eq!(
            parsed.root.nodes,
            vec![Node::Alternation(vec![seq(vec![lit("cat")]), seq(vec![lit("dog")])])]
        );
    }

    #[test]
    fn optional_binds_to_last_char() {
        let parsed = parse("colou?r").unwrap();
        assert_eq!(parsed.root.nodes, vec![lit("colo"), Node::Optional(Box::new(lit("u"))), lit("r")]);
    }

    #[test]
    fn class_with_range_and_escape() {
        let parsed = parse(r"[a-c\]]").unwrap();
        assert_eq!(parsed.root.nodes, vec![Node::Class(vec!['a', 'b', 'c', ']'])]);
    }

    #[test]
    fn escaped_metacharacter_is_literal() {
        let parsed = parse(r"3\.5").unwrap();
        assert_eq!(parsed.root.nodes, vec![lit("3.5")]);
        assert!(parsed.metacharacters.is_empty());
    }

    #[test]
    fn records_metacharacters_as_raw() {
        let parsed = parse("a.*b").unwrap();
        assert_eq!(
            parsed.metacharacters,
            vec![Metachar { position: 1, ch: '.' }, Metachar { position: 2, ch: '*' }]
        );
        assert_eq!(parsed.root.nodes, vec![lit("a"), Node::Raw(".".into()), Node::Raw("*".into()), lit("b")]);
    }

    #[test]
    fn negated_class_is_raw() {
        let parsed = parse("[^ab]c").unwrap();
        assert_eq!(parsed.root.nodes, vec![Node::Raw("[^ab]".into()), lit("c")]);
        assert_eq!(parsed.metacharacters, vec![Metachar { position: 1, ch: '^' }]);
    }

    #[test]
    fn unbalanced_open_paren_names_token() {
        let err = parse("th(e|is").unwrap_err();
        assert_eq!(err, ValidationError::UnbalancedOpen { token: "(".into(), position: 2 });
        assert!(err.to_string().contains("`(`"));
    }

    #[test]
    fn unbalanced_close_paren_names_token() {
        let err = parse("the)").unwrap_err();
        assert_eq!(err, ValidationError::UnbalancedClose { token: ")".into(), position: 3 });
    }

    #[test]
    fn unbalanced_brackets() {
        assert_eq!(parse("[abc").unwrap_err(), ValidationError::UnbalancedOpen { token: "[".into(), position: 0 });
        assert_eq!(parse("abc]").unwrap_err(), ValidationError::UnbalancedClose { token: "]".into(), position: 3 });
        assert_eq!(parse("[[a_b]").unwrap_err(), ValidationError::UnbalancedOpen { token: "[[".into(), position: 0 });
        assert_eq!(parse("ab]]").unwrap_err(), ValidationError::UnbalancedClose { token: "]]".into(), position: 2 });
    }

    #[test]
    fn bare_permutation_group() {
        let parsed = parse("[[red_blue]] car").unwrap();
        let Node::Permutation(group) = &parsed.root.nodes[0] else { panic!("expected permutation") };
        assert_eq!(group.tokens, vec!["red", "blue"]);
        assert_eq!(group.separator_count, 1);
        assert_eq!(group.glue.len(), 3);
        assert_eq!(group.span, Span { start: 0, end: 12 });
        assert_eq!(parsed.root.nodes[1], lit(" car"));
    }

    #[test]
    fn wrapped_permutation_group_keeps_glue() {
        let parsed = parse("[[_Tom_ and _Jerry_]]").unwrap();
        let Node::Permutation(group) = &parsed.root.nodes[0] else { panic!("expected permutation") };
        assert_eq!(group.tokens, vec!["Tom", "Jerry"]);
        assert_eq!(group.separator_count, 4);
        assert_eq!(group.glue, vec![seq(vec![]), seq(vec![lit(" and ")]), seq(vec![])]);
    }

    #[test]
    fn underscores_inside_parens_are_not_separators() {
        let parsed = parse("[[_(a_b|c)_ _d_]]").unwrap();
        let Node::Permutation(group) = &parsed.root.nodes[0] else { panic!("expected permutation") };
        assert_eq!(group.tokens, vec!["(a_b|c)", "d"]);
    }

    #[test]
    fn odd_underscores_in_wrapped_group() {
        let err = parse("[[_Tom_ and _Jerry]]").unwrap_err();
        assert_eq!(err, ValidationError::OddUnderscoreCount { count: 3, position: 0 });
    }

    #[test]
    fn empty_permutation_group() {
        assert_eq!(parse("a [[b c]]").unwrap_err(), ValidationError::EmptyPermutationGroup { position: 2 });
        assert_eq!(parse("[[__ _b_]]").unwrap_err(), ValidationError::EmptyPermutationGroup { position: 0 });
    }

    #[test]
    fn too_many_permutation_groups() {
        let err = parse("[[a_b]] [[c_d]] [[e_f]]").unwrap_err();
        assert_eq!(err, ValidationError::TooManyPermutationGroups { count: 3 });
    }

    #[test]
    fn nested_permutation_group() {
        let err = parse("[[_a_ [[b_c]]]]").unwrap_err();
        assert_eq!(err, ValidationError::NestedPermutationGroup { position: 6 });
    }

    #[test]
    fn dangling_escape_and_quantifier() {
        assert_eq!(parse("ab\\").unwrap_err(), ValidationError::DanglingEscape { position: 2 });
        assert_eq!(parse("?ab").unwrap_err(), ValidationError::DanglingQuantifier { position: 0 });
        assert_eq!(parse("(?a)").unwrap_err(), ValidationError::DanglingQuantifier { position: 1 });
    }

    #[test]
    fn class_errors() {
        assert_eq!(parse("a[]").unwrap_err(), ValidationError::EmptyCharacterClass { position: 1 });
        assert_eq!(
            parse("[z-a]").unwrap_err(),
            ValidationError::InvalidClassRange { range: "z-a".into(), position: 2 }
        );
    }
}
