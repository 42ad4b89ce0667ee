//! Whitespace normalization and word/unit splitting.
//!
//! The same `normalize_whitespace` runs over expanded answers and over student
//! responses, so equal sentences compare equal regardless of how they were
//! typed.

use super::hint::HintUnit;
use std::borrow::Cow;

/// Trim and collapse every whitespace run to a single space.
pub fn normalize_whitespace(text: &str) -> String {
    regex!(r"\s+").replace_all(text.trim(), " ").into_owned()
}

/// Words of an already normalized string.
pub(crate) fn words(normalized: &str) -> Vec<&str> {
    normalized.split(' ').filter(|w| !w.is_empty()).collect()
}

/// Comparison key for a word.
pub(crate) fn fold(word: &str, case_sensitive: bool) -> Cow<'_, str> {
    if case_sensitive { Cow::Borrowed(word) } else { Cow::Owned(word.to_lowercase()) }
}

/// Byte offsets at which each hint unit of `text` ends.
///
/// ```text
/// text: "brown fox."
/// Letter            -> b r o w n f o x .   (9 ends)
/// Word              -> "brown" "fox."       (2 ends)
/// WordOrPunctuation -> "brown" "fox" "."    (3 ends)
/// ```
pub(crate) fn unit_ends(text: &str, unit: HintUnit) -> Vec<usize> {
    let mut ends = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        let end = idx + ch.len_utf8();
        if ch.is_whitespace() {
            continue;
        }
        match unit {
            HintUnit::Letter => ends.push(end),
            HintUnit::Word => {
                if chars.peek().is_none_or(|(_, next)| next.is_whitespace()) {
                    ends.push(end);
                }
            }
            HintUnit::WordOrPunctuation => {
                let in_word = is_word_char(ch);
                let continues = chars.peek().is_some_and(|(_, next)| in_word && is_word_char(*next));
                if !continues {
                    ends.push(end);
                }
            }
        }
    }
    ends
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '\''
}
