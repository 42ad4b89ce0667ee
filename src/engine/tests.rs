//! Cross-component tests: patterns through catalog, closest match and hints.

use crate::{
    AlternateAnswerCatalog, AnswerPattern, CompletionStatus, ErrorCode, Fraction, HintMode, HintState, HintUnit,
    MarkKind, MatchOptions, ValidationError, apply_hint, build_catalog, closest, closest_verbose_with, expand,
    validate,
};
use proptest::prelude::*;

fn catalog_of(patterns: &[(&str, f64)]) -> AlternateAnswerCatalog {
    let answers: Vec<AnswerPattern> =
        patterns.iter().map(|(text, fraction)| AnswerPattern::new(*text, Fraction::new(*fraction).unwrap())).collect();
    build_catalog(&answers).unwrap()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn gray_or_grey() {
    let pattern = validate("gr(a|e)y").unwrap();
    let texts: Vec<String> = expand(&pattern, Fraction::FULL).unwrap().into_iter().map(|a| a.text).collect();
    assert_eq!(texts, vec!["gray", "grey"]);

    let catalog = catalog_of(&[("gray", 1.0), ("gr(a|e)y", 1.0)]);
    let result = closest("gray", &catalog, &HintState::none());
    assert_eq!(result.matched_answer, "gray");
    assert_eq!(result.completion, CompletionStatus::Complete);
    assert_eq!(result.error_code, ErrorCode::None);
    assert_eq!(result.corrected_prefix, "gray");
    assert_eq!(result.highlighted_fix, "");
}

#[test]
fn permuted_colours() {
    let pattern = validate("[[red_blue]] car").unwrap();
    let texts: Vec<String> = expand(&pattern, Fraction::FULL).unwrap().into_iter().map(|a| a.text).collect();
    assert_eq!(texts, vec!["red blue car", "blue red car"]);

    let catalog = catalog_of(&[("red blue car", 1.0), ("[[red_blue]] car", 1.0)]);
    let result = closest("blue red car", &catalog, &HintState::none());
    assert_eq!(result.matched_answer, "blue red car");
    assert_eq!((result.rank, result.order), (2, 1));
    assert_eq!(result.completion, CompletionStatus::Complete);
    assert_eq!(result.error_code, ErrorCode::None);
}

#[test]
fn unbalanced_parenthesis_is_named() {
    let err = validate("th(e|is").unwrap_err();
    assert_eq!(err, ValidationError::UnbalancedOpen { token: "(".into(), position: 2 });
    assert!(err.to_string().contains("`(`"));
}

#[test]
fn misspelt_word_is_wrong_not_misplaced() {
    let catalog = catalog_of(&[("the quick brown fox", 1.0)]);
    let result = closest("the quikc brown fox", &catalog, &HintState::none());
    assert_eq!(result.error_code, ErrorCode::Wrong);
    assert_eq!(result.error_code.legacy(), 10);
    assert_eq!(result.completion, CompletionStatus::Partial);
    assert_eq!(result.corrected_prefix, "the");
    assert_eq!(result.highlighted_fix, "quick");
    assert_eq!(result.remaining_suffix, "brown fox");
    assert_eq!(result.words_marked(MarkKind::Wrong).collect::<Vec<_>>(), vec!["quikc"]);
}

#[test]
fn swapped_and_wrong_words_give_both() {
    let catalog = catalog_of(&[("the quick brown fox", 1.0)]);
    let result = closest("the brown quick dog", &catalog, &HintState::none());
    assert_eq!(result.error_code, ErrorCode::Both);
    assert_eq!(result.error_code.legacy(), 11);

    let swapped = closest("the brown quick fox", &catalog, &HintState::none());
    assert_eq!(swapped.error_code, ErrorCode::Misplaced);
}

#[test]
fn nonsense_still_gets_a_result() {
    let catalog = catalog_of(&[("the quick brown fox", 1.0)]);
    let result = closest("zzz yyy", &catalog, &HintState::none());
    assert_eq!(result.matched_answer, "the quick brown fox");
    assert_eq!(result.completion, CompletionStatus::Partial);
    assert_eq!(result.error_code, ErrorCode::Wrong);
    assert_eq!(result.corrected_prefix, "");
    assert_eq!(result.highlighted_fix, "the");
}

#[test]
fn equal_distance_prefers_earlier_rank() {
    let catalog = catalog_of(&[("a cat sat", 1.0), ("a dog sat", 1.0), ("a (cow|cat) sat", 0.5)]);
    let result = closest("a bat sat", &catalog, &HintState::none());
    assert_eq!((result.rank, result.order), (1, 0));

    let result = closest("a cow", &catalog, &HintState::none());
    assert_eq!((result.rank, result.order), (3, 0));
}

#[test]
fn case_and_spacing_do_not_matter_by_default() {
    let catalog = catalog_of(&[("The Quick fox", 1.0)]);
    let result = closest("  the   quick FOX ", &catalog, &HintState::none());
    assert!(result.is_complete());
    assert_eq!(result.response, "the quick FOX");
    assert_eq!(result.matched_answer, "The Quick fox");

    let strict = MatchOptions { case_sensitive: true, ..MatchOptions::default() };
    let result = crate::closest_with("the quick fox", &catalog, &HintState::none(), &strict);
    assert_eq!(result.error_code, ErrorCode::Wrong);
}

#[test]
fn typing_in_progress_is_not_an_error() {
    let catalog = catalog_of(&[("the quick brown fox", 1.0)]);
    let result = closest("the quick br", &catalog, &HintState::none());
    assert_eq!(result.error_code, ErrorCode::None);
    assert_eq!(result.corrected_prefix, "the quick");
    assert_eq!(result.highlighted_fix, "brown");
    assert_eq!(result.marks.last().map(|m| m.kind), Some(MarkKind::Incomplete));
}

#[test]
fn hint_on_two_word_prefix_is_idempotent() {
    let catalog = catalog_of(&[("the quick brown fox", 1.0)]);
    let before = closest("the quick brwn", &catalog, &HintState::none());
    assert_eq!(before.corrected_prefix, "the quick");

    let hint = HintState::new(1, HintMode::Adaptive, HintUnit::Word);
    let first = apply_hint(&before, &hint);
    let second = apply_hint(&before, &hint);
    assert_eq!(first, "the quick brown");
    assert_eq!(first, second);

    let rescored = closest("the quick brwn", &catalog, &hint);
    assert_eq!(rescored.response, first);
    assert_eq!(rescored, closest("the quick brwn", &catalog, &hint));
    assert_eq!(rescored.error_code, ErrorCode::None);
    assert_eq!(rescored.highlighted_fix, "fox");
}

#[test]
fn hint_keeps_the_matched_candidate() {
    // The letters bought complete "a b c", not the longer rank-2 answer.
    let catalog = catalog_of(&[("a b c", 1.0), ("a b d e", 0.5)]);
    let hint = HintState::new(2, HintMode::AdaptiveNoPenalty, HintUnit::Letter);
    let result = closest("a b x", &catalog, &hint);
    assert_eq!(result.rank, 1);
    assert_eq!(result.response, "a b c");
    assert!(result.is_complete());
}

#[test]
fn complete_response_ignores_hints() {
    let catalog = catalog_of(&[("gray", 1.0)]);
    let hint = HintState::new(3, HintMode::Adaptive, HintUnit::Letter);
    let result = closest("GRAY", &catalog, &hint);
    assert!(result.is_complete());
    assert_eq!(result.response, "gray");
}

#[test]
fn blank_response_points_at_the_shortest_answer() {
    let catalog = catalog_of(&[("the quick brown fox", 1.0), ("a fox", 0.5)]);
    for response in ["", "   \t "] {
        let result = closest(response, &catalog, &HintState::none());
        assert_eq!(result.response, "");
        assert!(result.marks.is_empty());
        assert_eq!((result.rank, result.order, result.distance), (2, 0, 2));
        assert_eq!(result.completion, CompletionStatus::Partial);
        assert_eq!(result.error_code, ErrorCode::None);
        assert_eq!(result.corrected_prefix, "");
        assert_eq!(result.highlighted_fix, "a");
        assert_eq!(result.remaining_suffix, "fox");

        let hint = HintState::new(1, HintMode::Adaptive, HintUnit::Word);
        assert_eq!(apply_hint(&result, &hint), "a");

        let hinted = closest(response, &catalog, &hint);
        assert_eq!(hinted.response, "a");
        assert_eq!(hinted.corrected_prefix, "a");
        assert_eq!(hinted.highlighted_fix, "fox");
    }
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_word() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

/// One choice point or literal run of a graded pattern.
fn arb_segment() -> impl Strategy<Value = String> {
    prop_oneof![
        arb_word(),
        prop::collection::vec(arb_word(), 2..4).prop_map(|alts| format!("({})", alts.join("|"))),
        ("[a-z]{1,3}", "[a-e]{2,3}").prop_map(|(word, class)| format!("{word}[{class}]")),
        "[a-z]{2,5}".prop_map(|word| format!("{word}?")),
    ]
}

fn arb_permutation() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_word(), 2..4).prop_map(|items| format!("[[{}]]", items.join("_")))
}

fn arb_pattern() -> impl Strategy<Value = String> {
    (prop::collection::vec(arb_segment(), 1..4), prop::collection::vec(arb_permutation(), 0..3)).prop_map(
        |(segments, groups)| segments.into_iter().chain(groups).collect::<Vec<_>>().join(" "),
    )
}

/// Wrapped permutation group with an odd number of underscores.
fn arb_odd_group() -> impl Strategy<Value = String> {
    (prop::collection::vec(arb_word(), 1..4), arb_word()).prop_map(|(items, dangling)| {
        let paired: Vec<String> = items.iter().map(|w| format!("_{w}_")).collect();
        format!("[[{} _{dangling}]]", paired.join(" and "))
    })
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Expanding the same pattern twice yields the same sequence.
    #[test]
    fn expansion_is_deterministic(raw in arb_pattern()) {
        let pattern = validate(&raw).unwrap();
        let first = expand(&pattern, Fraction::FULL).unwrap();
        let again = expand(&validate(&raw).unwrap(), Fraction::FULL).unwrap();
        prop_assert_eq!(&first, &expand(&pattern, Fraction::FULL).unwrap());
        prop_assert_eq!(first, again);
    }

    /// Every expansion, fed back as a response, is a complete error-free match.
    #[test]
    fn expansions_match_themselves(raw in arb_pattern()) {
        let catalog = catalog_of(&[("zzzz", 1.0), (raw.as_str(), 1.0)]);
        for answer in catalog.ranks()[1].answers.iter().take(24) {
            let result = closest(&answer.text, &catalog, &HintState::none());
            prop_assert_eq!(result.completion, CompletionStatus::Complete);
            prop_assert_eq!(result.error_code, ErrorCode::None);
        }
    }

    #[test]
    fn odd_underscores_are_refused(group in arb_odd_group(), prefix in arb_word()) {
        let raw = format!("{prefix} {group}");
        let is_odd = matches!(validate(&raw), Err(ValidationError::OddUnderscoreCount { .. }));
        prop_assert!(is_odd);
    }

    #[test]
    fn more_than_two_groups_are_refused(groups in prop::collection::vec(arb_permutation(), 3..5)) {
        let too_many = matches!(validate(&groups.join(" ")), Err(ValidationError::TooManyPermutationGroups { .. }));
        prop_assert!(too_many);
    }

    /// The selected candidate is the first of the (distance, rank, order) ranking.
    #[test]
    fn ties_break_on_rank_then_order(
        words in prop::collection::vec(prop_oneof![Just("red"), Just("blue"), Just("car"), Just("bike")], 0..4),
    ) {
        let catalog = catalog_of(&[("red car", 1.0), ("[[red_blue]] car", 0.9), ("(red|blue) bike", 0.5)]);
        let res = closest_verbose_with(&words.join(" "), &catalog, &HintState::none(), &MatchOptions::default());
        let best = &res.details.ranking[0];
        prop_assert_eq!((best.rank, best.order), (res.result.rank, res.result.order));
        prop_assert_eq!(best.distance, res.result.distance);
    }

    /// Buying more words never loses corrected words.
    #[test]
    fn hints_make_monotonic_progress(
        words in prop::collection::vec(
            prop_oneof![Just("the"), Just("quick"), Just("brown"), Just("fox"), Just("dog")],
            0..5,
        ),
    ) {
        let catalog = catalog_of(&[("the quick brown fox", 1.0)]);
        let response = words.join(" ");
        let base = closest(&response, &catalog, &HintState::none());

        let mut previous = String::new();
        for revealed in 1..=5 {
            let hint = HintState::new(revealed, HintMode::Adaptive, HintUnit::Word);
            let effective = apply_hint(&base, &hint);
            prop_assert!(effective.starts_with(&previous));
            prop_assert!(effective.starts_with(&base.corrected_prefix));

            let rescored = closest(&response, &catalog, &hint);
            prop_assert_eq!(rescored.error_code, ErrorCode::None);
            prop_assert!(rescored.corrected_prefix.len() >= base.corrected_prefix.len());
            previous = effective;
        }
    }
}
