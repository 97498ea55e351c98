// Segmenter behaviour over arbitrary input
use proptest::prelude::*;
use readerchunks::segment;
use rstest::rstest;

#[rstest]
#[case("Hello world. This is a test!", &["Hello world.", "This is a test."])]
#[case("One? Two. Three!", &["One.", "Two.", "Three."])]
#[case("Wait... really?!", &["Wait.", "really."])]
#[case("   ", &[])]
#[case("", &[])]
#[case("No terminator at all", &["No terminator at all."])]
fn documented_cases(#[case] input: &str, #[case] expected: &[&str]) {
    assert_eq!(segment(input).to_strings(), expected);
}

proptest! {
    #[test]
    fn sentences_are_never_empty(text in ".{0,200}") {
        for sentence in segment(&text).iter() {
            prop_assert!(sentence.as_str().trim_end_matches('.').trim() != "");
        }
    }

    #[test]
    fn each_sentence_ends_with_one_period(text in "[a-zA-Z .!?\n]{0,200}") {
        for sentence in segment(&text).iter() {
            let s = sentence.as_str();
            prop_assert!(s.ends_with('.'));
            prop_assert!(!s.ends_with(".."));
            prop_assert!(!s.contains('!') && !s.contains('?'));
        }
    }

    #[test]
    fn terminators_only_yield_nothing(text in "[.!? \t\n]{0,50}") {
        prop_assert!(segment(&text).is_empty());
    }
}
