// Sentence segmentation - split extracted text into displayable sentences
//
// Splitting is naive: any run of `.`, `!` or `?` ends a sentence,
// so "Mr. Smith" becomes two sentences. Abbreviations and decimals are not
// special-cased.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::sync::Arc;

static TERMINATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

/// A trimmed, non-empty fragment ending in exactly one `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sentence(String);

impl Sentence {
    fn from_fragment(fragment: &str) -> Option<Self> {
        let trimmed = fragment.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(format!("{}.", trimmed)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Sentence {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Sentence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, immutable batch of sentences from one source text.
///
/// Cloning shares the underlying storage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SentenceList(Arc<[Sentence]>);

impl SentenceList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Sentence> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sentence> {
        self.0.iter()
    }

    /// Sentences as plain strings, mostly for assertions and printing.
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(|s| s.0.clone()).collect()
    }
}

impl FromIterator<Sentence> for SentenceList {
    fn from_iter<I: IntoIterator<Item = Sentence>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a SentenceList {
    type Item = &'a Sentence;
    type IntoIter = std::slice::Iter<'a, Sentence>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Split `text` on every maximal run of sentence terminators.
pub fn segment(text: &str) -> SentenceList {
    TERMINATORS
        .split(text)
        .filter_map(Sentence::from_fragment)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", &[])]
    #[case("   ", &[])]
    #[case("\n\t ", &[])]
    #[case("Hello world", &["Hello world."])]
    #[case("  Hello world  ", &["Hello world."])]
    #[case("Hi! How are you? Fine.", &["Hi.", "How are you.", "Fine."])]
    #[case("Wait... really?!", &["Wait.", "really."])]
    #[case("Mr. Smith", &["Mr.", "Smith."])]
    #[case("...!?", &[])]
    #[case("One.\n\nTwo", &["One.", "Two."])]
    fn segments(#[case] input: &str, #[case] expected: &[&str]) {
        assert_eq!(segment(input).to_strings(), expected);
    }

    #[test]
    fn sentence_derefs_to_str() {
        let list = segment("Alpha beta. Gamma");
        assert_eq!(list.len(), 2);
        assert!(list.get(0).unwrap().starts_with("Alpha"));
        assert_eq!(list.get(1).map(|s| s.as_str()), Some("Gamma."));
        assert!(list.get(2).is_none());
    }

    #[test]
    fn clones_share_storage() {
        let list = segment("A. B. C.");
        let copy = list.clone();
        assert!(Arc::ptr_eq(&list.0, &copy.0));
    }
}
