//! Prefix-search index over the catalog.
//!
//! A rebuild constructs a fresh [`PrefixTrie`] and [`InvertedIndex`] off to
//! the side and publishes them as an immutable [`IndexSnapshot`]; readers
//! hold an `Arc` to the snapshot and are never blocked by a rebuild.

pub mod inverted;
pub mod snapshot;
pub mod trie;
pub mod wire;

pub use inverted::InvertedIndex;
pub use snapshot::{IndexSnapshot, SearchIndexStore};
pub use trie::PrefixTrie;

use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid token regex"));

/// Split text into lower-cased alphanumeric runs.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_splits_on_punctuation() {
        assert_eq!(
            tokenize("The Wizard-of OZ, 2nd ed."),
            vec!["the", "wizard", "of", "oz", "2nd", "ed"]
        );
    }

    #[test]
    fn test_tokenize_empty_text() {
        assert!(tokenize("  ...  ").is_empty());
    }
}
