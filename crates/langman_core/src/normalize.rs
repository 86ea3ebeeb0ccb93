//! Case and accent folding.
//!
//! Letters are compared after lowercasing, canonical decomposition (NFD) and
//! removal of combining marks, so `É`, `é` and `e` all fold to `e`.

use std::str::FromStr;

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::GuessError;

/// Folds a single character to its base lowercase letter.
///
/// Returns `None` when nothing but combining marks remain.
pub fn fold_char(c: char) -> Option<char> {
    c.to_lowercase().nfd().find(|c| !is_combining_mark(*c))
}

/// Folds a whole string. Used for guessed-letter sets and secret word lookups.
#[instrument]
pub fn fold(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// A validated, folded guess letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Letter(char);

impl Letter {
    /// Parses user input into a letter.
    ///
    /// Surrounding whitespace is ignored. The remainder must fold to exactly
    /// one alphabetic character.
    ///
    /// # Errors
    ///
    /// Returns [`GuessError::InvalidLetter`] for empty input, several
    /// characters, digits or punctuation.
    #[instrument]
    pub fn parse(input: &str) -> Result<Self, GuessError> {
        let folded = fold(input.trim());
        let mut chars = folded.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_alphabetic() => Ok(Self(c)),
            _ => Err(GuessError::InvalidLetter {
                input: input.to_string(),
            }),
        }
    }

    /// Returns the folded character.
    pub fn as_char(self) -> char {
        self.0
    }

    /// Returns `true` if `c` folds to this letter.
    pub fn matches(self, c: char) -> bool {
        fold_char(c) == Some(self.0)
    }
}

impl FromStr for Letter {
    type Err = GuessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Letter {
    type Error = GuessError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Letter> for String {
    fn from(letter: Letter) -> Self {
        letter.0.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_strips_accents_and_case() {
        assert_eq!(fold("Été"), "ete");
        assert_eq!(fold("niño"), "nino");
        assert_eq!(fold("garçon"), "garcon");
        assert_eq!(fold("plain"), "plain");
    }

    #[test]
    fn test_fold_char() {
        assert_eq!(fold_char('Á'), Some('a'));
        assert_eq!(fold_char('ü'), Some('u'));
        assert_eq!(fold_char('x'), Some('x'));
        assert_eq!(fold_char('\u{0301}'), None);
    }

    #[test]
    fn test_parse_letter() {
        assert_eq!(Letter::parse("a").map(Letter::as_char), Ok('a'));
        assert_eq!(Letter::parse(" B ").map(Letter::as_char), Ok('b'));
        assert_eq!(Letter::parse("é").map(Letter::as_char), Ok('e'));
        assert_eq!(Letter::parse("Ñ").map(Letter::as_char), Ok('n'));
    }

    #[test]
    fn test_parse_rejects_non_letters() {
        for input in ["", "  ", "ab", "1", "-", "?!"] {
            assert!(
                matches!(Letter::parse(input), Err(GuessError::InvalidLetter { .. })),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_matches_accented() {
        let e = Letter::parse("e").expect("valid letter");
        assert!(e.matches('é'));
        assert!(e.matches('È'));
        assert!(!e.matches('a'));
    }

    #[test]
    fn test_serde_uses_string() {
        let letter: Letter = serde_json::from_str("\"Ç\"").expect("deserialize");
        assert_eq!(letter.as_char(), 'c');
        assert_eq!(serde_json::to_string(&letter).expect("serialize"), "\"c\"");
        assert!(serde_json::from_str::<Letter>("\"12\"").is_err());
    }
}
