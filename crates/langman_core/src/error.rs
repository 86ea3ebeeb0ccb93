//! Errors raised while evaluating a guess.

use derive_more::{Display, Error};

use crate::{Letter, Outcome};

/// Reasons a guess cannot be applied to a game.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum GuessError {
    /// The input does not normalize to exactly one alphabetic character.
    #[display("'{input}' is not a single letter")]
    InvalidLetter {
        /// Raw input as received.
        input: String,
    },
    /// The letter (after normalization) was guessed before.
    #[display("letter '{letter}' has already been guessed")]
    AlreadyGuessed {
        /// The normalized letter.
        letter: Letter,
    },
    /// The game already has a resolved outcome.
    #[display("game is already over ({outcome})")]
    GameOver {
        /// The resolved outcome.
        outcome: Outcome,
    },
}
