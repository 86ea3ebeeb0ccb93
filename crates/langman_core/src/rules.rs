//! Guess evaluation.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{GuessError, Letter, Outcome, fold_char};

/// Placeholder shown for letters not yet revealed.
pub const MASK: char = '_';

/// Bad guesses allowed before a game is lost.
pub const DEFAULT_MISS_LIMIT: u32 = 6;

/// Builds the reveal word for `secret_word` given the folded letters guessed
/// so far.
///
/// Letters keep their original case and accents. Characters that are not
/// letters (hyphens, apostrophes, spaces) are never masked. The result has
/// exactly as many characters as `secret_word`.
pub fn reveal(secret_word: &str, guessed: &str) -> String {
    secret_word
        .chars()
        .map(|c| {
            if !c.is_alphabetic() {
                return c;
            }
            match fold_char(c) {
                Some(base) if guessed.contains(base) => c,
                _ => MASK,
            }
        })
        .collect()
}

/// Mutable part of a game: what has been guessed and what is visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessState {
    guessed: String,
    reveal_word: String,
    bad_guesses: u32,
}

impl GuessState {
    /// Creates the state of a fresh game for `secret_word`.
    #[instrument]
    pub fn new(secret_word: &str) -> Self {
        Self {
            guessed: String::new(),
            reveal_word: reveal(secret_word, ""),
            bad_guesses: 0,
        }
    }

    /// Rebuilds a state from stored columns.
    pub fn from_parts(guessed: String, reveal_word: String, bad_guesses: u32) -> Self {
        Self {
            guessed,
            reveal_word,
            bad_guesses,
        }
    }

    /// Folded letters guessed so far, in guess order.
    pub fn guessed(&self) -> &str {
        &self.guessed
    }

    /// The secret word with unrevealed letters masked.
    pub fn reveal_word(&self) -> &str {
        &self.reveal_word
    }

    /// Number of guesses that matched nothing.
    pub fn bad_guesses(&self) -> u32 {
        self.bad_guesses
    }

    /// Returns `true` if `letter` was already guessed.
    pub fn has_guessed(&self, letter: Letter) -> bool {
        self.guessed.contains(letter.as_char())
    }
}

/// Result of applying one guess.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct Guess {
    state: GuessState,
    hit: bool,
    outcome: Outcome,
}

impl Guess {
    /// Consumes the guess, returning the new state.
    pub fn into_state(self) -> GuessState {
        self.state
    }
}

/// Game rules, parameterized by the miss limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    miss_limit: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self::new(DEFAULT_MISS_LIMIT)
    }
}

impl Rules {
    /// Creates rules allowing `miss_limit` bad guesses.
    pub fn new(miss_limit: u32) -> Self {
        Self { miss_limit }
    }

    /// Bad guesses allowed; one more loses the game.
    pub fn miss_limit(&self) -> u32 {
        self.miss_limit
    }

    /// Derives the outcome of `state`.
    pub fn outcome(&self, state: &GuessState) -> Outcome {
        Outcome::resolve(&state.reveal_word, state.bad_guesses, self.miss_limit)
    }

    /// Applies `letter` to `state` for the given secret word.
    ///
    /// The letter is recorded in the guessed set whether it hits or misses.
    /// A hit reveals every matching position; a miss bumps the bad-guess
    /// counter.
    ///
    /// # Errors
    ///
    /// - [`GuessError::AlreadyGuessed`] if the letter was guessed before.
    /// - [`GuessError::GameOver`] if the game is already won or lost.
    #[instrument(
        skip(self, state, secret_word),
        fields(letter = %letter, guessed = %state.guessed)
    )]
    pub fn apply_guess(
        &self,
        state: &GuessState,
        secret_word: &str,
        letter: Letter,
    ) -> Result<Guess, GuessError> {
        if state.has_guessed(letter) {
            return Err(GuessError::AlreadyGuessed { letter });
        }

        let current = self.outcome(state);
        if current.is_resolved() {
            return Err(GuessError::GameOver { outcome: current });
        }

        let mut guessed = state.guessed.clone();
        guessed.push(letter.as_char());

        let hit = secret_word.chars().any(|c| letter.matches(c));
        let next = if hit {
            GuessState {
                reveal_word: reveal(secret_word, &guessed),
                guessed,
                bad_guesses: state.bad_guesses,
            }
        } else {
            GuessState {
                reveal_word: state.reveal_word.clone(),
                guessed,
                bad_guesses: state.bad_guesses + 1,
            }
        };

        let outcome = self.outcome(&next);
        debug!(
            hit,
            reveal_word = %next.reveal_word,
            bad_guesses = next.bad_guesses,
            %outcome,
            "Guess applied"
        );

        Ok(Guess {
            state: next,
            hit,
            outcome,
        })
    }
}
