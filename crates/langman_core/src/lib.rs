//! Langman core - pure hangman rules.
//!
//! This crate holds everything about a langman game that does not touch a
//! database or the network:
//!
//! - **Languages**: the fixed set of corpus languages a game can be played in
//! - **Normalization**: accent and case folding used to compare letters
//! - **Rules**: guess evaluation against a secret word
//! - **Outcome**: win/loss derivation from persisted game state
//!
//! # Example
//!
//! ```
//! use langman_core::{GuessState, Letter, Outcome, Rules};
//!
//! # fn example() -> Result<(), langman_core::GuessError> {
//! let rules = Rules::default();
//! let state = GuessState::new("gato");
//!
//! let guess = rules.apply_guess(&state, "gato", Letter::parse("a")?)?;
//! assert_eq!(guess.state().reveal_word(), "_a__");
//! assert_eq!(*guess.outcome(), Outcome::Active);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod language;
mod normalize;
mod outcome;
mod rules;

pub use error::GuessError;
pub use language::Language;
pub use normalize::{Letter, fold, fold_char};
pub use outcome::Outcome;
pub use rules::{DEFAULT_MISS_LIMIT, Guess, GuessState, MASK, Rules, reveal};
