//! Game outcome derivation.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::MASK;

/// Derived status of a game.
///
/// Never stored as authoritative: it is recomputed from the reveal word and
/// bad-guess count whenever it is needed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Outcome {
    /// Guesses are still accepted.
    Active,
    /// Every letter has been revealed.
    Won,
    /// The miss limit was exceeded.
    Lost,
}

impl Outcome {
    /// Resolves the outcome of a game from its persisted state.
    #[instrument]
    pub fn resolve(reveal_word: &str, bad_guesses: u32, miss_limit: u32) -> Self {
        if !reveal_word.contains(MASK) {
            Self::Won
        } else if bad_guesses > miss_limit {
            Self::Lost
        } else {
            Self::Active
        }
    }

    /// Returns `true` once the game is won or lost.
    pub fn is_resolved(self) -> bool {
        self != Self::Active
    }
}
