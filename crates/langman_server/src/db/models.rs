//! Database models and domain types.

use chrono::{Datelike, NaiveDateTime};
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use langman_core::{GuessState, Language, MASK};
use tracing::instrument;

use crate::db::{DbError, schema};

/// Proleptic Gregorian ordinal of a timestamp's date (0001-01-01 is day 1).
pub fn ordinal(dt: NaiveDateTime) -> i32 {
    dt.num_days_from_ce()
}

/// Derives the stable user id for a player name: the hex MD5 digest of the
/// trimmed name.
#[instrument]
pub fn user_id_for(user_name: &str) -> String {
    format!("{:x}", md5::compute(user_name.trim().as_bytes()))
}

/// Corpus entry: a secret word with an example sentence.
///
/// The sentence uses `{}` where the secret word belongs.
#[derive(
    Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable, Insertable, Getters, new,
)]
#[diesel(table_name = schema::usages, primary_key(usage_id))]
pub struct Usage {
    usage_id: i32,
    language: String,
    secret_word: String,
    usage: String,
    source: String,
}

impl Usage {
    /// Placeholder for the secret word inside the usage sentence.
    pub const PLACEHOLDER: &'static str = "{}";

    /// Parses the stored language code.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the code is not a supported language.
    #[instrument(skip(self), fields(language = %self.language))]
    pub fn parse_language(&self) -> Result<Language, DbError> {
        self.language
            .parse()
            .map_err(|_| DbError::new(format!("Invalid language: '{}'", self.language)))
    }

    /// Fills the sentence placeholder with `word`.
    pub fn render(&self, word: &str) -> String {
        self.usage.replace(Self::PLACEHOLDER, word)
    }

    /// Returns `true` if the secret word can be played: it has at least one
    /// letter to mask and no literal mask character.
    pub fn is_playable(&self) -> bool {
        !self.secret_word.contains(MASK) && self.secret_word.chars().any(char::is_alphabetic)
    }
}

/// Player profile with aggregate statistics.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::users, primary_key(user_id))]
pub struct User {
    user_id: String,
    user_name: String,
    first_time: NaiveDateTime,
    num_games: i32,
    num_won: i32,
    num_lost: i32,
    total_time: i64,
}

impl User {
    /// Calculates win rate as a percentage (0.0-100.0).
    #[instrument(skip(self))]
    pub fn win_rate(&self) -> f64 {
        if self.num_games == 0 {
            0.0
        } else {
            (self.num_won as f64 / self.num_games as f64) * 100.0
        }
    }
}

/// Insertable user model for first-time players.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::users)]
pub struct NewUser {
    user_id: String,
    user_name: String,
    first_time: NaiveDateTime,
}

/// Game database model.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::games, primary_key(game_id))]
pub struct Game {
    game_id: String,
    player: String,
    usage_id: i32,
    guessed: String,
    reveal_word: String,
    bad_guesses: i32,
    start_time: NaiveDateTime,
    end_time: Option<NaiveDateTime>,
}

impl Game {
    /// Rebuilds the rule-level state from the stored columns.
    pub fn guess_state(&self) -> GuessState {
        GuessState::from_parts(
            self.guessed.clone(),
            self.reveal_word.clone(),
            u32::try_from(self.bad_guesses).unwrap_or_default(),
        )
    }
}

/// Insertable game model for new sessions.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::games)]
pub struct NewGame {
    game_id: String,
    player: String,
    usage_id: i32,
    guessed: String,
    reveal_word: String,
    bad_guesses: i32,
    start_time: NaiveDateTime,
}

impl NewGame {
    /// Builds the row for a fresh game over `usage`.
    pub fn start(
        game_id: String,
        player: String,
        usage: &Usage,
        start_time: NaiveDateTime,
    ) -> Self {
        let state = GuessState::new(usage.secret_word());
        Self::new(
            game_id,
            player,
            *usage.usage_id(),
            state.guessed().to_string(),
            state.reveal_word().to_string(),
            0,
            start_time,
        )
    }
}

/// Changes written after a guess. `end_time` is left untouched when `None`.
#[derive(Debug, Clone, AsChangeset, new, Getters)]
#[diesel(table_name = schema::games)]
pub struct GameUpdate {
    guessed: String,
    reveal_word: String,
    bad_guesses: i32,
    end_time: Option<NaiveDateTime>,
}

impl GameUpdate {
    /// Builds the changeset for `state`, stamping `end_time` when given.
    pub fn from_state(state: &GuessState, end_time: Option<NaiveDateTime>) -> Self {
        Self::new(
            state.guessed().to_string(),
            state.reveal_word().to_string(),
            i32::try_from(state.bad_guesses()).unwrap_or(i32::MAX),
            end_time,
        )
    }
}

/// Aggregate changes applied to a player when one of their games ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new, Getters)]
pub struct FinishedGame {
    won: bool,
    elapsed_secs: i64,
}
