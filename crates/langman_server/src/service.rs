//! Game business logic layer.
//!
//! Wraps the two repositories with the langman rules: game creation with
//! get-or-create users, guess application, and read models for the API.

use chrono::Utc;
use derive_getters::Getters;
use derive_more::{Display, Error, From};
use langman_core::{GuessError, Language, Letter, Outcome, Rules};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{
    AppConfig, DbError, FinishedGame, Game, GameRepository, GameUpdate, NewGame, NewUser, Usage,
    UsageRepository, User, ordinal, user_id_for,
};

/// Failures of a game operation, classified for the API layer.
#[derive(Debug, Display, Error, From)]
pub enum ServiceError {
    /// A request field is missing or malformed.
    #[display("{message}")]
    InvalidInput {
        /// What was wrong.
        message: String,
    },
    /// The guess was rejected by the rules.
    #[display("{_0}")]
    #[from]
    Guess(GuessError),
    /// No game with this id.
    #[display("game '{game_id}' not found")]
    GameNotFound {
        /// Requested id.
        game_id: String,
    },
    /// No user with this name.
    #[display("user '{user_name}' not found")]
    UserNotFound {
        /// Requested name.
        user_name: String,
    },
    /// The corpus has no usage for the language.
    #[display("no usages available for language '{language}'")]
    EmptyCorpus {
        /// Requested language.
        language: Language,
    },
    /// A game references a usage that is not in the corpus.
    #[display("usage {usage_id} referenced by game is missing")]
    UsageMissing {
        /// Dangling usage id.
        usage_id: i32,
    },
    /// Storage failure.
    #[display("{_0}")]
    #[from]
    Db(DbError),
}

impl From<diesel::result::Error> for ServiceError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::Db(DbError::from(err))
    }
}

impl ServiceError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Public view of a game.
///
/// The secret word is only present once the game is won or lost; until then
/// the usage sentence shows the reveal word in its place.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct GameView {
    game_id: String,
    username: String,
    language: Language,
    usage: String,
    source: String,
    guessed: String,
    reveal_word: String,
    bad_guesses: u32,
    miss_limit: u32,
    result: Outcome,
    start_time: i32,
    end_time: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret_word: Option<String>,
}

/// Public view of a player's aggregate statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct UserStats {
    user_id: String,
    user_name: String,
    first_time: i32,
    num_games: i32,
    num_won: i32,
    num_lost: i32,
    total_time: i64,
    win_rate: f64,
}

impl From<&User> for UserStats {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id().clone(),
            user_name: user.user_name().clone(),
            first_time: ordinal(*user.first_time()),
            num_games: *user.num_games(),
            num_won: *user.num_won(),
            num_lost: *user.num_lost(),
            total_time: *user.total_time(),
            win_rate: user.win_rate(),
        }
    }
}

/// Service layer for game operations.
#[derive(Debug, Clone)]
pub struct GameService {
    usages: UsageRepository,
    games: GameRepository,
    rules: Rules,
}

impl GameService {
    /// Creates a service over the given repositories.
    #[instrument(skip(usages, games))]
    pub fn new(usages: UsageRepository, games: GameRepository, rules: Rules) -> Self {
        info!(miss_limit = rules.miss_limit(), "Creating GameService");
        Self {
            usages,
            games,
            rules,
        }
    }

    /// Creates a service from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database path is invalid.
    #[instrument(skip(config))]
    pub fn from_config(config: &AppConfig) -> Result<Self, DbError> {
        Ok(Self::new(
            UsageRepository::new(config.usage_db().clone())?,
            GameRepository::new(config.games_db().clone())?,
            config.rules(),
        ))
    }

    /// Returns an existing user by name or creates one if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_or_create_user(&self, user_name: &str) -> Result<User, DbError> {
        let user_id = user_id_for(user_name);
        if let Some(user) = self.games.get_user(&user_id)? {
            debug!(user_id = %user.user_id(), "Existing user found");
            return Ok(user);
        }

        info!(user_name, "Creating new user");
        let new_user = NewUser::new(
            user_id.clone(),
            user_name.trim().to_string(),
            Utc::now().naive_utc(),
        );
        match self.games.create_user(new_user) {
            // Another request created the same player in between.
            Err(e) if e.is_unique_violation() => self
                .games
                .get_user(&user_id)?
                .ok_or(e),
            other => other,
        }
    }

    /// Starts a game for `username` in `language`. Returns the new game id.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::InvalidInput`] for a blank username or unknown language.
    /// - [`ServiceError::EmptyCorpus`] if no usage exists for the language.
    #[instrument(skip(self))]
    pub fn create_game(&self, username: &str, language: &str) -> Result<String, ServiceError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ServiceError::invalid("username must not be empty"));
        }
        let language: Language = language
            .trim()
            .parse()
            .map_err(|_| ServiceError::invalid(format!("unsupported language '{}'", language)))?;

        let usage = self
            .usages
            .random_usage(language)?
            .ok_or(ServiceError::EmptyCorpus { language })?;
        let user = self.get_or_create_user(username)?;

        let game_id = uuid::Uuid::new_v4().to_string();
        let game = self.games.create_game(NewGame::start(
            game_id,
            user.user_id().clone(),
            &usage,
            Utc::now().naive_utc(),
        ))?;

        info!(game_id = %game.game_id(), %language, player = %user.user_name(), "Game started");
        Ok(game.game_id().clone())
    }

    /// Reads a game.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::GameNotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub fn get_game(&self, game_id: &str) -> Result<GameView, ServiceError> {
        let (game, user) = self.load(game_id)?;
        let usage = self.usage_for(&game)?;
        self.view(&game, &user, &usage)
    }

    /// Applies one letter guess and returns the updated game.
    ///
    /// When the guess ends the game, `end_time` is stamped and the player's
    /// aggregates are updated together with the game row. The game is re-read
    /// under the write lock, so concurrent guesses on one game apply in turn.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Guess`] for an invalid letter, a repeat, or a finished game.
    /// - [`ServiceError::GameNotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub fn guess(&self, game_id: &str, letter: &str) -> Result<GameView, ServiceError> {
        let letter = Letter::parse(letter)?;
        let (game, user) = self.load(game_id)?;
        let usage = self.usage_for(&game)?;

        let updated = self
            .games
            .modify_game(game_id, |current| {
                let guess = self
                    .rules
                    .apply_guess(&current.guess_state(), usage.secret_word(), letter)
                    .inspect_err(|e| warn!(error = %e, "Guess rejected"))?;
                info!(hit = *guess.hit(), outcome = %guess.outcome(), "Guess accepted");

                let finished = if guess.outcome().is_resolved() {
                    let now = Utc::now().naive_utc();
                    let elapsed = (now - *current.start_time()).num_seconds().max(0);
                    Some((now, FinishedGame::new(*guess.outcome() == Outcome::Won, elapsed)))
                } else {
                    None
                };

                let update = GameUpdate::from_state(guess.state(), finished.map(|(now, _)| now));
                Ok::<_, ServiceError>((update, finished.map(|(_, f)| f)))
            })?
            .ok_or_else(|| ServiceError::GameNotFound {
                game_id: game_id.to_string(),
            })?;

        self.view(&updated, &user, &usage)
    }

    /// Deletes a game.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::GameNotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub fn delete_game(&self, game_id: &str) -> Result<(), ServiceError> {
        if self.games.delete_game(game_id)? {
            Ok(())
        } else {
            Err(ServiceError::GameNotFound {
                game_id: game_id.to_string(),
            })
        }
    }

    /// Returns a player's aggregate statistics.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::UserNotFound`] for an unknown name.
    #[instrument(skip(self))]
    pub fn user_stats(&self, user_name: &str) -> Result<UserStats, ServiceError> {
        let user = self
            .games
            .get_user(&user_id_for(user_name))?
            .ok_or_else(|| ServiceError::UserNotFound {
                user_name: user_name.to_string(),
            })?;
        Ok(UserStats::from(&user))
    }

    fn load(&self, game_id: &str) -> Result<(Game, User), ServiceError> {
        self.games
            .get_game_with_player(game_id)?
            .ok_or_else(|| ServiceError::GameNotFound {
                game_id: game_id.to_string(),
            })
    }

    fn usage_for(&self, game: &Game) -> Result<Usage, ServiceError> {
        self.usages
            .get_usage(*game.usage_id())?
            .ok_or(ServiceError::UsageMissing {
                usage_id: *game.usage_id(),
            })
    }

    fn view(&self, game: &Game, user: &User, usage: &Usage) -> Result<GameView, ServiceError> {
        let state = game.guess_state();
        let result = self.rules.outcome(&state);
        let secret_word = result.is_resolved().then(|| usage.secret_word().clone());
        let shown = secret_word.as_deref().unwrap_or(state.reveal_word());

        Ok(GameView {
            game_id: game.game_id().clone(),
            username: user.user_name().clone(),
            language: usage.parse_language()?,
            usage: usage.render(shown),
            source: usage.source().clone(),
            guessed: state.guessed().to_string(),
            reveal_word: state.reveal_word().to_string(),
            bad_guesses: state.bad_guesses(),
            miss_limit: self.rules.miss_limit(),
            result,
            start_time: ordinal(*game.start_time()),
            end_time: (*game.end_time()).map(ordinal),
            secret_word,
        })
    }
}
