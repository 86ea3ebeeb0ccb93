//! Database repository for users and games.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::db::{
    DbError, DbErrorKind, FinishedGame, Game, GameUpdate, NewGame, NewUser, User, connect, schema,
};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/games");

/// Database repository for user and game operations.
#[derive(Debug, Clone)]
pub struct GameRepository {
    db_path: String,
}

impl GameRepository {
    /// Creates a new repository connected to the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::new("Games database path is empty"));
        }
        info!(path = %db_path, "Creating GameRepository");
        Ok(Self { db_path })
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        connect(&self.db_path)
    }

    /// Creates the users and games schema if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| {
                DbError::with_kind(
                    DbErrorKind::Migration,
                    format!("Games migrations failed: {}", e),
                )
            })?;
        info!(count = applied.len(), "Games migrations applied");
        Ok(())
    }

    /// Creates a new user profile.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the user id is already taken or a database error occurs.
    #[instrument(skip(self, new_user))]
    pub fn create_user(&self, new_user: NewUser) -> Result<User, DbError> {
        let mut conn = self.connection()?;

        let user = diesel::insert_into(schema::users::table)
            .values(&new_user)
            .returning(User::as_returning())
            .get_result(&mut conn)?;

        info!(user_id = %user.user_id(), user_name = %user.user_name(), "User created");
        Ok(user)
    }

    /// Gets a user by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_user(&self, user_id: &str) -> Result<Option<User>, DbError> {
        debug!(user_id, "Looking up user");
        let mut conn = self.connection()?;

        let user = schema::users::table
            .find(user_id)
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;

        if let Some(ref u) = user {
            debug!(user_name = %u.user_name(), "User found");
        } else {
            debug!("User not found");
        }

        Ok(user)
    }

    /// Creates a new game row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the player does not exist or a database error occurs.
    #[instrument(
        skip(self, new_game),
        fields(game_id = %new_game.game_id(), player = %new_game.player())
    )]
    pub fn create_game(&self, new_game: NewGame) -> Result<Game, DbError> {
        let mut conn = self.connection()?;

        let game = diesel::insert_into(schema::games::table)
            .values(&new_game)
            .returning(Game::as_returning())
            .get_result(&mut conn)?;

        info!(game_id = %game.game_id(), usage_id = game.usage_id(), "Game created");
        Ok(game)
    }

    /// Gets a game by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_game(&self, game_id: &str) -> Result<Option<Game>, DbError> {
        let mut conn = self.connection()?;

        let game = schema::games::table
            .find(game_id)
            .select(Game::as_select())
            .first(&mut conn)
            .optional()?;

        debug!(found = game.is_some(), "Game lookup");
        Ok(game)
    }

    /// Gets a game together with its player. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_game_with_player(&self, game_id: &str) -> Result<Option<(Game, User)>, DbError> {
        let mut conn = self.connection()?;

        let row = schema::games::table
            .inner_join(schema::users::table)
            .filter(schema::games::game_id.eq(game_id))
            .select((Game::as_select(), User::as_select()))
            .first::<(Game, User)>(&mut conn)
            .optional()?;

        debug!(found = row.is_some(), "Game with player lookup");
        Ok(row)
    }

    /// Writes a guess result. When `finished` is given, the player's
    /// aggregates are updated in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the game does not exist or a database error occurs.
    #[instrument(
        skip(self, update),
        fields(reveal_word = %update.reveal_word(), bad_guesses = update.bad_guesses())
    )]
    pub fn update_game(
        &self,
        game_id: &str,
        update: &GameUpdate,
        finished: Option<FinishedGame>,
    ) -> Result<Game, DbError> {
        let mut conn = self.connection()?;

        let game = conn.immediate_transaction::<_, diesel::result::Error, _>(|conn| {
            write_game(conn, game_id, update, finished)
        })?;

        info!(game_id = %game.game_id(), "Game updated");
        Ok(game)
    }

    /// Reads a game and writes back the change computed by `apply`, holding
    /// the write lock from the read to the commit. If `apply` fails nothing
    /// is written. Returns `None` if the game does not exist.
    ///
    /// # Errors
    ///
    /// Returns the error from `apply`, or a database error converted into `E`.
    #[instrument(skip(self, apply))]
    pub fn modify_game<F, E>(&self, game_id: &str, apply: F) -> Result<Option<Game>, E>
    where
        F: FnOnce(&Game) -> Result<(GameUpdate, Option<FinishedGame>), E>,
        E: From<DbError> + From<diesel::result::Error>,
    {
        let mut conn = self.connection()?;

        let game = conn.immediate_transaction::<_, E, _>(|conn| {
            let Some(current) = schema::games::table
                .find(game_id)
                .select(Game::as_select())
                .first(conn)
                .optional()?
            else {
                return Ok(None);
            };

            let (update, finished) = apply(&current)?;
            Ok(Some(write_game(conn, game_id, &update, finished)?))
        })?;

        debug!(found = game.is_some(), "Game modified");
        Ok(game)
    }

    /// Deletes a game. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn delete_game(&self, game_id: &str) -> Result<bool, DbError> {
        let mut conn = self.connection()?;

        let deleted = diesel::delete(schema::games::table.find(game_id)).execute(&mut conn)?;

        info!(game_id, deleted, "Game delete");
        Ok(deleted > 0)
    }
}

/// Writes the game row and, for a finished game, the player's aggregates.
/// Must run inside a transaction.
fn write_game(
    conn: &mut SqliteConnection,
    game_id: &str,
    update: &GameUpdate,
    finished: Option<FinishedGame>,
) -> Result<Game, diesel::result::Error> {
    use schema::users::dsl::{num_games, num_lost, num_won, total_time};

    let game = diesel::update(schema::games::table.find(game_id))
        .set(update)
        .returning(Game::as_returning())
        .get_result(conn)?;

    if let Some(finished) = finished {
        let (won, lost): (i32, i32) = if *finished.won() { (1, 0) } else { (0, 1) };
        diesel::update(schema::users::table.find(game.player()))
            .set((
                num_games.eq(num_games + 1),
                num_won.eq(num_won + won),
                num_lost.eq(num_lost + lost),
                total_time.eq(total_time + *finished.elapsed_secs()),
            ))
            .execute(conn)?;
        info!(player = %game.player(), won = *finished.won(), "Player aggregates updated");
    }

    Ok(game)
}
