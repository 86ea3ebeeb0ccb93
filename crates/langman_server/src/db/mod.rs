//! Database persistence layer for the usage corpus, users and games.

mod connection;
mod error;
mod game_repository;
mod models;
mod schema; // Diesel schema - internal use only
mod usage_repository;

pub(crate) use connection::connect;
pub use error::{DbError, DbErrorKind};
pub use game_repository::GameRepository;
pub use models::{
    FinishedGame, Game, GameUpdate, NewGame, NewUser, Usage, User, ordinal, user_id_for,
};
pub use usage_repository::UsageRepository;
