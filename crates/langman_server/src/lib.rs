//! Langman server library - REST backend for the langman word game.
//!
//! # Architecture
//!
//! - **Config**: per-environment TOML settings
//! - **Db**: diesel models and repositories for the usage corpus and the
//!   users/games store
//! - **Seed**: schema initialization and CSV corpus loading
//! - **Service**: game creation, guessing and statistics on top of
//!   [`langman_core`] rules
//! - **Api**: axum routes mapping HTTP verbs to service operations
//!
//! # Example
//!
//! ```no_run
//! use langman_server::{AppConfig, GameService, router};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = AppConfig::from_file("langman.toml", "development")?;
//! let app = router(GameService::from_config(&config)?);
//! let listener = tokio::net::TcpListener::bind(("127.0.0.1", 5000)).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod api;
mod config;
mod db;
mod seed;
mod service;

// Crate-level exports - API
pub use api::{ApiError, CreateGameRequest, CreatedGame, GuessRequest, MessageBody, router};

// Crate-level exports - Configuration
pub use config::{AppConfig, ConfigError};

// Crate-level exports - Persistence
pub use db::{
    DbError, DbErrorKind, FinishedGame, Game, GameRepository, GameUpdate, NewGame, NewUser, Usage,
    UsageRepository, User, ordinal, user_id_for,
};

// Crate-level exports - Seeding
pub use seed::{MAX_USAGE_LEN, SeedError, init_db, read_usages, read_usages_file, seed_usages};

// Crate-level exports - Service
pub use service::{GameService, GameView, ServiceError, UserStats};
