//! Request handlers.
//!
//! Diesel is synchronous, so every service call runs on the blocking pool.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::api::ApiError;
use crate::{GameService, GameView, ServiceError, UserStats};

/// Body of `POST /api/games`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateGameRequest {
    /// Player name.
    pub username: Option<String>,
    /// Language code (`en`, `es`, `fr`).
    pub language: Option<String>,
}

/// Body of `PUT /api/games/{game_id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuessRequest {
    /// The guessed letter.
    pub letter: Option<String>,
}

/// Reply to a successful game creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct CreatedGame {
    /// Status message.
    pub message: String,
    /// Id of the new game.
    pub game_id: String,
}

/// Plain message reply, also used for errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct MessageBody {
    /// Status or error message.
    pub message: String,
}

async fn run_blocking<T, F>(service: GameService, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&GameService) -> Result<T, ServiceError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| ApiError::Internal {
            message: format!("request task failed: {}", e),
        })?
        .map_err(ApiError::from)
}

fn required(field: Option<String>, name: &str) -> Result<String, ApiError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ApiError::BadRequest {
            message: format!("missing required field '{}'", name),
        }),
    }
}

fn rejected(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest {
        message: rejection.body_text(),
    }
}

/// `POST /api/games`
#[instrument(skip(service, payload))]
pub(crate) async fn create_game(
    State(service): State<GameService>,
    payload: Result<Json<CreateGameRequest>, JsonRejection>,
) -> Result<Json<CreatedGame>, ApiError> {
    let Json(request) = payload.map_err(rejected)?;
    let username = required(request.username, "username")?;
    let language = required(request.language, "language")?;
    debug!(%username, %language, "Create game request");

    let game_id = run_blocking(service, move |s| s.create_game(&username, &language)).await?;
    Ok(Json(CreatedGame::new("success".to_string(), game_id)))
}

/// `GET /api/games/{game_id}`
#[instrument(skip(service))]
pub(crate) async fn get_game(
    State(service): State<GameService>,
    Path(game_id): Path<String>,
) -> Result<Json<GameView>, ApiError> {
    let view = run_blocking(service, move |s| s.get_game(&game_id)).await?;
    Ok(Json(view))
}

/// `PUT /api/games/{game_id}`
#[instrument(skip(service, payload))]
pub(crate) async fn guess(
    State(service): State<GameService>,
    Path(game_id): Path<String>,
    payload: Result<Json<GuessRequest>, JsonRejection>,
) -> Result<Json<GameView>, ApiError> {
    let Json(request) = payload.map_err(rejected)?;
    let letter = required(request.letter, "letter")?;
    debug!(%letter, "Guess request");

    let view = run_blocking(service, move |s| s.guess(&game_id, &letter)).await?;
    Ok(Json(view))
}

/// `DELETE /api/games/{game_id}`
#[instrument(skip(service))]
pub(crate) async fn delete_game(
    State(service): State<GameService>,
    Path(game_id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    run_blocking(service, move |s| s.delete_game(&game_id)).await?;
    Ok(Json(MessageBody::new("success".to_string())))
}

/// `GET /api/users/{user_name}`
#[instrument(skip(service))]
pub(crate) async fn get_user(
    State(service): State<GameService>,
    Path(user_name): Path<String>,
) -> Result<Json<UserStats>, ApiError> {
    let stats = run_blocking(service, move |s| s.user_stats(&user_name)).await?;
    Ok(Json(stats))
}
