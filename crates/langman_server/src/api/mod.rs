//! REST API over the game service.

mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::{CreateGameRequest, CreatedGame, GuessRequest, MessageBody};

use axum::{
    Router,
    body::Body,
    http::Request,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tracing::{info, instrument};

use crate::GameService;

/// Builds the application router.
///
/// - `POST /api/games`
/// - `GET | PUT | DELETE /api/games/{game_id}`
/// - `GET /api/users/{user_name}`
#[instrument(skip(service))]
pub fn router(service: GameService) -> Router {
    Router::new()
        .route("/api/games", post(handlers::create_game))
        .route(
            "/api/games/{game_id}",
            get(handlers::get_game)
                .put(handlers::guess)
                .delete(handlers::delete_game),
        )
        .route("/api/users/{user_name}", get(handlers::get_user))
        .with_state(service)
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
}
