//! Mapping of service failures to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use derive_more::{Display, Error, From};
use langman_core::GuessError;
use tracing::{error, warn};

use crate::ServiceError;
use crate::api::MessageBody;

/// Error returned by a request handler.
#[derive(Debug, Display, Error, From)]
pub enum ApiError {
    /// A failure reported by the service layer.
    #[display("{_0}")]
    #[from]
    Service(ServiceError),
    /// The request body could not be extracted.
    #[display("{message}")]
    BadRequest {
        /// Why the body was rejected.
        message: String,
    },
    /// The blocking task running the request failed.
    #[display("{message}")]
    Internal {
        /// What went wrong.
        message: String,
    },
}

impl ApiError {
    /// Status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Service(err) => match err {
                ServiceError::InvalidInput { .. }
                | ServiceError::Guess(GuessError::InvalidLetter { .. }) => StatusCode::BAD_REQUEST,
                ServiceError::Guess(_) => StatusCode::FORBIDDEN,
                ServiceError::GameNotFound { .. } | ServiceError::UserNotFound { .. } => {
                    StatusCode::NOT_FOUND
                }
                ServiceError::EmptyCorpus { .. }
                | ServiceError::UsageMissing { .. }
                | ServiceError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = %status, error = %self, "Request failed");
        } else {
            warn!(status = %status, error = %self, "Request rejected");
        }
        (status, Json(MessageBody::new(self.to_string()))).into_response()
    }
}
