use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

/// ErrorBody
///
/// The JSON shape of every error response: `{ "error": "<message>" }`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorBody {
    pub error: String,
}

/// ApiError
///
/// The client-visible error taxonomy. Every variant is terminal for the request; nothing
/// is retried server-side.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// No session, or a session whose role claim is not "admin".
    #[error("Unauthorized")]
    Unauthorized,
    /// An update or delete arrived without an `id`.
    #[error("ID is required")]
    MissingIdentifier,
    /// A persistence or unexpected fault. The message names the failed operation only;
    /// the cause has already been logged.
    #[error("{0}")]
    InternalFailure(String),
}

impl ApiError {
    /// Logs `cause` and wraps `message` as an `InternalFailure`.
    pub fn internal(message: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        let message = message.into();
        tracing::error!(error = %cause, "{}", message);
        ApiError::InternalFailure(message)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::MissingIdentifier => StatusCode::BAD_REQUEST,
            ApiError::InternalFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// RepoError
///
/// Faults raised by the persistence layer. Handlers never classify these further: all of
/// them surface as `ApiError::InternalFailure`.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("no {resource} with id {id}")]
    NotFound { resource: &'static str, id: Uuid },
    #[error("malformed identifier {0:?}")]
    MalformedId(String),
    #[error("storage unavailable")]
    Unavailable,
}
