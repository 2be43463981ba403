//! Mapping of domain errors to HTTP responses.
//!
//! Every failure is rendered as `{"error": "<message>"}` with the client-safe
//! message of the underlying error.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use flashdeck::{AuthError, DeckError};
use serde::{Deserialize, Serialize};

use crate::logging;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error returned by API handlers
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Missing or malformed bearer token")
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let status = match &err {
            e if e.is_unauthorized() => StatusCode::UNAUTHORIZED,
            AuthError::DuplicateIdentity | AuthError::InvalidEmail(_) | AuthError::EmptySecret => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        match &err {
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::UnknownIdentity => {
                logging::log_security_event("rejected_token", None, &err.to_string());
            }
            _ if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Authentication failure: {}", err);
            }
            _ => {}
        }
        Self::new(status, err.client_message())
    }
}

impl From<DeckError> for ApiError {
    fn from(err: DeckError) -> Self {
        match err {
            DeckError::Auth(e) => e.into(),
            DeckError::NotFound => Self::new(StatusCode::NOT_FOUND, err.client_message()),
            DeckError::InvalidPerformance(_) | DeckError::InvalidInput(_) => {
                Self::new(StatusCode::BAD_REQUEST, err.client_message())
            }
            DeckError::ReviewConflict => Self::new(StatusCode::CONFLICT, err.client_message()),
            DeckError::Storage(_) => {
                tracing::error!("Deck operation failed: {}", err);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.client_message())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}
