//! Authentication API handlers.
//!
//! # Examples
//!
//! Register a new user:
//! ```bash
//! curl -X POST http://localhost:8000/api/v1/users \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "a@x.com", "password": "pw123"}'
//! ```
//!
//! Login:
//! ```bash
//! curl -X POST http://localhost:8000/api/v1/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "a@x.com", "password": "pw123"}'
//! ```

use axum::{Extension, Json, extract::State};
use flashdeck::{AuthError, TokenResponse, User};
use serde::{Deserialize, Serialize};

use super::{AppState, error::ApiError, middleware::BearerToken};
use crate::{logging, metrics};

#[derive(Debug, Deserialize)]
pub struct CredentialsPayload {
    pub email: String,
    pub password: String,
}

/// Public identity returned by registration and `/me`
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

/// Register a new user account.
///
/// # Response
///
/// `200 OK` with `{"id": 1, "email": "a@x.com"}`. The password hash is
/// never returned.
///
/// # Errors
///
/// - `400 Bad Request`: Email already registered, malformed email or empty password
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsPayload>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .auth_manager
        .register(&payload.email, &payload.password)
        .await?;

    metrics::registrations_total();
    tracing::info!(user_id = user.id, "User registered");
    Ok(Json(user.into()))
}

/// Exchange email and password for a bearer token.
///
/// # Response
///
/// `{"access_token": "eyJ...", "token_type": "bearer"}`
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password (indistinguishable)
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsPayload>,
) -> Result<Json<TokenResponse>, ApiError> {
    match state
        .auth_manager
        .authenticate(&payload.email, &payload.password)
        .await
    {
        Ok(token) => {
            metrics::login_attempts_total(true);
            Ok(Json(token))
        }
        Err(e) => {
            metrics::login_attempts_total(false);
            if matches!(e, AuthError::InvalidCredentials) {
                logging::log_security_event("failed_login", None, "Invalid credentials");
            }
            Err(e.into())
        }
    }
}

/// Identity behind the presented token.
pub async fn me(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.auth_manager.current_user(token.as_str()).await?;
    Ok(Json(user.into()))
}
