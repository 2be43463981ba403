//! Authentication module providing registration, login and bearer-token verification.
//!
//! This module implements:
//! - Argon2id password hashing with server-side pepper
//! - Stateless HS256 JWT access tokens with a fixed lifetime (60 minutes by default)
//! - Per-use existence check of the token subject (no server-side sessions)
//!
//! ## Example
//!
//! ```no_run
//! use flashdeck::auth::{AuthConfig, AuthManager};
//! use flashdeck::db::MemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let auth = AuthManager::new(
//!         Arc::new(MemoryStore::new()),
//!         AuthConfig::new("jwt_secret_of_at_least_32_characters", "secret_pepper"),
//!     );
//!
//!     let user = auth.register("player@example.com", "pw123").await?;
//!     let token = auth.authenticate("player@example.com", "pw123").await?;
//!     assert_eq!(auth.verify(&token.access_token).await?, user);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{AuthError, AuthResult};
pub use manager::{AuthManager, normalize_email};
pub use models::{
    AccessTokenClaims, AuthConfig, DEFAULT_TOKEN_TTL_MINUTES, TokenResponse, User, UserId,
    UserRecord,
};
