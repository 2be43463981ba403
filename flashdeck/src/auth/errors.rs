//! Authentication error types.

use thiserror::Error;

use crate::db::StorageError;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Unknown email or wrong secret. The two cases are not distinguished.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Token is malformed, unsigned, tampered with or has no subject
    #[error("Invalid token")]
    InvalidToken,

    /// Token signature is fine but its expiry has passed
    #[error("Token expired")]
    TokenExpired,

    /// Token is valid but its subject no longer exists
    #[error("User not found")]
    UnknownIdentity,

    /// Email already registered
    #[error("Email already registered")]
    DuplicateIdentity,

    /// Email does not look like an address
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password is empty
    #[error("Password must not be empty")]
    EmptySecret,

    /// Configured lifetime pushes the expiry past the representable range
    #[error("Token expiry out of range")]
    TokenLifetimeOverflow,

    /// Token signing failed
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Storage and JWT errors are sanitized, and an expired token reads the same
    /// as any other rejected token.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Storage(_)
            | AuthError::HashingFailed
            | AuthError::TokenLifetimeOverflow => {
                "Internal server error".to_string()
            }
            AuthError::Jwt(_) => "Authentication failed".to_string(),
            AuthError::TokenExpired => AuthError::InvalidToken.to_string(),
            _ => self.to_string(),
        }
    }

    /// Whether the error means the caller is not authenticated.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::InvalidToken
                | AuthError::TokenExpired
                | AuthError::UnknownIdentity
        )
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
