//! Authentication manager implementation.

use super::{
    errors::{AuthError, AuthResult},
    models::{AccessTokenClaims, AuthConfig, TokenResponse, User},
};
use crate::db::{StorageError, UserRepository};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::sync::Arc;

/// Longest accepted email address
const MAX_EMAIL_LEN: usize = 254;

/// Authentication manager
///
/// Stateless apart from its configuration: tokens are self-contained and
/// only the subject's existence is checked against storage on each use.
#[derive(Clone)]
pub struct AuthManager {
    users: Arc<dyn UserRepository>,
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `users` - Identity and credential storage
    /// * `config` - Signing key, pepper and token lifetime
    pub fn new(users: Arc<dyn UserRepository>, config: AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        Self {
            users,
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Register a new user
    ///
    /// The email is trimmed and its domain lower-cased; the local part is
    /// kept as given, so `A@x.com` and `a@x.com` are different accounts.
    ///
    /// # Returns
    ///
    /// * `AuthResult<User>` - Created user (without the hash) or error
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidEmail` - Email format invalid
    /// * `AuthError::EmptySecret` - Password is empty
    /// * `AuthError::DuplicateIdentity` - Email already exists
    pub async fn register(&self, email: &str, password: &str) -> AuthResult<User> {
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(AuthError::EmptySecret);
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::DuplicateIdentity);
        }

        let password_hash = self.hash_password(password)?;

        // a concurrent registration can still win between the check and the insert
        let user = self
            .users
            .create_user(&email, &password_hash)
            .await
            .map_err(|e| match e {
                StorageError::UniqueViolation => AuthError::DuplicateIdentity,
                other => AuthError::Storage(other),
            })?;

        log::info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Check credentials and issue a bearer token
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidCredentials` - Unknown email or wrong password
    pub async fn authenticate(&self, email: &str, password: &str) -> AuthResult<TokenResponse> {
        let email = normalize_email(email).map_err(|_| AuthError::InvalidCredentials)?;

        let record = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        self.verify_password(password, &record.password_hash)?;

        let access_token = self.issue(&record.user.email)?;
        log::debug!("Issued access token for user {}", record.user.id);
        Ok(TokenResponse::bearer(access_token))
    }

    /// Issue a signed access token for `subject`, expiring after the configured TTL
    pub fn issue(&self, subject: &str) -> AuthResult<String> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    ///
    /// # Errors
    ///
    /// * `AuthError::TokenLifetimeOverflow` - `now` plus the TTL is not a representable instant
    pub fn issue_at(&self, subject: &str, now: DateTime<Utc>) -> AuthResult<String> {
        let expires_at = now
            .checked_add_signed(self.config.token_ttl)
            .ok_or(AuthError::TokenLifetimeOverflow)?;
        let claims = AccessTokenClaims {
            sub: Some(subject.to_string()),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Resolve a bearer token to the user it was issued for
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidToken` - Bad signature, malformed, or no subject
    /// * `AuthError::TokenExpired` - Expiry is not in the future
    /// * `AuthError::UnknownIdentity` - Subject no longer exists
    pub async fn verify(&self, token: &str) -> AuthResult<User> {
        self.verify_at(token, Utc::now()).await
    }

    /// Verify a token as if the current time were `now`
    pub async fn verify_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<User> {
        let claims = self.decode_claims(token, now)?;
        let subject = claims.sub.ok_or(AuthError::InvalidToken)?;

        let record = self
            .users
            .find_by_email(&subject)
            .await?
            .ok_or(AuthError::UnknownIdentity)?;

        Ok(record.user)
    }

    /// Current user for the token (the `/me` lookup)
    pub async fn current_user(&self, token: &str) -> AuthResult<User> {
        self.verify(token).await
    }

    /// Signature and expiry checks, without touching storage
    fn decode_claims(&self, token: &str, now: DateTime<Utc>) -> AuthResult<AccessTokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        // expiry is checked below against `now`, with no leeway
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let token_data =
            decode::<AccessTokenClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                log::debug!("Rejected access token: {e}");
                AuthError::InvalidToken
            })?;

        if now.timestamp() >= token_data.claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Ok(token_data.claims)
    }

    /// Hash password with Argon2id + pepper
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        let peppered = format!("{}{}", password, self.config.password_pepper);
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        Ok(argon2
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    /// Verify password against hash
    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<()> {
        let peppered = format!("{}{}", password, self.config.password_pepper);
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
        let argon2 = Argon2::default();

        argon2
            .verify_password(peppered.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)
    }
}

/// Trim an email and lower-case its domain, rejecting anything that is not `local@domain.tld`
pub fn normalize_email(email: &str) -> AuthResult<String> {
    let email = email.trim();

    if email.is_empty() || email.len() > MAX_EMAIL_LEN {
        return Err(AuthError::InvalidEmail(
            "Email must be 1-254 characters".to_string(),
        ));
    }

    if email.chars().any(char::is_whitespace) {
        return Err(AuthError::InvalidEmail(
            "Email must not contain whitespace".to_string(),
        ));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(AuthError::InvalidEmail("Email must contain '@'".to_string()));
    };

    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@');
    if local.is_empty() || !domain_ok {
        return Err(AuthError::InvalidEmail(
            "Email must look like name@example.com".to_string(),
        ));
    }

    Ok(format!("{local}@{}", domain.to_lowercase()))
}
