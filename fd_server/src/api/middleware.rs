//! Bearer-token middleware for protected endpoints.
//!
//! The middleware only checks that an `Authorization: Bearer <token>` header
//! is present and hands the raw token to the handler. Verifying the token is
//! left to the domain layer, which resolves it to a user on every call.
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum::{Extension, Router, routing::get, middleware};
//! use fd_server::api::middleware::{BearerToken, bearer_middleware};
//!
//! async fn handler(Extension(token): Extension<BearerToken>) -> String {
//!     format!("{} byte token", token.as_str().len())
//! }
//!
//! let protected: Router = Router::new()
//!     .route("/api/protected", get(handler))
//!     .layer(middleware::from_fn(bearer_middleware));
//! # let _ = protected;
//! ```

use axum::{
    extract::Request,
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::error::ApiError;

/// Raw bearer credential taken from the request
#[derive(Clone, Debug)]
pub struct BearerToken(pub String);

impl BearerToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Require `Authorization: Bearer <token>` and inject [`BearerToken`].
///
/// Missing header, wrong scheme or empty token yield `401 Unauthorized`.
pub async fn bearer_middleware(mut request: Request, next: Next) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return ApiError::unauthorized().into_response();
    };

    request.extensions_mut().insert(BearerToken(token));
    next.run(request).await
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_bearer_token_extracted() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")).as_deref(), Some("abc.def"));
        assert_eq!(bearer_token(&headers("bearer abc")).as_deref(), Some("abc"));
    }

    #[test]
    fn test_bearer_token_rejected() {
        assert!(bearer_token(&HeaderMap::new()).is_none());
        assert!(bearer_token(&headers("Basic dXNlcjpwdw==")).is_none());
        assert!(bearer_token(&headers("Bearer ")).is_none());
        assert!(bearer_token(&headers("Bearer")).is_none());
    }
}
