//! HTTP API for the flashdeck server.
//!
//! # Modules
//!
//! - [`auth`]: Registration, login and `/me`
//! - [`decks`]: Deck creation and lookup
//! - [`cards`]: Card creation, due list and review
//! - [`middleware`]: Bearer-token extraction for protected endpoints
//! - [`request_id`]: Request correlation ids, request logging and HTTP metrics
//! - [`error`]: Domain error to status code mapping
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /                                             - Banner (public)
//! GET  /health                                       - Health check (public)
//! POST /api/v1/users                                 - Register (public)
//! POST /api/v1/login                                 - Login (public)
//! GET  /api/v1/me                                    - Current user (auth required)
//! POST /api/v1/decks                                 - Create deck (auth required)
//! GET  /api/v1/decks                                 - List decks (auth required)
//! GET  /api/v1/decks/{deck_id}                       - Get deck (auth required)
//! POST /api/v1/decks/{deck_id}/cards                 - Create card (auth required)
//! GET  /api/v1/decks/{deck_id}/cards/review/today    - Due cards (auth required)
//! POST /api/v1/decks/{deck_id}/cards/{card_id}/review - Review card (auth required)
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod auth;
pub mod cards;
pub mod decks;
pub mod error;
pub mod middleware;
pub mod request_id;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use flashdeck::{AuthManager, Database, DeckManager};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// `database` is `None` when the server runs on the in-memory store.
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub deck_manager: Arc<DeckManager>,
    pub database: Option<Database>,
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Example
///
/// ```rust,no_run
/// use flashdeck::{AuthConfig, AuthManager, DeckManager, MemoryStore};
/// use fd_server::api::{AppState, create_router};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(MemoryStore::new());
/// let auth_manager = Arc::new(AuthManager::new(
///     store.clone(),
///     AuthConfig::new("jwt_secret_of_at_least_32_characters", "pepper_of_16_chars"),
/// ));
/// let deck_manager = Arc::new(DeckManager::new(auth_manager.clone(), store));
///
/// let app = create_router(AppState { auth_manager, deck_manager, database: None });
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router();

    let root_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check));

    Router::new()
        .merge(root_routes)
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Create API v1 router with all versioned endpoints.
fn create_v1_router() -> Router<AppState> {
    let public_routes = Router::new()
        .route("/users", post(auth::register))
        .route("/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/me", get(auth::me))
        .route("/decks", post(decks::create_deck).get(decks::list_decks))
        .route("/decks/{deck_id}", get(decks::get_deck))
        .route("/decks/{deck_id}/cards", post(cards::create_card))
        .route("/decks/{deck_id}/cards/review/today", get(cards::due_today))
        .route(
            "/decks/{deck_id}/cards/{card_id}/review",
            post(cards::review_card),
        )
        .layer(axum::middleware::from_fn(middleware::bearer_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Flashdeck API running" }))
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when storage is reachable, `503 Service Unavailable` otherwise.
///
/// ```bash
/// curl http://localhost:8000/health
/// # {"status":"healthy","storage":"postgres","database":true,"timestamp":"..."}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (storage, db_healthy) = match &state.database {
        Some(db) => ("postgres", db.health_check().await.is_ok()),
        None => ("memory", true),
    };

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "storage": storage,
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
