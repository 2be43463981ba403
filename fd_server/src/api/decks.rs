//! Deck API handlers.
//!
//! All routes require a bearer token; decks of other users are reported as
//! `404 Not Found`.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use flashdeck::Deck;
use serde::{Deserialize, Serialize};

use super::{AppState, error::ApiError, middleware::BearerToken};

#[derive(Debug, Deserialize)]
pub struct CreateDeckPayload {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeckResponse {
    pub id: i64,
    pub name: String,
}

impl From<Deck> for DeckResponse {
    fn from(deck: Deck) -> Self {
        Self {
            id: deck.id,
            name: deck.name,
        }
    }
}

/// Create a deck owned by the caller.
///
/// # Errors
///
/// - `400 Bad Request`: Name empty or longer than 100 characters
pub async fn create_deck(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Json(payload): Json<CreateDeckPayload>,
) -> Result<Json<DeckResponse>, ApiError> {
    let deck = state
        .deck_manager
        .create_deck(token.as_str(), &payload.name)
        .await?;
    Ok(Json(deck.into()))
}

/// List the caller's decks.
pub async fn list_decks(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
) -> Result<Json<Vec<DeckResponse>>, ApiError> {
    let decks = state.deck_manager.list_decks(token.as_str()).await?;
    Ok(Json(decks.into_iter().map(DeckResponse::from).collect()))
}

/// Get one of the caller's decks.
pub async fn get_deck(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Path(deck_id): Path<i64>,
) -> Result<Json<DeckResponse>, ApiError> {
    let deck = state.deck_manager.get_deck(token.as_str(), deck_id).await?;
    Ok(Json(deck.into()))
}
