//! Card API handlers: creation, today's due list and review.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use flashdeck::{Card, DeckError, Performance};
use serde::{Deserialize, Serialize};

use super::{AppState, error::ApiError, middleware::BearerToken};
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct CreateCardPayload {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewPayload {
    pub performance: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CardResponse {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub next_review: DateTime<Utc>,
    pub interval_days: i32,
}

impl From<Card> for CardResponse {
    fn from(card: Card) -> Self {
        Self {
            id: card.id,
            question: card.question,
            answer: card.answer,
            next_review: card.next_review,
            interval_days: card.interval_days,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub message: String,
    pub next_review: DateTime<Utc>,
    pub interval_days: i32,
}

/// Add a card to one of the caller's decks. It is due immediately.
///
/// # Errors
///
/// - `400 Bad Request`: Blank question or answer
/// - `404 Not Found`: Deck absent or not owned by the caller
pub async fn create_card(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Path(deck_id): Path<i64>,
    Json(payload): Json<CreateCardPayload>,
) -> Result<Json<CardResponse>, ApiError> {
    let card = state
        .deck_manager
        .create_card(token.as_str(), deck_id, &payload.question, &payload.answer)
        .await?;
    Ok(Json(card.into()))
}

/// Cards of the deck due now, earliest first.
pub async fn due_today(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Path(deck_id): Path<i64>,
) -> Result<Json<Vec<CardResponse>>, ApiError> {
    let cards = state
        .deck_manager
        .list_due_cards(token.as_str(), deck_id, Utc::now())
        .await?;
    Ok(Json(cards.into_iter().map(CardResponse::from).collect()))
}

/// Record a review graded `easy`, `hard` or `wrong`.
///
/// # Errors
///
/// - `400 Bad Request`: Unknown performance value
/// - `404 Not Found`: Card absent, in another deck, or not owned by the caller
/// - `409 Conflict`: Concurrent reviews of the same card kept colliding
pub async fn review_card(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    Path((deck_id, card_id)): Path<(i64, i64)>,
    Json(payload): Json<ReviewPayload>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let outcome = state
        .deck_manager
        .review_card(token.as_str(), deck_id, card_id, &payload.performance)
        .await
        .inspect_err(|e| {
            if matches!(e, DeckError::ReviewConflict) {
                metrics::review_conflicts_total();
            }
        })?;

    if let Ok(performance) = payload.performance.parse::<Performance>() {
        metrics::reviews_total(performance);
    }

    Ok(Json(ReviewResponse {
        message: "Review recorded".to_string(),
        next_review: outcome.next_review,
        interval_days: outcome.interval_days,
    }))
}
