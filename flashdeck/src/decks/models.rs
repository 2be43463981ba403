//! Deck and card data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::UserId;
use crate::scheduler::ReviewState;

/// Deck ID type
pub type DeckId = i64;

/// Card ID type
pub type CardId = i64;

/// Named collection of cards. `owner_id` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub id: DeckId,
    pub name: String,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Question/answer pair with its review schedule. `deck_id` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub deck_id: DeckId,
    pub question: String,
    pub answer: String,
    pub interval_days: i32,
    pub next_review: DateTime<Utc>,
    /// Bumped on every schedule write; used for optimistic concurrency.
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

impl Card {
    pub fn review_state(&self) -> ReviewState {
        ReviewState {
            interval_days: self.interval_days,
            next_review: self.next_review,
        }
    }
}

/// Scheduling state returned after a review was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub card_id: CardId,
    pub interval_days: i32,
    pub next_review: DateTime<Utc>,
}
