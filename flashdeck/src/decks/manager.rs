//! Deck manager: authenticated, owner-scoped access to decks and cards.

use super::{
    errors::{DeckError, DeckResult},
    models::{Card, CardId, Deck, DeckId, ReviewOutcome},
};
use crate::auth::{AuthManager, User};
use crate::db::DeckRepository;
use crate::scheduler::{Performance, apply_review};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Longest accepted deck name, in characters
pub const MAX_DECK_NAME_LEN: usize = 100;

/// How many times a review is re-applied after losing a concurrent update
pub const MAX_REVIEW_ATTEMPTS: u32 = 3;

/// Deck manager
#[derive(Clone)]
pub struct DeckManager {
    auth: Arc<AuthManager>,
    decks: Arc<dyn DeckRepository>,
}

impl DeckManager {
    /// Create a new deck manager
    ///
    /// # Arguments
    ///
    /// * `auth` - Resolves bearer tokens to users
    /// * `decks` - Ownership graph storage
    pub fn new(auth: Arc<AuthManager>, decks: Arc<dyn DeckRepository>) -> Self {
        Self { auth, decks }
    }

    /// Create a deck owned by the token's user
    ///
    /// # Errors
    ///
    /// * `DeckError::Auth` - Token rejected
    /// * `DeckError::InvalidInput` - Name blank or longer than [`MAX_DECK_NAME_LEN`]
    pub async fn create_deck(&self, token: &str, name: &str) -> DeckResult<Deck> {
        let user = self.owner(token).await?;
        let name = validate_deck_name(name)?;

        let deck = self.decks.create_deck(user.id, name).await?;
        log::debug!("User {} created deck {}", user.id, deck.id);
        Ok(deck)
    }

    /// All decks of the token's user. Empty when there are none.
    pub async fn list_decks(&self, token: &str) -> DeckResult<Vec<Deck>> {
        let user = self.owner(token).await?;
        Ok(self.decks.list_decks_for_owner(user.id).await?)
    }

    /// One deck of the token's user
    ///
    /// # Errors
    ///
    /// * `DeckError::NotFound` - Deck absent or owned by someone else
    pub async fn get_deck(&self, token: &str, deck_id: DeckId) -> DeckResult<Deck> {
        let user = self.owner(token).await?;
        self.owned_deck(deck_id, &user).await
    }

    /// Add a card to an owned deck. The card is due immediately with a one-day interval.
    ///
    /// # Errors
    ///
    /// * `DeckError::NotFound` - Deck absent or owned by someone else
    /// * `DeckError::InvalidInput` - Blank question or answer
    pub async fn create_card(
        &self,
        token: &str,
        deck_id: DeckId,
        question: &str,
        answer: &str,
    ) -> DeckResult<Card> {
        let user = self.owner(token).await?;
        self.owned_deck(deck_id, &user).await?;

        if question.trim().is_empty() {
            return Err(DeckError::InvalidInput("Question must not be empty".to_string()));
        }
        if answer.trim().is_empty() {
            return Err(DeckError::InvalidInput("Answer must not be empty".to_string()));
        }

        let card = self
            .decks
            .create_card_for_owner(deck_id, user.id, question, answer, Utc::now())
            .await?
            .ok_or(DeckError::NotFound)?;

        log::debug!("User {} added card {} to deck {}", user.id, card.id, deck_id);
        Ok(card)
    }

    /// Cards of an owned deck that are due at `as_of`, earliest first
    ///
    /// # Errors
    ///
    /// * `DeckError::NotFound` - Deck absent or owned by someone else
    pub async fn list_due_cards(
        &self,
        token: &str,
        deck_id: DeckId,
        as_of: DateTime<Utc>,
    ) -> DeckResult<Vec<Card>> {
        let user = self.owner(token).await?;
        self.owned_deck(deck_id, &user).await?;
        Ok(self.decks.due_cards(deck_id, user.id, as_of).await?)
    }

    /// Record one review of a card and reschedule it
    ///
    /// The new schedule is written with a version check. If another review
    /// lands first, the card is re-read and this review is applied on top,
    /// up to [`MAX_REVIEW_ATTEMPTS`] times.
    ///
    /// # Errors
    ///
    /// * `DeckError::NotFound` - Card absent, not in `deck_id`, or deck owned by someone else
    /// * `DeckError::InvalidPerformance` - Not one of `easy`, `hard`, `wrong`; nothing is written
    /// * `DeckError::ReviewConflict` - Every attempt lost to a concurrent review
    pub async fn review_card(
        &self,
        token: &str,
        deck_id: DeckId,
        card_id: CardId,
        performance: &str,
    ) -> DeckResult<ReviewOutcome> {
        let user = self.owner(token).await?;
        let mut card = self.owned_card(card_id, deck_id, &user).await?;
        let performance: Performance = performance.parse()?;

        let mut attempt = 1;
        loop {
            let next = apply_review(&card.review_state(), performance, Utc::now());
            let written = self
                .decks
                .update_schedule(card.id, card.version, next.interval_days, next.next_review)
                .await?;

            if written {
                log::debug!(
                    "Card {} reviewed as {}: interval {} -> {} days",
                    card.id,
                    performance,
                    card.interval_days,
                    next.interval_days
                );
                return Ok(ReviewOutcome {
                    card_id: card.id,
                    interval_days: next.interval_days,
                    next_review: next.next_review,
                });
            }

            if attempt >= MAX_REVIEW_ATTEMPTS {
                log::warn!("Giving up on review of card {} after {attempt} attempts", card.id);
                return Err(DeckError::ReviewConflict);
            }
            attempt += 1;
            card = self.owned_card(card_id, deck_id, &user).await?;
        }
    }

    async fn owner(&self, token: &str) -> DeckResult<User> {
        Ok(self.auth.verify(token).await?)
    }

    async fn owned_deck(&self, deck_id: DeckId, user: &User) -> DeckResult<Deck> {
        self.decks
            .find_deck_for_owner(deck_id, user.id)
            .await?
            .ok_or(DeckError::NotFound)
    }

    async fn owned_card(&self, card_id: CardId, deck_id: DeckId, user: &User) -> DeckResult<Card> {
        self.decks
            .find_card_for_owner(card_id, deck_id, user.id)
            .await?
            .ok_or(DeckError::NotFound)
    }
}

fn validate_deck_name(name: &str) -> DeckResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DeckError::InvalidInput("Deck name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_DECK_NAME_LEN {
        return Err(DeckError::InvalidInput(format!(
            "Deck name must be at most {MAX_DECK_NAME_LEN} characters"
        )));
    }
    Ok(name)
}
