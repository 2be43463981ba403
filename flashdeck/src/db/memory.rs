//! In-process storage.
//!
//! Implements both repository traits over plain collections guarded by a
//! single mutex. Used by the test suites and by the server's `--in-memory`
//! mode; nothing is persisted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::errors::{StorageError, StorageResult};
use super::repository::{DeckRepository, UserRepository};
use crate::auth::{User, UserId, UserRecord};
use crate::decks::{Card, CardId, Deck, DeckId};
use crate::scheduler::INITIAL_INTERVAL_DAYS;

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, UserRecord>,
    decks: BTreeMap<DeckId, Deck>,
    cards: BTreeMap<CardId, Card>,
    next_user_id: i64,
    next_deck_id: i64,
    next_card_id: i64,
}

impl Tables {
    fn owns_deck(&self, deck_id: DeckId, owner_id: UserId) -> bool {
        self.decks
            .get(&deck_id)
            .is_some_and(|deck| deck.owner_id == owner_id)
    }
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Mutex-backed store implementing [`UserRepository`] and [`DeckRepository`]
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a user, leaving their decks behind. Models an account deleted
    /// after a token was issued.
    pub fn remove_user(&self, user_id: UserId) -> bool {
        self.lock().users.remove(&user_id).is_some()
    }

    /// Number of stored cards
    pub fn card_count(&self) -> usize {
        self.lock().cards.len()
    }

    /// Overwrite a card's schedule without a version check. Test helper for
    /// setting up arbitrary states.
    pub fn set_schedule(&self, card_id: CardId, interval_days: i32, next_review: DateTime<Utc>) -> bool {
        match self.lock().cards.get_mut(&card_id) {
            Some(card) => {
                card.interval_days = interval_days;
                card.next_review = next_review;
                card.version += 1;
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> StorageResult<User> {
        let mut tables = self.lock();
        if tables.users.values().any(|r| r.user.email == email) {
            return Err(StorageError::UniqueViolation);
        }

        let id = next_id(&mut tables.next_user_id);
        let user = User {
            id,
            email: email.to_string(),
            created_at: Utc::now(),
        };
        tables.users.insert(
            id,
            UserRecord {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> StorageResult<Option<UserRecord>> {
        let tables = self.lock();
        Ok(tables.users.values().find(|r| r.user.email == email).cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> StorageResult<Option<User>> {
        Ok(self.lock().users.get(&user_id).map(|r| r.user.clone()))
    }
}

#[async_trait]
impl DeckRepository for MemoryStore {
    async fn create_deck(&self, owner_id: UserId, name: &str) -> StorageResult<Deck> {
        let mut tables = self.lock();
        let id = next_id(&mut tables.next_deck_id);
        let deck = Deck {
            id,
            name: name.to_string(),
            owner_id,
            created_at: Utc::now(),
        };
        tables.decks.insert(id, deck.clone());
        Ok(deck)
    }

    async fn find_deck_for_owner(
        &self,
        deck_id: DeckId,
        owner_id: UserId,
    ) -> StorageResult<Option<Deck>> {
        let tables = self.lock();
        Ok(tables
            .decks
            .get(&deck_id)
            .filter(|deck| deck.owner_id == owner_id)
            .cloned())
    }

    async fn list_decks_for_owner(&self, owner_id: UserId) -> StorageResult<Vec<Deck>> {
        let tables = self.lock();
        Ok(tables
            .decks
            .values()
            .filter(|deck| deck.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn create_card_for_owner(
        &self,
        deck_id: DeckId,
        owner_id: UserId,
        question: &str,
        answer: &str,
        now: DateTime<Utc>,
    ) -> StorageResult<Option<Card>> {
        let mut tables = self.lock();
        if !tables.owns_deck(deck_id, owner_id) {
            return Ok(None);
        }

        let id = next_id(&mut tables.next_card_id);
        let card = Card {
            id,
            deck_id,
            question: question.to_string(),
            answer: answer.to_string(),
            interval_days: INITIAL_INTERVAL_DAYS,
            next_review: now,
            version: 0,
            created_at: now,
        };
        tables.cards.insert(id, card.clone());
        Ok(Some(card))
    }

    async fn find_card_for_owner(
        &self,
        card_id: CardId,
        deck_id: DeckId,
        owner_id: UserId,
    ) -> StorageResult<Option<Card>> {
        let tables = self.lock();
        Ok(tables
            .cards
            .get(&card_id)
            .filter(|card| card.deck_id == deck_id && tables.owns_deck(card.deck_id, owner_id))
            .cloned())
    }

    async fn due_cards(
        &self,
        deck_id: DeckId,
        owner_id: UserId,
        as_of: DateTime<Utc>,
    ) -> StorageResult<Vec<Card>> {
        let tables = self.lock();
        if !tables.owns_deck(deck_id, owner_id) {
            return Ok(Vec::new());
        }

        let mut due: Vec<Card> = tables
            .cards
            .values()
            .filter(|card| card.deck_id == deck_id && card.review_state().is_due(as_of))
            .cloned()
            .collect();
        due.sort_by_key(|card| (card.next_review, card.id));
        Ok(due)
    }

    async fn update_schedule(
        &self,
        card_id: CardId,
        expected_version: i64,
        interval_days: i32,
        next_review: DateTime<Utc>,
    ) -> StorageResult<bool> {
        let mut tables = self.lock();
        match tables.cards.get_mut(&card_id) {
            Some(card) if card.version == expected_version => {
                card.interval_days = interval_days;
                card.next_review = next_review;
                card.version += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store.create_user("a@x.com", "hash").await.unwrap();

        let err = store.create_user("a@x.com", "other").await.unwrap_err();
        assert!(matches!(err, StorageError::UniqueViolation));
    }

    #[tokio::test]
    async fn test_foreign_and_missing_deck_look_the_same() {
        let store = MemoryStore::new();
        let owner = store.create_user("owner@x.com", "h").await.unwrap();
        let other = store.create_user("other@x.com", "h").await.unwrap();
        let deck = store.create_deck(owner.id, "Spanish").await.unwrap();

        assert!(store.find_deck_for_owner(deck.id, owner.id).await.unwrap().is_some());
        assert!(store.find_deck_for_owner(deck.id, other.id).await.unwrap().is_none());
        assert!(store.find_deck_for_owner(999, other.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_card_requires_matching_deck() {
        let store = MemoryStore::new();
        let owner = store.create_user("owner@x.com", "h").await.unwrap();
        let first = store.create_deck(owner.id, "One").await.unwrap();
        let second = store.create_deck(owner.id, "Two").await.unwrap();
        let card = store
            .create_card_for_owner(first.id, owner.id, "q", "a", Utc::now())
            .await
            .unwrap()
            .unwrap();

        let found = store.find_card_for_owner(card.id, second.id, owner.id).await.unwrap();
        assert!(found.is_none(), "card looked up through the wrong deck");
    }

    #[tokio::test]
    async fn test_due_cards_sorted_earliest_first() {
        let store = MemoryStore::new();
        let owner = store.create_user("owner@x.com", "h").await.unwrap();
        let deck = store.create_deck(owner.id, "Deck").await.unwrap();
        let now = Utc::now();

        let late = store
            .create_card_for_owner(deck.id, owner.id, "late", "a", now)
            .await
            .unwrap()
            .unwrap();
        let early = store
            .create_card_for_owner(deck.id, owner.id, "early", "a", now)
            .await
            .unwrap()
            .unwrap();
        let future = store
            .create_card_for_owner(deck.id, owner.id, "future", "a", now)
            .await
            .unwrap()
            .unwrap();
        store.set_schedule(early.id, 1, now - Duration::days(2));
        store.set_schedule(late.id, 1, now - Duration::hours(1));
        store.set_schedule(future.id, 1, now + Duration::days(1));

        let due = store.due_cards(deck.id, owner.id, now).await.unwrap();
        let ids: Vec<_> = due.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![early.id, late.id]);
    }

    #[tokio::test]
    async fn test_stale_version_is_rejected() {
        let store = MemoryStore::new();
        let owner = store.create_user("owner@x.com", "h").await.unwrap();
        let deck = store.create_deck(owner.id, "Deck").await.unwrap();
        let card = store
            .create_card_for_owner(deck.id, owner.id, "q", "a", Utc::now())
            .await
            .unwrap()
            .unwrap();

        assert!(store.update_schedule(card.id, 0, 2, Utc::now()).await.unwrap());
        assert!(!store.update_schedule(card.id, 0, 5, Utc::now()).await.unwrap());

        let stored = store.find_card_for_owner(card.id, deck.id, owner.id).await.unwrap().unwrap();
        assert_eq!(stored.interval_days, 2);
        assert_eq!(stored.version, 1);
    }
}
