//! Integration tests for the register → login → deck → card → review flow.
//!
//! Runs against the in-memory store so no database is needed.

use chrono::{Duration, Utc};
use flashdeck::auth::{AuthConfig, AuthError, AuthManager};
use flashdeck::db::MemoryStore;
use flashdeck::decks::{DeckError, DeckManager};
use flashdeck::scheduler::MAX_INTERVAL_DAYS;
use std::sync::Arc;

struct Service {
    store: Arc<MemoryStore>,
    auth: Arc<AuthManager>,
    decks: DeckManager,
}

/// Helper to wire the service over a fresh store
fn setup_service() -> Service {
    let store = Arc::new(MemoryStore::new());
    let auth = Arc::new(AuthManager::new(
        store.clone(),
        AuthConfig::new("test_secret_key_for_testing_only!", "test_pepper_16ch"),
    ));
    let decks = DeckManager::new(auth.clone(), store.clone());
    Service { store, auth, decks }
}

/// Helper to register a user and return a fresh token
async fn login_as(service: &Service, email: &str) -> String {
    service
        .auth
        .register(email, "pw123")
        .await
        .expect("Registration should succeed");
    service
        .auth
        .authenticate(email, "pw123")
        .await
        .expect("Login should succeed")
        .access_token
}

#[tokio::test]
async fn test_register_and_login() {
    let service = setup_service();

    let user = service.auth.register("a@x.com", "pw123").await.unwrap();
    assert_eq!(user.email, "a@x.com");

    let token = service.auth.authenticate("a@x.com", "pw123").await.unwrap();
    assert_eq!(token.token_type, "bearer");
    assert!(!token.access_token.is_empty());

    let result = service.auth.authenticate("a@x.com", "wrong").await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_new_card_is_due_immediately() {
    let service = setup_service();
    let token = login_as(&service, "a@x.com").await;

    let deck = service.decks.create_deck(&token, "Spanish").await.unwrap();
    let card = service
        .decks
        .create_card(&token, deck.id, "hola", "hello")
        .await
        .unwrap();
    assert_eq!(card.interval_days, 1);

    let due = service
        .decks
        .list_due_cards(&token, deck.id, Utc::now())
        .await
        .unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, card.id);
    assert_eq!(due[0].question, "hola");
    assert_eq!(due[0].answer, "hello");
}

#[tokio::test]
async fn test_hard_then_wrong() {
    let service = setup_service();
    let token = login_as(&service, "a@x.com").await;
    let deck = service.decks.create_deck(&token, "Spanish").await.unwrap();
    let card = service
        .decks
        .create_card(&token, deck.id, "hola", "hello")
        .await
        .unwrap();

    let before = Utc::now();
    let outcome = service
        .decks
        .review_card(&token, deck.id, card.id, "hard")
        .await
        .unwrap();
    let after = Utc::now();
    assert_eq!(outcome.interval_days, 2);
    assert!(outcome.next_review >= before + Duration::days(2));
    assert!(outcome.next_review <= after + Duration::days(2));

    let before = Utc::now();
    let outcome = service
        .decks
        .review_card(&token, deck.id, card.id, "wrong")
        .await
        .unwrap();
    let after = Utc::now();
    assert_eq!(outcome.interval_days, 1);
    assert!(outcome.next_review >= before + Duration::days(1));
    assert!(outcome.next_review <= after + Duration::days(1));
}

#[tokio::test]
async fn test_oversized_stored_interval_is_capped_on_review() {
    let service = setup_service();
    let token = login_as(&service, "a@x.com").await;
    let deck = service.decks.create_deck(&token, "Spanish").await.unwrap();
    let card = service
        .decks
        .create_card(&token, deck.id, "hola", "hello")
        .await
        .unwrap();
    assert!(service.store.set_schedule(card.id, i32::MAX, Utc::now()));

    let outcome = service
        .decks
        .review_card(&token, deck.id, card.id, "easy")
        .await
        .unwrap();
    assert_eq!(outcome.interval_days, MAX_INTERVAL_DAYS);
    assert!(outcome.next_review > Utc::now() + Duration::days(i64::from(MAX_INTERVAL_DAYS) - 1));
}

#[tokio::test]
async fn test_foreign_user_cannot_review() {
    let service = setup_service();
    let alice = login_as(&service, "alice@x.com").await;
    let bob = login_as(&service, "bob@x.com").await;

    let deck = service.decks.create_deck(&alice, "Spanish").await.unwrap();
    let card = service
        .decks
        .create_card(&alice, deck.id, "hola", "hello")
        .await
        .unwrap();

    let result = service.decks.review_card(&bob, deck.id, card.id, "easy").await;
    assert!(matches!(result, Err(DeckError::NotFound)));

    let due = service
        .decks
        .list_due_cards(&alice, deck.id, Utc::now())
        .await
        .unwrap();
    assert_eq!(due[0].interval_days, 1, "Foreign review must not change the card");
}

#[tokio::test]
async fn test_unknown_performance_leaves_card_unchanged() {
    let service = setup_service();
    let token = login_as(&service, "a@x.com").await;
    let deck = service.decks.create_deck(&token, "Spanish").await.unwrap();
    let card = service
        .decks
        .create_card(&token, deck.id, "hola", "hello")
        .await
        .unwrap();

    let result = service.decks.review_card(&token, deck.id, card.id, "meh").await;
    assert!(matches!(result, Err(DeckError::InvalidPerformance(p)) if p == "meh"));

    let due = service
        .decks
        .list_due_cards(&token, deck.id, Utc::now())
        .await
        .unwrap();
    assert_eq!(due[0].interval_days, card.interval_days);
    assert_eq!(due[0].next_review, card.next_review);
    assert_eq!(due[0].version, card.version);
}

#[tokio::test]
async fn test_reviews_compound() {
    let service = setup_service();
    let token = login_as(&service, "a@x.com").await;
    let deck = service.decks.create_deck(&token, "Spanish").await.unwrap();
    let card = service
        .decks
        .create_card(&token, deck.id, "hola", "hello")
        .await
        .unwrap();

    let first = service
        .decks
        .review_card(&token, deck.id, card.id, "easy")
        .await
        .unwrap();
    let second = service
        .decks
        .review_card(&token, deck.id, card.id, "easy")
        .await
        .unwrap();

    assert_eq!(first.interval_days, 4);
    assert_eq!(second.interval_days, 7, "Two easy reviews add six days, not three");
}

#[tokio::test]
async fn test_reviewed_card_leaves_due_list() {
    let service = setup_service();
    let token = login_as(&service, "a@x.com").await;
    let deck = service.decks.create_deck(&token, "Spanish").await.unwrap();
    let card = service
        .decks
        .create_card(&token, deck.id, "hola", "hello")
        .await
        .unwrap();

    service
        .decks
        .review_card(&token, deck.id, card.id, "wrong")
        .await
        .unwrap();

    let now = Utc::now();
    let due_now = service.decks.list_due_cards(&token, deck.id, now).await.unwrap();
    assert!(due_now.is_empty());

    let tomorrow = now + Duration::days(1) + Duration::minutes(1);
    let due_later = service
        .decks
        .list_due_cards(&token, deck.id, tomorrow)
        .await
        .unwrap();
    assert_eq!(due_later.len(), 1);
}

#[tokio::test]
async fn test_due_cards_earliest_first() {
    let service = setup_service();
    let token = login_as(&service, "a@x.com").await;
    let deck = service.decks.create_deck(&token, "Spanish").await.unwrap();

    let now = Utc::now();
    let mut ids = Vec::new();
    for (question, days_ago) in [("uno", 1), ("dos", 5), ("tres", 3)] {
        let card = service
            .decks
            .create_card(&token, deck.id, question, "x")
            .await
            .unwrap();
        assert!(service.store.set_schedule(card.id, 1, now - Duration::days(days_ago)));
        ids.push(card.id);
    }

    let due = service.decks.list_due_cards(&token, deck.id, now).await.unwrap();
    let order: Vec<_> = due.iter().map(|c| c.id).collect();
    assert_eq!(order, vec![ids[1], ids[2], ids[0]]);
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let service = setup_service();
    service.auth.register("a@x.com", "pw123").await.unwrap();

    let stale = service
        .auth
        .issue_at("a@x.com", Utc::now() - Duration::hours(2))
        .unwrap();
    let result = service.decks.list_decks(&stale).await;
    assert!(matches!(
        result,
        Err(DeckError::Auth(AuthError::TokenExpired))
    ));
}

#[tokio::test]
async fn test_deleted_user_token_rejected() {
    let service = setup_service();
    let user = service.auth.register("a@x.com", "pw123").await.unwrap();
    let token = service
        .auth
        .authenticate("a@x.com", "pw123")
        .await
        .unwrap()
        .access_token;

    assert!(service.store.remove_user(user.id));

    let result = service.decks.list_decks(&token).await;
    assert!(matches!(
        result,
        Err(DeckError::Auth(AuthError::UnknownIdentity))
    ));
}
