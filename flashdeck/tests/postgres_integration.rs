//! Integration tests against PostgreSQL.
//!
//! Skipped unless `DATABASE_URL` points at a disposable database.

use chrono::{Duration, Utc};
use flashdeck::auth::{AuthConfig, AuthError, AuthManager};
use flashdeck::db::{Database, DatabaseConfig, DeckRepository, StorageError, UserRepository};
use flashdeck::decks::{DeckError, DeckManager};
use std::sync::Arc;

/// Helper to connect and migrate, or `None` when no database is configured
async fn setup_test_db() -> Option<Database> {
    let database_url = std::env::var("DATABASE_URL").ok()?;

    let config = DatabaseConfig {
        database_url,
        max_connections: 5,
        min_connections: 1,
        connection_timeout_secs: 5,
        idle_timeout_secs: 300,
        max_lifetime_secs: 1800,
    };

    let db = Database::new(&config)
        .await
        .expect("Failed to create test database");
    db.migrate().await.expect("Migration failed");
    Some(db)
}

/// Unique email per test run so reruns don't collide
fn unique_email(tag: &str) -> String {
    format!("{tag}-{}@test.local", Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

#[tokio::test]
async fn test_duplicate_email_is_unique_violation() {
    let Some(db) = setup_test_db().await else {
        return;
    };
    let users = db.users();
    let email = unique_email("dup");

    users.create_user(&email, "hash").await.unwrap();
    let result = users.create_user(&email, "hash").await;
    assert!(matches!(result, Err(StorageError::UniqueViolation)));
}

#[tokio::test]
async fn test_review_flow_on_postgres() {
    let Some(db) = setup_test_db().await else {
        return;
    };
    let auth = Arc::new(AuthManager::new(
        Arc::new(db.users()),
        AuthConfig::new("test_secret_key_for_testing_only!", "test_pepper_16ch"),
    ));
    let decks = DeckManager::new(auth.clone(), Arc::new(db.decks()));

    let alice_email = unique_email("alice");
    let bob_email = unique_email("bob");
    auth.register(&alice_email, "pw123").await.unwrap();
    auth.register(&bob_email, "pw123").await.unwrap();
    assert!(matches!(
        auth.register(&alice_email, "other").await,
        Err(AuthError::DuplicateIdentity)
    ));

    let alice = auth.authenticate(&alice_email, "pw123").await.unwrap().access_token;
    let bob = auth.authenticate(&bob_email, "pw123").await.unwrap().access_token;

    let deck = decks.create_deck(&alice, "Spanish").await.unwrap();
    let card = decks.create_card(&alice, deck.id, "hola", "hello").await.unwrap();

    let due = decks.list_due_cards(&alice, deck.id, Utc::now()).await.unwrap();
    assert!(due.iter().any(|c| c.id == card.id));

    let foreign = decks.review_card(&bob, deck.id, card.id, "easy").await;
    assert!(matches!(foreign, Err(DeckError::NotFound)));

    let outcome = decks.review_card(&alice, deck.id, card.id, "hard").await.unwrap();
    assert_eq!(outcome.interval_days, 2);

    let stored = db
        .decks()
        .find_card_for_owner(card.id, deck.id, card_owner(&db, &alice_email).await)
        .await
        .unwrap()
        .expect("Card should still be reachable by its owner");
    assert_eq!(stored.interval_days, 2);
    assert_eq!(stored.version, 1);
    assert!(stored.next_review > Utc::now() + Duration::days(1));
}

#[tokio::test]
async fn test_stale_version_write_rejected() {
    let Some(db) = setup_test_db().await else {
        return;
    };
    let users = db.users();
    let repo = db.decks();

    let owner = users.create_user(&unique_email("cas"), "hash").await.unwrap();
    let deck = repo.create_deck(owner.id, "Spanish").await.unwrap();
    let card = repo
        .create_card_for_owner(deck.id, owner.id, "q", "a", Utc::now())
        .await
        .unwrap()
        .unwrap();

    let later = Utc::now() + Duration::days(2);
    assert!(repo.update_schedule(card.id, card.version, 2, later).await.unwrap());
    assert!(!repo.update_schedule(card.id, card.version, 4, later).await.unwrap());
}

async fn card_owner(db: &Database, email: &str) -> i64 {
    db.users()
        .find_by_email(email)
        .await
        .unwrap()
        .expect("Owner should exist")
        .user
        .id
}
