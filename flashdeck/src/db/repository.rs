//! Repository traits and their PostgreSQL implementations.
//!
//! The managers only talk to storage through these traits, which keeps them
//! testable against [`super::memory::MemoryStore`] and keeps every ownership
//! check inside a single query.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};

use super::errors::StorageResult;
use super::timeouts::with_default_timeout;
use crate::auth::{User, UserId, UserRecord};
use crate::decks::{Card, CardId, Deck, DeckId};

/// Identity and credential storage
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user. Fails with `UniqueViolation` if the email is taken.
    async fn create_user(&self, email: &str, password_hash: &str) -> StorageResult<User>;

    /// Find user and password hash by email
    async fn find_by_email(&self, email: &str) -> StorageResult<Option<UserRecord>>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: UserId) -> StorageResult<Option<User>>;
}

/// The ownership graph `User -> Deck -> Card`.
///
/// Every lookup that takes an `owner_id` filters on it in the same query, so
/// "does not exist" and "belongs to someone else" produce the same `None`.
#[async_trait]
pub trait DeckRepository: Send + Sync {
    /// Create a deck owned by `owner_id`
    async fn create_deck(&self, owner_id: UserId, name: &str) -> StorageResult<Deck>;

    /// Deck `deck_id`, only if it belongs to `owner_id`
    async fn find_deck_for_owner(
        &self,
        deck_id: DeckId,
        owner_id: UserId,
    ) -> StorageResult<Option<Deck>>;

    /// All decks of `owner_id`, ordered by id
    async fn list_decks_for_owner(&self, owner_id: UserId) -> StorageResult<Vec<Deck>>;

    /// Create a card in `deck_id` if that deck belongs to `owner_id`.
    ///
    /// The card starts with `interval_days = 1` and `next_review = now`.
    async fn create_card_for_owner(
        &self,
        deck_id: DeckId,
        owner_id: UserId,
        question: &str,
        answer: &str,
        now: DateTime<Utc>,
    ) -> StorageResult<Option<Card>>;

    /// Card `card_id`, only if it sits in `deck_id` and that deck belongs to `owner_id`
    async fn find_card_for_owner(
        &self,
        card_id: CardId,
        deck_id: DeckId,
        owner_id: UserId,
    ) -> StorageResult<Option<Card>>;

    /// Cards of an owned deck with `next_review <= as_of`, earliest first
    async fn due_cards(
        &self,
        deck_id: DeckId,
        owner_id: UserId,
        as_of: DateTime<Utc>,
    ) -> StorageResult<Vec<Card>>;

    /// Write a new schedule if the card is still at `expected_version`.
    ///
    /// Returns `false` when another write got there first.
    async fn update_schedule(
        &self,
        card_id: CardId,
        expected_version: i64,
        interval_days: i32,
        next_review: DateTime<Utc>,
    ) -> StorageResult<bool>;
}

const USER_COLUMNS: &str = "id, email, created_at";
const DECK_COLUMNS: &str = "id, name, owner_id, created_at";
const CARD_COLUMNS: &str =
    "c.id, c.deck_id, c.question, c.answer, c.interval_days, c.next_review, c.version, c.created_at";

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        created_at: row.try_get("created_at")?,
    })
}

fn deck_from_row(row: &PgRow) -> Result<Deck, sqlx::Error> {
    Ok(Deck {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        owner_id: row.try_get("owner_id")?,
        created_at: row.try_get("created_at")?,
    })
}

fn card_from_row(row: &PgRow) -> Result<Card, sqlx::Error> {
    Ok(Card {
        id: row.try_get("id")?,
        deck_id: row.try_get("deck_id")?,
        question: row.try_get("question")?,
        answer: row.try_get("answer")?,
        interval_days: row.try_get("interval_days")?,
        next_review: row.try_get("next_review")?,
        version: row.try_get("version")?,
        created_at: row.try_get("created_at")?,
    })
}

/// PostgreSQL implementation of [`UserRepository`]
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(&self, email: &str, password_hash: &str) -> StorageResult<User> {
        let sql = format!(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
        );
        with_default_timeout(async {
            let row = sqlx::query(&sql)
                .bind(email)
                .bind(password_hash)
                .fetch_one(&self.pool)
                .await?;
            user_from_row(&row)
        })
        .await
    }

    async fn find_by_email(&self, email: &str) -> StorageResult<Option<UserRecord>> {
        let sql = format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1");
        with_default_timeout(async {
            let row = sqlx::query(&sql)
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
            row.map(|r| -> Result<UserRecord, sqlx::Error> {
                Ok(UserRecord {
                    user: user_from_row(&r)?,
                    password_hash: r.try_get("password_hash")?,
                })
            })
            .transpose()
        })
        .await
    }

    async fn find_by_id(&self, user_id: UserId) -> StorageResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        with_default_timeout(async {
            let row = sqlx::query(&sql)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
            row.as_ref().map(user_from_row).transpose()
        })
        .await
    }
}

/// PostgreSQL implementation of [`DeckRepository`]
#[derive(Clone)]
pub struct PgDeckRepository {
    pool: PgPool,
}

impl PgDeckRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeckRepository for PgDeckRepository {
    async fn create_deck(&self, owner_id: UserId, name: &str) -> StorageResult<Deck> {
        let sql =
            format!("INSERT INTO decks (name, owner_id) VALUES ($1, $2) RETURNING {DECK_COLUMNS}");
        with_default_timeout(async {
            let row = sqlx::query(&sql)
                .bind(name)
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await?;
            deck_from_row(&row)
        })
        .await
    }

    async fn find_deck_for_owner(
        &self,
        deck_id: DeckId,
        owner_id: UserId,
    ) -> StorageResult<Option<Deck>> {
        let sql = format!("SELECT {DECK_COLUMNS} FROM decks WHERE id = $1 AND owner_id = $2");
        with_default_timeout(async {
            let row = sqlx::query(&sql)
                .bind(deck_id)
                .bind(owner_id)
                .fetch_optional(&self.pool)
                .await?;
            row.as_ref().map(deck_from_row).transpose()
        })
        .await
    }

    async fn list_decks_for_owner(&self, owner_id: UserId) -> StorageResult<Vec<Deck>> {
        let sql = format!("SELECT {DECK_COLUMNS} FROM decks WHERE owner_id = $1 ORDER BY id");
        with_default_timeout(async {
            let rows = sqlx::query(&sql)
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await?;
            rows.iter().map(deck_from_row).collect::<Result<Vec<_>, _>>()
        })
        .await
    }

    async fn create_card_for_owner(
        &self,
        deck_id: DeckId,
        owner_id: UserId,
        question: &str,
        answer: &str,
        now: DateTime<Utc>,
    ) -> StorageResult<Option<Card>> {
        // The SELECT yields no row unless the deck is owned, so nothing is inserted.
        let sql = format!(
            r#"
            INSERT INTO cards AS c (deck_id, question, answer, interval_days, next_review, version, created_at)
            SELECT d.id, $3, $4, 1, $5, 0, $5
            FROM decks d
            WHERE d.id = $1 AND d.owner_id = $2
            RETURNING {CARD_COLUMNS}
            "#
        );
        with_default_timeout(async {
            let row = sqlx::query(&sql)
                .bind(deck_id)
                .bind(owner_id)
                .bind(question)
                .bind(answer)
                .bind(now)
                .fetch_optional(&self.pool)
                .await?;
            row.as_ref().map(card_from_row).transpose()
        })
        .await
    }

    async fn find_card_for_owner(
        &self,
        card_id: CardId,
        deck_id: DeckId,
        owner_id: UserId,
    ) -> StorageResult<Option<Card>> {
        let sql = format!(
            r#"
            SELECT {CARD_COLUMNS}
            FROM cards c
            JOIN decks d ON d.id = c.deck_id
            WHERE c.id = $1 AND c.deck_id = $2 AND d.owner_id = $3
            "#
        );
        with_default_timeout(async {
            let row = sqlx::query(&sql)
                .bind(card_id)
                .bind(deck_id)
                .bind(owner_id)
                .fetch_optional(&self.pool)
                .await?;
            row.as_ref().map(card_from_row).transpose()
        })
        .await
    }

    async fn due_cards(
        &self,
        deck_id: DeckId,
        owner_id: UserId,
        as_of: DateTime<Utc>,
    ) -> StorageResult<Vec<Card>> {
        let sql = format!(
            r#"
            SELECT {CARD_COLUMNS}
            FROM cards c
            JOIN decks d ON d.id = c.deck_id
            WHERE c.deck_id = $1 AND d.owner_id = $2 AND c.next_review <= $3
            ORDER BY c.next_review ASC, c.id ASC
            "#
        );
        with_default_timeout(async {
            let rows = sqlx::query(&sql)
                .bind(deck_id)
                .bind(owner_id)
                .bind(as_of)
                .fetch_all(&self.pool)
                .await?;
            rows.iter().map(card_from_row).collect::<Result<Vec<_>, _>>()
        })
        .await
    }

    async fn update_schedule(
        &self,
        card_id: CardId,
        expected_version: i64,
        interval_days: i32,
        next_review: DateTime<Utc>,
    ) -> StorageResult<bool> {
        let result = with_default_timeout(
            sqlx::query(
                "UPDATE cards
                 SET interval_days = $1, next_review = $2, version = version + 1
                 WHERE id = $3 AND version = $4",
            )
            .bind(interval_days)
            .bind(next_review)
            .bind(card_id)
            .bind(expected_version)
            .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
