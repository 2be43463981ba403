//! Database module providing PostgreSQL connection pooling and the repositories
//! behind the user/deck/card ownership graph.
//!
//! Connections are checked out of the pool per query and returned when the
//! query future completes or is dropped, so every exit path releases them.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub mod config;
pub mod errors;
pub mod memory;
pub mod repository;
pub mod timeouts;

pub use config::DatabaseConfig;
pub use errors::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use repository::{DeckRepository, PgDeckRepository, PgUserRepository, UserRepository};

/// Schema applied by [`Database::migrate`]
const SCHEMA: &str = include_str!("../../migrations/001_initial_schema.sql");

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use flashdeck::db::{Database, DatabaseConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), sqlx::Error> {
    ///     let config = DatabaseConfig::from_env();
    ///     let db = Database::new(&config).await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create the `users`, `decks` and `cards` tables if they are missing.
    pub async fn migrate(&self) -> StorageResult<()> {
        timeouts::with_timeout(
            timeouts::MIGRATION_TIMEOUT,
            sqlx::raw_sql(SCHEMA).execute(&self.pool),
        )
        .await?;
        log::info!("Database schema is up to date");
        Ok(())
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> StorageResult<()> {
        timeouts::with_default_timeout(sqlx::query("SELECT 1").execute(&self.pool)).await?;
        Ok(())
    }

    /// Repository for identities, sharing this pool
    pub fn users(&self) -> PgUserRepository {
        PgUserRepository::new(self.pool.clone())
    }

    /// Repository for decks and cards, sharing this pool
    pub fn decks(&self) -> PgDeckRepository {
        PgDeckRepository::new(self.pool.clone())
    }

    /// Close the database connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_defines_all_tables() {
        for table in ["users", "decks", "cards"] {
            assert!(
                SCHEMA.contains(&format!("CREATE TABLE IF NOT EXISTS {table}")),
                "schema is missing table {table}"
            );
        }
        assert!(SCHEMA.contains("interval_days >= 1"));
    }

    #[tokio::test]
    async fn test_database_connection() {
        // Only runs against a real server when one is configured
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            return;
        };

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
            .expect("Failed to connect to database");
        db.migrate().await.expect("Migration failed");
        db.health_check().await.expect("Health check failed");
        db.close().await;
    }
}
