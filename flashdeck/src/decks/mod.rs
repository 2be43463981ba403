//! Owner-scoped deck and card operations.
//!
//! Every operation resolves the bearer token to a user first and then looks
//! the target up through the ownership graph filtered by that user. A miss in
//! either lookup surfaces as [`DeckError::NotFound`], whether the resource is
//! absent or belongs to someone else.
//!
//! ## Example
//!
//! ```no_run
//! use flashdeck::auth::{AuthConfig, AuthManager};
//! use flashdeck::db::MemoryStore;
//! use flashdeck::decks::DeckManager;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::new());
//!     let auth = Arc::new(AuthManager::new(
//!         store.clone(),
//!         AuthConfig::new("jwt_secret_of_at_least_32_characters", "secret_pepper"),
//!     ));
//!     let decks = DeckManager::new(auth.clone(), store);
//!
//!     auth.register("a@x.com", "pw123").await?;
//!     let token = auth.authenticate("a@x.com", "pw123").await?.access_token;
//!
//!     let deck = decks.create_deck(&token, "Spanish").await?;
//!     let card = decks.create_card(&token, deck.id, "hola", "hello").await?;
//!     let outcome = decks.review_card(&token, deck.id, card.id, "hard").await?;
//!     assert_eq!(outcome.interval_days, 2);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{DeckError, DeckResult};
pub use manager::{DeckManager, MAX_DECK_NAME_LEN, MAX_REVIEW_ATTEMPTS};
pub use models::{Card, CardId, Deck, DeckId, ReviewOutcome};
