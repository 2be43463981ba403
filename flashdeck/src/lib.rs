//! # Flashdeck
//!
//! Flashcard decks with owner-scoped access and spaced-repetition review.
//!
//! Users register with an email and password, log in for a short-lived bearer
//! token, and use that token to manage their own decks and cards. Reviewing a
//! card grades the recall as `easy`, `hard` or `wrong` and moves the card's
//! next review date accordingly.
//!
//! ## Core Modules
//!
//! - [`auth`]: Registration, login and token verification
//! - [`db`]: PostgreSQL pool plus the user and deck repositories (and an in-memory store)
//! - [`decks`]: Owner-scoped deck and card operations
//! - [`scheduler`]: The review interval rule
//!
//! ## Example
//!
//! ```
//! use chrono::Utc;
//! use flashdeck::{Performance, ReviewState, apply_review};
//!
//! let now = Utc::now();
//! let next = apply_review(&ReviewState::initial(now), Performance::Easy, now);
//! assert_eq!(next.interval_days, 4);
//! ```

/// Registration, login and bearer-token verification.
pub mod auth;
pub use auth::{AuthConfig, AuthError, AuthManager, TokenResponse, User};

/// Storage for users, decks and cards.
pub mod db;
pub use db::{Database, DatabaseConfig, DeckRepository, MemoryStore, StorageError, UserRepository};

/// Owner-scoped deck and card operations.
pub mod decks;
pub use decks::{Card, Deck, DeckError, DeckManager, ReviewOutcome};

/// Review interval rule.
pub mod scheduler;
pub use scheduler::{Performance, ReviewState, apply_review};
