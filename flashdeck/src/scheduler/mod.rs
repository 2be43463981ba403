//! Review scheduling.
//!
//! A card's review state is the pair `(interval_days, next_review)`. Each
//! review event moves that pair forward according to how well the card was
//! recalled:
//!
//! | performance | new interval |
//! |-------------|--------------|
//! | `easy`      | `I + 3`      |
//! | `hard`      | `I + 1`      |
//! | `wrong`     | `1`          |
//!
//! and the card becomes due again `new interval` days after the review.
//! Intervals never exceed [`MAX_INTERVAL_DAYS`].
//! There is no terminal state and no "reviewed" flag; a card is due whenever
//! `next_review <= now`.
//!
//! The transition is deliberately not idempotent: applying `easy` twice adds
//! six days, because each call is a separate review event.
//!
//! ## Example
//!
//! ```
//! use chrono::Utc;
//! use flashdeck::scheduler::{apply_review, Performance, ReviewState};
//!
//! let now = Utc::now();
//! let state = ReviewState::initial(now);
//! let performance: Performance = "hard".parse().unwrap();
//!
//! let next = apply_review(&state, performance, now);
//! assert_eq!(next.interval_days, 2);
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Interval given to a brand-new or forgotten card.
pub const INITIAL_INTERVAL_DAYS: i32 = 1;

/// Longest interval a card can reach, about a hundred years.
pub const MAX_INTERVAL_DAYS: i32 = 36_500;

/// Scheduler errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("Invalid performance: {0}")]
    InvalidPerformance(String),
}

/// Recall quality reported for a single review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Performance {
    Easy,
    Hard,
    Wrong,
}

impl Performance {
    pub const ALL: [Performance; 3] = [Performance::Easy, Performance::Hard, Performance::Wrong];

    pub fn as_str(&self) -> &'static str {
        match self {
            Performance::Easy => "easy",
            Performance::Hard => "hard",
            Performance::Wrong => "wrong",
        }
    }
}

impl fmt::Display for Performance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Performance {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Performance::Easy),
            "hard" => Ok(Performance::Hard),
            "wrong" => Ok(Performance::Wrong),
            other => Err(SchedulerError::InvalidPerformance(other.to_string())),
        }
    }
}

/// Scheduling state carried by every card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewState {
    pub interval_days: i32,
    pub next_review: DateTime<Utc>,
}

impl ReviewState {
    /// State of a freshly created card: due immediately.
    pub fn initial(now: DateTime<Utc>) -> Self {
        Self {
            interval_days: INITIAL_INTERVAL_DAYS,
            next_review: now,
        }
    }

    pub fn is_due(&self, as_of: DateTime<Utc>) -> bool {
        self.next_review <= as_of
    }
}

/// Interval after one review, within `INITIAL_INTERVAL_DAYS..=MAX_INTERVAL_DAYS`.
pub fn next_interval(current: i32, performance: Performance) -> i32 {
    // stored values outside the range are clamped before stepping
    let current = current.clamp(INITIAL_INTERVAL_DAYS, MAX_INTERVAL_DAYS);
    let next = match performance {
        Performance::Easy => current + 3,
        Performance::Hard => current + 1,
        Performance::Wrong => INITIAL_INTERVAL_DAYS,
    };
    next.min(MAX_INTERVAL_DAYS)
}

/// Advance `state` by one review event observed at `now`.
pub fn apply_review(state: &ReviewState, performance: Performance, now: DateTime<Utc>) -> ReviewState {
    let interval_days = next_interval(state.interval_days, performance);
    let next_review = now
        .checked_add_signed(Duration::days(i64::from(interval_days)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    ReviewState {
        interval_days,
        next_review,
    }
}
