//! Reputation Aggregation Engine
//!
//! Pure functions over one snapshot of vouch records. Every view (counts,
//! decayed reputation, badge, leaderboard) is computed from exactly one
//! fetched slice so counts and scores for the same logical view can never
//! skew against each other.
//!
//! ```text
//! ┌──────────────┐     ┌───────────────┐     ┌──────────────┐
//! │ snapshot     │────►│ score (decay, │────►│ Badge        │
//! │ (live rows)  │     │  reputation)  │     │ (step tiers) │
//! └──────────────┘     └───────────────┘     └──────────────┘
//!        │
//!        ▼
//! ┌───────────────┐
//! │ leaderboard   │
//! │ (counts, rank)│
//! └───────────────┘
//! ```
//!
//! Records flagged `removed` are ignored by every function here, so a
//! snapshot that happens to include them (the export path fetches the full
//! history) can be reused safely.

mod leaderboard;
mod score;

pub use leaderboard::{
    given_count, received_count, top_given, top_received, LeaderboardRow, LEADERBOARD_LIMIT,
};
pub use score::{age_in_days, decay_weight, reputation, Badge};
