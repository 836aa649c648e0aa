//! Decayed Reputation and Badge Tiers
//!
//! Each live received vouch contributes `0.5 ^ (age_days / half_life_days)`
//! to the reputation score. A fresh vouch is worth 1.0, one exactly a
//! half-life old is worth 0.5, and contributions fade toward zero with age.
//! A non-positive half-life disables decay entirely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::record::VouchRecord;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Record age in days, clamped at zero so clock skew (a timestamp slightly
/// in the future) never produces a weight above 1.
pub fn age_in_days(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = (now - created_at).num_milliseconds() as f64;
    (millis / MILLIS_PER_DAY).max(0.0)
}

/// Decay weight for one record: in (0, 1] for a positive half-life,
/// exactly 1 when decay is disabled.
pub fn decay_weight(age_days: f64, half_life_days: f64) -> f64 {
    if half_life_days <= 0.0 {
        return 1.0;
    }
    0.5_f64.powf(age_days.max(0.0) / half_life_days)
}

/// Time-decayed reputation: sum of decay weights over the live vouches
/// `user_id` has received in the snapshot.
pub fn reputation(
    snapshot: &[VouchRecord],
    user_id: &str,
    now: DateTime<Utc>,
    half_life_days: f64,
) -> f64 {
    snapshot
        .iter()
        .filter(|r| !r.removed && r.target_id == user_id)
        .map(|r| decay_weight(age_in_days(r.created_at, now), half_life_days))
        .sum()
}

/// Badge tier, a step function of the received count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    None,
    Bronze,
    Gold,
    Centurion,
}

impl Badge {
    /// Thresholds evaluated top-down: 100+, 50+, 10+.
    pub fn for_received_count(received: usize) -> Self {
        if received >= 100 {
            Badge::Centurion
        } else if received >= 50 {
            Badge::Gold
        } else if received >= 10 {
            Badge::Bronze
        } else {
            Badge::None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Badge::None => "—",
            Badge::Bronze => "Bronze (10+)",
            Badge::Gold => "Gold (50+)",
            Badge::Centurion => "Centurion (100+)",
        }
    }
}
