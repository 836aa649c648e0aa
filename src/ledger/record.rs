//! Ledger Data Model
//!
//! Vouch records, per-community settings, blacklist entries, and the
//! statically validated actor/target structures the inbound gateway hands
//! to the access boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum accepted length of a vouch reason, in characters.
pub const MAX_REASON_LEN: usize = 500;

/// Default reputation decay half-life, in days.
pub const DEFAULT_HALF_LIFE_DAYS: f64 = 180.0;

/// One attestation a voucher recorded about a target within a community.
///
/// `id` is assigned by the store, monotonically increasing, and never
/// reused. Display names are snapshots captured at creation and never
/// follow later renames. Removal is a one-way soft delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VouchRecord {
    pub id: i64,
    pub voucher_id: String,
    pub voucher_name: String,
    pub target_id: String,
    pub target_name: String,
    pub reason: String,
    pub community_id: String,
    pub created_at: DateTime<Utc>,
    pub removed: bool,
}

/// Per-community configuration, created lazily on first access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunitySettings {
    pub community_id: String,

    /// Role granting elevated privilege in addition to the platform-native
    /// administrator capability.
    pub admin_role_id: Option<String>,

    /// If set, only members holding this role (or elevated members) may
    /// create vouches. Unset means any non-blacklisted member may vouch.
    pub trusted_role_id: Option<String>,

    /// Destination for audit notifications. Absence silently suppresses
    /// logging, it is not an error.
    pub log_channel_id: Option<String>,

    /// Reputation decay half-life in days. Non-positive disables decay.
    pub decay_half_life_days: f64,
}

impl CommunitySettings {
    pub fn new(community_id: String) -> Self {
        Self {
            community_id,
            admin_role_id: None,
            trusted_role_id: None,
            log_channel_id: None,
            decay_half_life_days: DEFAULT_HALF_LIFE_DAYS,
        }
    }
}

/// A user barred from being a voucher or a target within one community.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub community_id: String,
    pub user_id: String,
    pub reason: String,
    pub added_by: String,
    pub added_at: DateTime<Utc>,
}

/// Acting identity as resolved by the gateway at the access boundary.
///
/// The capability set (platform-admin flag plus role memberships) arrives
/// with the command, so privilege resolution stays a pure function with no
/// live directory dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorContext {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub platform_admin: bool,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl ActorContext {
    pub fn holds_role(&self, role_id: &str) -> bool {
        self.roles.iter().any(|r| r == role_id)
    }
}

/// The identity a vouch is being recorded about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetRef {
    pub id: String,
    pub display_name: String,
    /// Non-human/automated identities cannot receive vouches.
    #[serde(default)]
    pub automated: bool,
}

/// Validate a vouch reason at the access boundary: required, non-empty,
/// bounded length (counted in characters, matching the column width).
pub fn validate_reason(reason: &str) -> Result<(), crate::error::LedgerError> {
    if reason.trim().is_empty() {
        return Err(crate::error::LedgerError::Validation(
            "a reason is required".to_string(),
        ));
    }
    if reason.chars().count() > MAX_REASON_LEN {
        return Err(crate::error::LedgerError::Validation(format!(
            "reason exceeds the {MAX_REASON_LEN} character limit"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let s = CommunitySettings::new("g1".to_string());
        assert_eq!(s.decay_half_life_days, DEFAULT_HALF_LIFE_DAYS);
        assert!(s.admin_role_id.is_none());
        assert!(s.trusted_role_id.is_none());
        assert!(s.log_channel_id.is_none());
    }

    #[test]
    fn test_reason_bounds() {
        assert!(validate_reason("solid trade, fast payment").is_ok());
        assert!(validate_reason("").is_err());
        assert!(validate_reason("   ").is_err());
        assert!(validate_reason(&"x".repeat(MAX_REASON_LEN)).is_ok());
        assert!(validate_reason(&"x".repeat(MAX_REASON_LEN + 1)).is_err());
    }

    #[test]
    fn test_holds_role() {
        let actor = ActorContext {
            id: "u1".to_string(),
            display_name: "alice".to_string(),
            platform_admin: false,
            roles: vec!["r1".to_string(), "r2".to_string()],
        };
        assert!(actor.holds_role("r2"));
        assert!(!actor.holds_role("r9"));
    }
}
