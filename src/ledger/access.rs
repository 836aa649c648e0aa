//! Access Control Resolver
//!
//! Pure capability logic over the actor context the gateway supplies.
//! Elevated privilege comes from the platform-native administrator
//! capability or the community's configured admin role; vouch eligibility
//! from the optional trusted role. Blacklist lookups live with the ledger
//! service since they go through the store.

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::ledger::record::{ActorContext, CommunitySettings};

/// Commands that must reject before any side effect unless the actor holds
/// elevated privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatedCommand {
    RemoveVouch,
    Purge,
    SetAdminRole,
    SetTrustedRole,
    SetLogChannel,
    SetDecayHalfLife,
    BlacklistAdd,
    BlacklistRemove,
    BlacklistList,
    Export,
}

impl GatedCommand {
    pub fn name(&self) -> &'static str {
        match self {
            GatedCommand::RemoveVouch => "remove-vouch",
            GatedCommand::Purge => "purge",
            GatedCommand::SetAdminRole => "set-admin-role",
            GatedCommand::SetTrustedRole => "set-trusted-role",
            GatedCommand::SetLogChannel => "set-log-channel",
            GatedCommand::SetDecayHalfLife => "set-decay-half-life",
            GatedCommand::BlacklistAdd => "blacklist-add",
            GatedCommand::BlacklistRemove => "blacklist-remove",
            GatedCommand::BlacklistList => "blacklist-list",
            GatedCommand::Export => "export",
        }
    }
}

/// Resolved privilege for one actor within one community.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Privilege {
    pub elevated: bool,
}

/// Elevated privilege holds for the platform-native administrator
/// capability, or membership in the configured admin role. With no admin
/// role configured, only the native capability elevates.
pub fn resolve_privilege(actor: &ActorContext, settings: &CommunitySettings) -> Privilege {
    if actor.platform_admin {
        return Privilege { elevated: true };
    }
    let elevated = settings
        .admin_role_id
        .as_deref()
        .map(|role| actor.holds_role(role))
        .unwrap_or(false);
    Privilege { elevated }
}

/// Whether the actor may create vouches in this community. Independent of
/// blacklist status, which the ledger checks separately.
pub fn is_eligible_voucher(actor: &ActorContext, settings: &CommunitySettings) -> bool {
    match settings.trusted_role_id.as_deref() {
        Some(role) => actor.holds_role(role) || resolve_privilege(actor, settings).elevated,
        None => true,
    }
}

/// Gate an admin-only command, with the distinct rejection message the
/// caller sees before any side effect happens.
pub fn ensure_elevated(
    actor: &ActorContext,
    settings: &CommunitySettings,
    command: GatedCommand,
) -> Result<(), LedgerError> {
    if resolve_privilege(actor, settings).elevated {
        Ok(())
    } else {
        Err(LedgerError::Forbidden(format!(
            "the {} command is available only to the configured admin role or platform administrators",
            command.name()
        )))
    }
}

/// Changing the admin role itself requires the platform-native capability
/// specifically. Elevation through the configured admin role is not enough,
/// otherwise a role-elevated member could widen their own grant.
pub fn ensure_platform_admin(actor: &ActorContext) -> Result<(), LedgerError> {
    if actor.platform_admin {
        Ok(())
    } else {
        Err(LedgerError::Forbidden(
            "only platform administrators can change the admin role".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(platform_admin: bool, roles: &[&str]) -> ActorContext {
        ActorContext {
            id: "u1".to_string(),
            display_name: "alice".to_string(),
            platform_admin,
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn settings(admin_role: Option<&str>, trusted_role: Option<&str>) -> CommunitySettings {
        CommunitySettings {
            admin_role_id: admin_role.map(String::from),
            trusted_role_id: trusted_role.map(String::from),
            ..CommunitySettings::new("g1".to_string())
        }
    }

    #[test]
    fn test_platform_admin_is_always_elevated() {
        let s = settings(None, None);
        assert!(resolve_privilege(&actor(true, &[]), &s).elevated);
    }

    #[test]
    fn test_admin_role_elevates_when_configured() {
        let s = settings(Some("mods"), None);
        assert!(resolve_privilege(&actor(false, &["mods"]), &s).elevated);
        assert!(!resolve_privilege(&actor(false, &["other"]), &s).elevated);
    }

    #[test]
    fn test_no_admin_role_means_native_only() {
        let s = settings(None, None);
        assert!(!resolve_privilege(&actor(false, &["mods"]), &s).elevated);
    }

    #[test]
    fn test_eligibility_without_trusted_role() {
        let s = settings(None, None);
        assert!(is_eligible_voucher(&actor(false, &[]), &s));
    }

    #[test]
    fn test_eligibility_with_trusted_role() {
        let s = settings(Some("mods"), Some("trusted"));
        assert!(is_eligible_voucher(&actor(false, &["trusted"]), &s));
        assert!(is_eligible_voucher(&actor(false, &["mods"]), &s)); // elevated
        assert!(is_eligible_voucher(&actor(true, &[]), &s));
        assert!(!is_eligible_voucher(&actor(false, &[]), &s));
    }

    #[test]
    fn test_gate_rejects_before_side_effects() {
        let s = settings(Some("mods"), None);
        let err = ensure_elevated(&actor(false, &[]), &s, GatedCommand::Purge).unwrap_err();
        assert!(matches!(err, LedgerError::Forbidden(_)));
        assert!(err.to_string().contains("purge"));
        assert!(ensure_elevated(&actor(false, &["mods"]), &s, GatedCommand::Purge).is_ok());
    }

    #[test]
    fn test_admin_role_change_needs_native_capability() {
        let s = settings(Some("mods"), None);
        let role_admin = actor(false, &["mods"]);
        assert!(resolve_privilege(&role_admin, &s).elevated);
        assert!(ensure_platform_admin(&role_admin).is_err());
        assert!(ensure_platform_admin(&actor(true, &[])).is_ok());
    }
}
