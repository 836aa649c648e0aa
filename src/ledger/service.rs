//! Vouch Ledger - the authoritative write path
//!
//! Every mutation funnels through here: create, soft-delete, purge, the
//! settings setters, and blacklist management. The store is the only
//! synchronization point; read-then-write sequences tolerate races by
//! making the final update conditional and treating "no rows matched" as
//! the not-found outcome. Audit notifications are spawned fire-and-forget
//! and can never fail the operation that produced them.

use std::sync::Arc;

use tracing::info;

use crate::audit::{AuditEvent, AuditSink};
use crate::database::vouches::NewVouch;
use crate::database::DatabasePool;
use crate::error::{LedgerError, StoreError};
use crate::ledger::access::{
    ensure_elevated, ensure_platform_admin, is_eligible_voucher, resolve_privilege, GatedCommand,
};
use crate::ledger::record::{
    ActorContext, BlacklistEntry, CommunitySettings, TargetRef, VouchRecord,
};

pub struct VouchLedger {
    db: Arc<DatabasePool>,
    audit: Arc<dyn AuditSink>,
}

/// The store-independent create checks, in rejection order: self-vouch,
/// automated target, voucher eligibility. First failure wins. Blacklist
/// checks follow these and precede the insert.
pub fn validate_create(
    voucher: &ActorContext,
    target: &TargetRef,
    settings: &CommunitySettings,
) -> Result<(), LedgerError> {
    if voucher.id == target.id {
        return Err(LedgerError::Validation(
            "you cannot vouch for yourself".to_string(),
        ));
    }
    if target.automated {
        return Err(LedgerError::Validation(
            "automated identities cannot receive vouches".to_string(),
        ));
    }
    if !is_eligible_voucher(voucher, settings) {
        return Err(LedgerError::Forbidden(
            "only members with the configured trusted role can give vouches".to_string(),
        ));
    }
    Ok(())
}

impl VouchLedger {
    pub fn new(db: Arc<DatabasePool>, audit: Arc<dyn AuditSink>) -> Self {
        Self { db, audit }
    }

    /// Record a vouch. No partial effects: every check happens before the
    /// insert, and the audit notification cannot fail the create.
    pub async fn create(
        &self,
        community_id: &str,
        voucher: &ActorContext,
        target: &TargetRef,
        reason: &str,
    ) -> Result<VouchRecord, LedgerError> {
        let settings = self.db.settings().get_or_create(community_id).await?;
        validate_create(voucher, target, &settings)?;

        if self.db.blacklist().contains(community_id, &voucher.id).await? {
            return Err(LedgerError::Validation(
                "you are blacklisted from giving vouches in this community".to_string(),
            ));
        }
        if self.db.blacklist().contains(community_id, &target.id).await? {
            return Err(LedgerError::Validation(
                "the target is blacklisted and cannot receive vouches".to_string(),
            ));
        }

        let record = self
            .db
            .vouches()
            .insert(&NewVouch {
                voucher_id: voucher.id.clone(),
                voucher_name: voucher.display_name.clone(),
                target_id: target.id.clone(),
                target_name: target.display_name.clone(),
                reason: reason.to_string(),
                community_id: community_id.to_string(),
            })
            .await?;

        info!(
            vouch_id = record.id,
            voucher = %voucher.id,
            target = %target.id,
            community = %community_id,
            "vouch recorded"
        );
        self.notify(
            &settings,
            AuditEvent::VouchCreated {
                id: record.id,
                voucher: voucher.display_name.clone(),
                target: target.display_name.clone(),
                reason: reason.to_string(),
            },
        );
        Ok(record)
    }

    /// Soft-delete one record. The requester must be the original voucher
    /// or elevated in the record's community. Whether the record never
    /// existed or was already removed is not distinguishable from the
    /// outside.
    pub async fn soft_delete(
        &self,
        id: i64,
        requester: &ActorContext,
    ) -> Result<VouchRecord, LedgerError> {
        let record = self
            .db
            .vouches()
            .get_live(id)
            .await?
            .ok_or(LedgerError::NotFoundOrAlreadyRemoved)?;

        let settings = self.db.settings().get_or_create(&record.community_id).await?;
        if record.voucher_id != requester.id && !resolve_privilege(requester, &settings).elevated {
            return Err(LedgerError::Forbidden(
                "only the original voucher or an elevated member can remove this vouch".to_string(),
            ));
        }

        // Conditional on removed = FALSE; a concurrent removal between the
        // read and this update lands here as zero affected rows.
        let affected = self.db.vouches().soft_delete(id).await?;
        if affected == 0 {
            return Err(LedgerError::NotFoundOrAlreadyRemoved);
        }

        info!(vouch_id = id, requester = %requester.id, "vouch removed");
        self.notify(
            &settings,
            AuditEvent::VouchRemoved {
                id,
                requester: requester.display_name.clone(),
            },
        );
        Ok(record)
    }

    /// Soft-delete every live record for a target in one community, as a
    /// single bulk statement. Returns the affected count so a caller can
    /// report exactly what happened.
    pub async fn purge(
        &self,
        community_id: &str,
        target_id: &str,
        requester: &ActorContext,
    ) -> Result<u64, LedgerError> {
        let settings = self.db.settings().get_or_create(community_id).await?;
        ensure_elevated(requester, &settings, GatedCommand::Purge)?;

        let affected = self.db.vouches().purge_target(community_id, target_id).await?;
        info!(
            target = %target_id,
            community = %community_id,
            affected,
            "purge complete"
        );
        self.notify(
            &settings,
            AuditEvent::TargetPurged {
                target: target_id.to_string(),
                requester: requester.display_name.clone(),
                affected,
            },
        );
        Ok(affected)
    }

    /// Set the community admin role. Requires the platform-native
    /// capability specifically; role-derived elevation is not enough.
    pub async fn set_admin_role(
        &self,
        community_id: &str,
        actor: &ActorContext,
        role_id: Option<String>,
    ) -> Result<(), LedgerError> {
        ensure_platform_admin(actor)?;
        self.db
            .settings()
            .set_admin_role(community_id, role_id.as_deref())
            .await?;
        Ok(())
    }

    pub async fn set_trusted_role(
        &self,
        community_id: &str,
        actor: &ActorContext,
        role_id: Option<String>,
    ) -> Result<(), LedgerError> {
        let settings = self.db.settings().get_or_create(community_id).await?;
        ensure_elevated(actor, &settings, GatedCommand::SetTrustedRole)?;
        self.db
            .settings()
            .set_trusted_role(community_id, role_id.as_deref())
            .await?;
        Ok(())
    }

    pub async fn set_log_channel(
        &self,
        community_id: &str,
        actor: &ActorContext,
        channel_id: Option<String>,
    ) -> Result<(), LedgerError> {
        let settings = self.db.settings().get_or_create(community_id).await?;
        ensure_elevated(actor, &settings, GatedCommand::SetLogChannel)?;
        self.db
            .settings()
            .set_log_channel(community_id, channel_id.as_deref())
            .await?;
        Ok(())
    }

    pub async fn set_decay_half_life(
        &self,
        community_id: &str,
        actor: &ActorContext,
        days: f64,
    ) -> Result<(), LedgerError> {
        let settings = self.db.settings().get_or_create(community_id).await?;
        ensure_elevated(actor, &settings, GatedCommand::SetDecayHalfLife)?;
        if !days.is_finite() || days <= 0.0 {
            return Err(LedgerError::Validation(
                "decay half-life must be a positive number of days".to_string(),
            ));
        }
        self.db.settings().set_decay_half_life(community_id, days).await?;
        Ok(())
    }

    pub async fn blacklist_add(
        &self,
        community_id: &str,
        actor: &ActorContext,
        user_id: &str,
        reason: &str,
    ) -> Result<BlacklistEntry, LedgerError> {
        let settings = self.db.settings().get_or_create(community_id).await?;
        ensure_elevated(actor, &settings, GatedCommand::BlacklistAdd)?;

        match self
            .db
            .blacklist()
            .insert(community_id, user_id, reason, &actor.id)
            .await
        {
            Ok(entry) => {
                info!(user = %user_id, community = %community_id, "user blacklisted");
                self.notify(
                    &settings,
                    AuditEvent::BlacklistAdded {
                        user: user_id.to_string(),
                        reason: reason.to_string(),
                        added_by: actor.display_name.clone(),
                    },
                );
                Ok(entry)
            }
            Err(StoreError::UniqueViolation) => Err(LedgerError::Conflict(
                "user is already blacklisted in this community".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns whether an entry was actually removed.
    pub async fn blacklist_remove(
        &self,
        community_id: &str,
        actor: &ActorContext,
        user_id: &str,
    ) -> Result<bool, LedgerError> {
        let settings = self.db.settings().get_or_create(community_id).await?;
        ensure_elevated(actor, &settings, GatedCommand::BlacklistRemove)?;

        let removed = self.db.blacklist().remove(community_id, user_id).await? > 0;
        if removed {
            info!(user = %user_id, community = %community_id, "user removed from blacklist");
            self.notify(
                &settings,
                AuditEvent::BlacklistRemoved {
                    user: user_id.to_string(),
                    removed_by: actor.display_name.clone(),
                },
            );
        }
        Ok(removed)
    }

    pub async fn blacklist_list(
        &self,
        community_id: &str,
        actor: &ActorContext,
    ) -> Result<Vec<BlacklistEntry>, LedgerError> {
        let settings = self.db.settings().get_or_create(community_id).await?;
        ensure_elevated(actor, &settings, GatedCommand::BlacklistList)?;
        Ok(self.db.blacklist().list(community_id).await?)
    }

    /// Fire-and-forget audit delivery. No configured log channel means no
    /// notification; a sink failure stays inside the spawned task.
    fn notify(&self, settings: &CommunitySettings, event: AuditEvent) {
        let Some(channel_id) = settings.log_channel_id.clone() else {
            return;
        };
        let sink = Arc::clone(&self.audit);
        let community_id = settings.community_id.clone();
        tokio::spawn(async move {
            sink.notify(&community_id, &channel_id, event).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(id: &str, roles: &[&str]) -> ActorContext {
        ActorContext {
            id: id.to_string(),
            display_name: id.to_string(),
            platform_admin: false,
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn target(id: &str, automated: bool) -> TargetRef {
        TargetRef {
            id: id.to_string(),
            display_name: id.to_string(),
            automated,
        }
    }

    #[test]
    fn test_self_vouch_rejected_first() {
        // Self-vouch outranks every later failure, even an automated flag.
        let settings = CommunitySettings::new("g1".to_string());
        let err = validate_create(&actor("u1", &[]), &target("u1", true), &settings).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert!(err.to_string().contains("yourself"));
    }

    #[test]
    fn test_automated_target_rejected() {
        let settings = CommunitySettings::new("g1".to_string());
        let err = validate_create(&actor("u1", &[]), &target("bot", true), &settings).unwrap_err();
        assert!(err.to_string().contains("automated"));
    }

    #[test]
    fn test_trusted_role_gates_eligibility() {
        let settings = CommunitySettings {
            trusted_role_id: Some("trusted".to_string()),
            ..CommunitySettings::new("g1".to_string())
        };
        let err = validate_create(&actor("u1", &[]), &target("u2", false), &settings).unwrap_err();
        assert!(matches!(err, LedgerError::Forbidden(_)));
        assert!(validate_create(&actor("u1", &["trusted"]), &target("u2", false), &settings).is_ok());
    }

    #[test]
    fn test_open_community_accepts_any_voucher() {
        let settings = CommunitySettings::new("g1".to_string());
        assert!(validate_create(&actor("u1", &[]), &target("u2", false), &settings).is_ok());
    }
}
