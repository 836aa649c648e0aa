//! Vouch Repository - PostgreSQL operations for vouch records
//!
//! Reads come back newest-first (creation time, then id as the secondary
//! key) and, except for the export scan, filter to live rows. Soft deletes
//! are conditional updates on `removed = FALSE`, so a concurrent removal
//! shows up as zero affected rows rather than an error.

use std::time::Duration;

use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, warn};

use crate::database::bounded;
use crate::error::StoreError;
use crate::ledger::record::VouchRecord;

/// Fields for a record about to be persisted; the store assigns `id` and
/// `created_at`.
#[derive(Debug, Clone)]
pub struct NewVouch {
    pub voucher_id: String,
    pub voucher_name: String,
    pub target_id: String,
    pub target_name: String,
    pub reason: String,
    pub community_id: String,
}

pub struct VouchRepository {
    pool: PgPool,
    deadline: Duration,
}

impl VouchRepository {
    pub fn new(pool: PgPool, deadline: Duration) -> Self {
        Self { pool, deadline }
    }

    pub async fn insert(&self, vouch: &NewVouch) -> Result<VouchRecord, StoreError> {
        let row = bounded(
            self.deadline,
            sqlx::query(
                r#"
                INSERT INTO vouches
                    (voucher_id, voucher_name, target_id, target_name, reason, community_id, removed)
                VALUES ($1, $2, $3, $4, $5, $6, FALSE)
                RETURNING id, created_at
                "#,
            )
            .bind(&vouch.voucher_id)
            .bind(&vouch.voucher_name)
            .bind(&vouch.target_id)
            .bind(&vouch.target_name)
            .bind(&vouch.reason)
            .bind(&vouch.community_id)
            .fetch_one(&self.pool),
        )
        .await?;

        let record = VouchRecord {
            id: row.get("id"),
            voucher_id: vouch.voucher_id.clone(),
            voucher_name: vouch.voucher_name.clone(),
            target_id: vouch.target_id.clone(),
            target_name: vouch.target_name.clone(),
            reason: vouch.reason.clone(),
            community_id: vouch.community_id.clone(),
            created_at: row.get("created_at"),
            removed: false,
        };
        debug!(vouch_id = record.id, "vouch inserted");
        Ok(record)
    }

    /// The live record with this id, if any.
    pub async fn get_live(&self, id: i64) -> Result<Option<VouchRecord>, StoreError> {
        let row = bounded(
            self.deadline,
            sqlx::query("SELECT * FROM vouches WHERE id = $1 AND removed = FALSE")
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await?;
        Ok(row.as_ref().map(row_to_record))
    }

    /// Mark one live record removed. Returns the number of rows matched:
    /// zero means the record was missing or already removed (possibly by a
    /// concurrent request), which callers treat as the not-found outcome.
    pub async fn soft_delete(&self, id: i64) -> Result<u64, StoreError> {
        let result = bounded(
            self.deadline,
            sqlx::query("UPDATE vouches SET removed = TRUE WHERE id = $1 AND removed = FALSE")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected())
    }

    /// Mark every live record for a target removed, as one bulk statement.
    pub async fn purge_target(&self, community_id: &str, target_id: &str) -> Result<u64, StoreError> {
        let result = bounded(
            self.deadline,
            sqlx::query(
                r#"
                UPDATE vouches SET removed = TRUE
                WHERE community_id = $1 AND target_id = $2 AND removed = FALSE
                "#,
            )
            .bind(community_id)
            .bind(target_id)
            .execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected())
    }

    /// Live records received by a target in one community, newest first.
    pub async fn live_for_target(
        &self,
        community_id: &str,
        target_id: &str,
    ) -> Result<Vec<VouchRecord>, StoreError> {
        let rows = bounded(
            self.deadline,
            sqlx::query(
                r#"
                SELECT * FROM vouches
                WHERE community_id = $1 AND target_id = $2 AND removed = FALSE
                ORDER BY created_at DESC, id DESC
                "#,
            )
            .bind(community_id)
            .bind(target_id)
            .fetch_all(&self.pool),
        )
        .await?;
        Ok(rows.iter().map(row_to_record).collect())
    }

    /// One snapshot of every live record a user appears in (either side)
    /// within a community, so counts and reputation for a profile view
    /// cannot skew against each other.
    pub async fn live_for_user(
        &self,
        community_id: &str,
        user_id: &str,
    ) -> Result<Vec<VouchRecord>, StoreError> {
        let rows = bounded(
            self.deadline,
            sqlx::query(
                r#"
                SELECT * FROM vouches
                WHERE community_id = $1 AND (voucher_id = $2 OR target_id = $2)
                  AND removed = FALSE
                ORDER BY created_at DESC, id DESC
                "#,
            )
            .bind(community_id)
            .bind(user_id)
            .fetch_all(&self.pool),
        )
        .await?;
        Ok(rows.iter().map(row_to_record).collect())
    }

    /// Cross-community snapshot for a user. No blacklist or privilege
    /// filtering applies to global aggregates; blacklists are
    /// community-scoped.
    pub async fn live_for_user_global(&self, user_id: &str) -> Result<Vec<VouchRecord>, StoreError> {
        let rows = bounded(
            self.deadline,
            sqlx::query(
                r#"
                SELECT * FROM vouches
                WHERE (voucher_id = $1 OR target_id = $1) AND removed = FALSE
                ORDER BY created_at DESC, id DESC
                "#,
            )
            .bind(user_id)
            .fetch_all(&self.pool),
        )
        .await?;
        Ok(rows.iter().map(row_to_record).collect())
    }

    /// All live records in a community, newest first. The leaderboard
    /// tie-break depends on this scan order.
    pub async fn live_in_community(&self, community_id: &str) -> Result<Vec<VouchRecord>, StoreError> {
        let rows = bounded(
            self.deadline,
            sqlx::query(
                r#"
                SELECT * FROM vouches
                WHERE community_id = $1 AND removed = FALSE
                ORDER BY created_at DESC, id DESC
                "#,
            )
            .bind(community_id)
            .fetch_all(&self.pool),
        )
        .await?;
        Ok(rows.iter().map(row_to_record).collect())
    }

    /// Full history for a target including removed rows. Export only.
    pub async fn all_for_target(
        &self,
        community_id: &str,
        target_id: &str,
    ) -> Result<Vec<VouchRecord>, StoreError> {
        let rows = bounded(
            self.deadline,
            sqlx::query(
                r#"
                SELECT * FROM vouches
                WHERE community_id = $1 AND target_id = $2
                ORDER BY created_at DESC, id DESC
                "#,
            )
            .bind(community_id)
            .bind(target_id)
            .fetch_all(&self.pool),
        )
        .await?;
        Ok(rows.iter().map(row_to_record).collect())
    }
}

fn row_to_record(row: &PgRow) -> VouchRecord {
    // A row with an undecodable timestamp degrades to "now" (weight 1 in
    // aggregation) instead of aborting the whole scan.
    let created_at = row.try_get("created_at").unwrap_or_else(|e| {
        warn!(error = %e, "vouch row has undecodable timestamp, treating as current");
        Utc::now()
    });
    VouchRecord {
        id: row.get("id"),
        voucher_id: row.get("voucher_id"),
        voucher_name: row.get("voucher_name"),
        target_id: row.get("target_id"),
        target_name: row.get("target_name"),
        reason: row.get("reason"),
        community_id: row.get("community_id"),
        created_at,
        removed: row.get("removed"),
    }
}
