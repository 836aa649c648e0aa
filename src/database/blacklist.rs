//! Blacklist Repository
//!
//! The (community, user) pair is UNIQUE at the store, so a duplicate add
//! fails atomically with a classified unique-violation rather than racing
//! a pre-check into two rows.

use std::time::Duration;

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;

use crate::database::bounded;
use crate::error::StoreError;
use crate::ledger::record::BlacklistEntry;

pub struct BlacklistRepository {
    pool: PgPool,
    deadline: Duration,
}

impl BlacklistRepository {
    pub fn new(pool: PgPool, deadline: Duration) -> Self {
        Self { pool, deadline }
    }

    pub async fn insert(
        &self,
        community_id: &str,
        user_id: &str,
        reason: &str,
        added_by: &str,
    ) -> Result<BlacklistEntry, StoreError> {
        let row = bounded(
            self.deadline,
            sqlx::query(
                r#"
                INSERT INTO blacklist (community_id, user_id, reason, added_by)
                VALUES ($1, $2, $3, $4)
                RETURNING added_at
                "#,
            )
            .bind(community_id)
            .bind(user_id)
            .bind(reason)
            .bind(added_by)
            .fetch_one(&self.pool),
        )
        .await?;

        debug!(community_id = %community_id, user_id = %user_id, "blacklist entry added");
        Ok(BlacklistEntry {
            community_id: community_id.to_string(),
            user_id: user_id.to_string(),
            reason: reason.to_string(),
            added_by: added_by.to_string(),
            added_at: row.get("added_at"),
        })
    }

    /// Delete the entry. Returns the number of rows removed (zero when the
    /// user was not blacklisted).
    pub async fn remove(&self, community_id: &str, user_id: &str) -> Result<u64, StoreError> {
        let result = bounded(
            self.deadline,
            sqlx::query("DELETE FROM blacklist WHERE community_id = $1 AND user_id = $2")
                .bind(community_id)
                .bind(user_id)
                .execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn contains(&self, community_id: &str, user_id: &str) -> Result<bool, StoreError> {
        let row = bounded(
            self.deadline,
            sqlx::query("SELECT 1 AS present FROM blacklist WHERE community_id = $1 AND user_id = $2")
                .bind(community_id)
                .bind(user_id)
                .fetch_optional(&self.pool),
        )
        .await?;
        Ok(row.is_some())
    }

    pub async fn list(&self, community_id: &str) -> Result<Vec<BlacklistEntry>, StoreError> {
        let rows = bounded(
            self.deadline,
            sqlx::query(
                r#"
                SELECT community_id, user_id, reason, added_by, added_at
                FROM blacklist
                WHERE community_id = $1
                ORDER BY added_at DESC
                "#,
            )
            .bind(community_id)
            .fetch_all(&self.pool),
        )
        .await?;
        Ok(rows.iter().map(row_to_entry).collect())
    }
}

fn row_to_entry(row: &PgRow) -> BlacklistEntry {
    BlacklistEntry {
        community_id: row.get("community_id"),
        user_id: row.get("user_id"),
        reason: row.get("reason"),
        added_by: row.get("added_by"),
        added_at: row.get("added_at"),
    }
}
