//! Settings Repository - per-community configuration rows
//!
//! Settings are created lazily with defaults on first access and mutated
//! field-by-field through dedicated UPSERTs, never bulk-overwritten.

use std::time::Duration;

use sqlx::{PgPool, Row};
use tracing::debug;

use crate::database::bounded;
use crate::error::StoreError;
use crate::ledger::record::{CommunitySettings, DEFAULT_HALF_LIFE_DAYS};

pub struct SettingsRepository {
    pool: PgPool,
    deadline: Duration,
}

impl SettingsRepository {
    pub fn new(pool: PgPool, deadline: Duration) -> Self {
        Self { pool, deadline }
    }

    /// Fetch a community's settings, creating the row with defaults if it
    /// does not exist yet. A concurrent first access is harmless: both
    /// writers insert the same defaults and the conflict clause ignores
    /// the loser.
    pub async fn get_or_create(&self, community_id: &str) -> Result<CommunitySettings, StoreError> {
        let row = bounded(
            self.deadline,
            sqlx::query("SELECT * FROM community_settings WHERE community_id = $1")
                .bind(community_id)
                .fetch_optional(&self.pool),
        )
        .await?;

        if let Some(row) = row {
            return Ok(CommunitySettings {
                community_id: row.get("community_id"),
                admin_role_id: row.get("admin_role_id"),
                trusted_role_id: row.get("trusted_role_id"),
                log_channel_id: row.get("log_channel_id"),
                decay_half_life_days: row.get("decay_half_life_days"),
            });
        }

        bounded(
            self.deadline,
            sqlx::query(
                r#"
                INSERT INTO community_settings (community_id, decay_half_life_days)
                VALUES ($1, $2)
                ON CONFLICT (community_id) DO NOTHING
                "#,
            )
            .bind(community_id)
            .bind(DEFAULT_HALF_LIFE_DAYS)
            .execute(&self.pool),
        )
        .await?;

        debug!(community_id = %community_id, "community settings created with defaults");
        Ok(CommunitySettings::new(community_id.to_string()))
    }

    pub async fn set_admin_role(
        &self,
        community_id: &str,
        role_id: Option<&str>,
    ) -> Result<(), StoreError> {
        self.upsert_text_field(community_id, "admin_role_id", role_id).await
    }

    pub async fn set_trusted_role(
        &self,
        community_id: &str,
        role_id: Option<&str>,
    ) -> Result<(), StoreError> {
        self.upsert_text_field(community_id, "trusted_role_id", role_id).await
    }

    pub async fn set_log_channel(
        &self,
        community_id: &str,
        channel_id: Option<&str>,
    ) -> Result<(), StoreError> {
        self.upsert_text_field(community_id, "log_channel_id", channel_id).await
    }

    pub async fn set_decay_half_life(
        &self,
        community_id: &str,
        days: f64,
    ) -> Result<(), StoreError> {
        bounded(
            self.deadline,
            sqlx::query(
                r#"
                INSERT INTO community_settings (community_id, decay_half_life_days)
                VALUES ($1, $2)
                ON CONFLICT (community_id) DO UPDATE SET
                    decay_half_life_days = EXCLUDED.decay_half_life_days
                "#,
            )
            .bind(community_id)
            .bind(days)
            .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    // Column name comes from the fixed setter set above, never from input.
    async fn upsert_text_field(
        &self,
        community_id: &str,
        column: &str,
        value: Option<&str>,
    ) -> Result<(), StoreError> {
        let sql = format!(
            r#"
            INSERT INTO community_settings (community_id, {column})
            VALUES ($1, $2)
            ON CONFLICT (community_id) DO UPDATE SET
                {column} = EXCLUDED.{column}
            "#
        );
        bounded(
            self.deadline,
            sqlx::query(&sql)
                .bind(community_id)
                .bind(value)
                .execute(&self.pool),
        )
        .await?;
        debug!(community_id = %community_id, field = column, "community setting updated");
        Ok(())
    }
}
