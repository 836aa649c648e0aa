//! Database Connection Pool using sqlx

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::blacklist::BlacklistRepository;
use crate::database::settings::SettingsRepository;
use crate::database::vouches::VouchRepository;
use crate::error::StoreError;

pub struct DatabasePool {
    pool: sqlx::PgPool,
    vouches: VouchRepository,
    settings: SettingsRepository,
    blacklist: BlacklistRepository,
}

impl DatabasePool {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let deadline = Duration::from_secs(config.call_timeout_secs);
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(deadline)
            .connect(&config.url)
            .await
            .map_err(StoreError::classify)?;

        info!("Connected to PostgreSQL");

        let vouches = VouchRepository::new(pool.clone(), deadline);
        let settings = SettingsRepository::new(pool.clone(), deadline);
        let blacklist = BlacklistRepository::new(pool.clone(), deadline);

        Ok(Self {
            pool,
            vouches,
            settings,
            blacklist,
        })
    }

    /// Create tables and indexes if absent. Runs once at startup.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        info!("Initializing ledger schema...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS vouches (
                id BIGSERIAL PRIMARY KEY,
                voucher_id VARCHAR(64) NOT NULL,
                voucher_name VARCHAR(255) NOT NULL,
                target_id VARCHAR(64) NOT NULL,
                target_name VARCHAR(255) NOT NULL,
                reason VARCHAR(500) NOT NULL,
                community_id VARCHAR(64) NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                removed BOOLEAN NOT NULL DEFAULT FALSE
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::classify)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_vouches_target ON vouches(community_id, target_id, removed)",
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::classify)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_vouches_voucher ON vouches(community_id, voucher_id, removed)",
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::classify)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS community_settings (
                community_id VARCHAR(64) PRIMARY KEY,
                admin_role_id VARCHAR(64),
                trusted_role_id VARCHAR(64),
                log_channel_id VARCHAR(64),
                decay_half_life_days DOUBLE PRECISION NOT NULL DEFAULT 180
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::classify)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS blacklist (
                id BIGSERIAL PRIMARY KEY,
                community_id VARCHAR(64) NOT NULL,
                user_id VARCHAR(64) NOT NULL,
                reason VARCHAR(500) NOT NULL,
                added_by VARCHAR(64) NOT NULL,
                added_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                CONSTRAINT blacklist_community_user_key UNIQUE (community_id, user_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::classify)?;

        info!("Ledger schema initialized");
        Ok(())
    }

    pub fn vouches(&self) -> &VouchRepository {
        &self.vouches
    }

    pub fn settings(&self) -> &SettingsRepository {
        &self.settings
    }

    pub fn blacklist(&self) -> &BlacklistRepository {
        &self.blacklist
    }
}
