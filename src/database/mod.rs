//! PostgreSQL Store Adapter
//!
//! One repository per table, all reached through `DatabasePool`. Every call
//! races the configured interactive deadline so a slow store surfaces as a
//! transient error instead of hanging a command handler.

pub mod blacklist;
pub mod pool;
pub mod settings;
pub mod vouches;

pub use blacklist::BlacklistRepository;
pub use pool::DatabasePool;
pub use settings::SettingsRepository;
pub use vouches::VouchRepository;

use std::future::Future;
use std::time::Duration;

use crate::error::StoreError;

/// Bound a store future by the interactive deadline, classifying driver
/// errors on the way out.
pub(crate) async fn bounded<T, F>(deadline: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result.map_err(StoreError::classify),
        Err(_) => Err(StoreError::Timeout),
    }
}
