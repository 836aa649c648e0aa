//! HTTP API for the vouch ledger
//!
//! The thin inbound adapter: the gateway authenticates platform identities,
//! resolves their capability set, and forwards statically validated command
//! payloads here. Handlers validate the payload, resolve access, call the
//! core, and map outcome kinds to HTTP statuses.
//!
//! Routes:
//! - `/communities/{community_id}/vouches/...` - ledger writes and listings
//! - `/communities/{community_id}/...`         - stats, profile, leaderboards
//! - `/communities/{community_id}/admin/...`   - settings, blacklist, export
//! - `/users/{user_id}/stats`                  - cross-community counts
//! - `/status`                                 - uptime

pub mod admin;
pub mod stats;
pub mod vouches;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};

use crate::database::DatabasePool;
use crate::directory::IdentityDirectory;
use crate::error::{LedgerError, StoreError};
use crate::ledger::VouchLedger;

/// Shared state for all routers.
#[derive(Clone)]
pub struct ApiState {
    pub ledger: Arc<VouchLedger>,
    pub db: Arc<DatabasePool>,
    pub directory: Arc<dyn IdentityDirectory>,
    /// Immutable process-start timestamp, captured once at initialization.
    pub started_at: DateTime<Utc>,
}

/// Compose the full API router.
pub fn create_api_router(state: ApiState) -> Router {
    let community = Router::new()
        .merge(stats::router())
        .nest("/vouches", vouches::router())
        .nest("/admin", admin::router());

    Router::new()
        .nest("/communities/{community_id}", community)
        .route("/users/{user_id}/stats", get(stats::global_stats))
        .route("/status", get(stats::service_status))
        .with_state(state)
}

/// Rejection tuple for a ledger outcome.
pub(crate) fn reject(err: LedgerError) -> (StatusCode, String) {
    err.reject()
}

/// Rejection tuple for a direct store fault.
pub(crate) fn store_reject(err: StoreError) -> (StatusCode, String) {
    LedgerError::from(err).reject()
}
