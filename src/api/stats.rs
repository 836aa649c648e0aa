//! Read-side endpoints: per-user stats, profiles, leaderboards, global
//! counts, and service status.
//!
//! Each view is computed from exactly one snapshot fetch, so its count and
//! reputation figures can never disagree about which records exist.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::{store_reject, ApiState};
use crate::directory::IdentityProfile;
use crate::reputation::{
    given_count, received_count, reputation, top_given, top_received, Badge, LeaderboardRow,
};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/stats/{user_id}", get(user_stats))
        .route("/profile/{user_id}", get(user_profile))
        .route("/leaderboard", get(leaderboard_received))
        .route("/top-vouchers", get(leaderboard_given))
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub user_id: String,
    pub given: usize,
    pub received: usize,
}

#[derive(Debug, Serialize)]
pub struct RecentVouch {
    pub voucher_name: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: String,
    pub display_name: String,
    pub given: usize,
    pub received: usize,
    /// Time-decayed reputation over received vouches.
    pub reputation: f64,
    pub badge: Badge,
    pub badge_label: &'static str,
    pub recent: Vec<RecentVouch>,
    pub blacklisted: bool,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub rows: Vec<LeaderboardRow>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub started_at: DateTime<Utc>,
    pub uptime_secs: i64,
    pub uptime: String,
}

/// GET /communities/{community_id}/stats/{user_id}
async fn user_stats(
    State(state): State<ApiState>,
    Path((community_id, user_id)): Path<(String, String)>,
) -> Result<Json<StatsResponse>, (StatusCode, String)> {
    let snapshot = state
        .db
        .vouches()
        .live_for_user(&community_id, &user_id)
        .await
        .map_err(store_reject)?;

    Ok(Json(StatsResponse {
        given: given_count(&snapshot, &user_id),
        received: received_count(&snapshot, &user_id),
        user_id,
    }))
}

/// GET /communities/{community_id}/profile/{user_id}
async fn user_profile(
    State(state): State<ApiState>,
    Path((community_id, user_id)): Path<(String, String)>,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    let settings = state
        .db
        .settings()
        .get_or_create(&community_id)
        .await
        .map_err(store_reject)?;
    let snapshot = state
        .db
        .vouches()
        .live_for_user(&community_id, &user_id)
        .await
        .map_err(store_reject)?;
    let blacklisted = state
        .db
        .blacklist()
        .contains(&community_id, &user_id)
        .await
        .map_err(store_reject)?;

    let received = received_count(&snapshot, &user_id);
    let badge = Badge::for_received_count(received);
    let score = reputation(&snapshot, &user_id, Utc::now(), settings.decay_half_life_days);

    // Snapshot is newest-first, so the first five received entries are the
    // most recent.
    let recent: Vec<RecentVouch> = snapshot
        .iter()
        .filter(|r| r.target_id == user_id)
        .take(5)
        .map(|r| RecentVouch {
            voucher_name: r.voucher_name.clone(),
            reason: r.reason.clone(),
            created_at: r.created_at,
        })
        .collect();

    let display_name = match state.directory.resolve(&user_id).await {
        Some(profile) => profile.display_name,
        None => snapshot
            .iter()
            .find_map(|r| {
                if r.target_id == user_id {
                    Some(r.target_name.clone())
                } else if r.voucher_id == user_id {
                    Some(r.voucher_name.clone())
                } else {
                    None
                }
            })
            .unwrap_or_else(|| IdentityProfile::placeholder(&user_id).display_name),
    };

    Ok(Json(ProfileResponse {
        display_name,
        given: given_count(&snapshot, &user_id),
        received,
        reputation: score,
        badge,
        badge_label: badge.label(),
        recent,
        blacklisted,
        user_id,
    }))
}

/// GET /communities/{community_id}/leaderboard
async fn leaderboard_received(
    State(state): State<ApiState>,
    Path(community_id): Path<String>,
) -> Result<Json<LeaderboardResponse>, (StatusCode, String)> {
    let snapshot = state
        .db
        .vouches()
        .live_in_community(&community_id)
        .await
        .map_err(store_reject)?;
    Ok(Json(LeaderboardResponse {
        rows: top_received(&snapshot),
    }))
}

/// GET /communities/{community_id}/top-vouchers
async fn leaderboard_given(
    State(state): State<ApiState>,
    Path(community_id): Path<String>,
) -> Result<Json<LeaderboardResponse>, (StatusCode, String)> {
    let snapshot = state
        .db
        .vouches()
        .live_in_community(&community_id)
        .await
        .map_err(store_reject)?;
    Ok(Json(LeaderboardResponse {
        rows: top_given(&snapshot),
    }))
}

/// GET /users/{user_id}/stats - cross-community counts. Blacklists are
/// community-scoped and do not filter global aggregates.
pub async fn global_stats(
    State(state): State<ApiState>,
    Path(user_id): Path<String>,
) -> Result<Json<StatsResponse>, (StatusCode, String)> {
    let snapshot = state
        .db
        .vouches()
        .live_for_user_global(&user_id)
        .await
        .map_err(store_reject)?;

    Ok(Json(StatsResponse {
        given: given_count(&snapshot, &user_id),
        received: received_count(&snapshot, &user_id),
        user_id,
    }))
}

/// GET /status
pub async fn service_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0);
    Json(StatusResponse {
        started_at: state.started_at,
        uptime_secs,
        uptime: format_duration(uptime_secs),
    })
}

fn format_duration(total_secs: i64) -> String {
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;
    format!("{days}d {hours}h {minutes}m {seconds}s")
}
