//! Admin endpoints: community settings, blacklist management, and the
//! full-audit CSV export. Every operation here belongs to the admin-gated
//! command set and rejects before any side effect.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::{reject, store_reject, ApiState};
use crate::export::render_csv;
use crate::ledger::access::{ensure_elevated, GatedCommand};
use crate::ledger::record::{ActorContext, BlacklistEntry};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/admin-role", put(set_admin_role))
        .route("/trusted-role", put(set_trusted_role))
        .route("/log-channel", put(set_log_channel))
        .route("/decay-half-life", put(set_decay_half_life))
        .route("/blacklist", post(blacklist_add))
        .route("/blacklist/list", post(blacklist_list))
        .route("/blacklist/{user_id}", delete(blacklist_remove))
        .route("/export/{target_id}", post(export_vouches))
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub actor: ActorContext,
    /// None clears the role.
    pub role_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetChannelRequest {
    pub actor: ActorContext,
    pub channel_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetHalfLifeRequest {
    pub actor: ActorContext,
    pub days: f64,
}

#[derive(Debug, Deserialize)]
pub struct BlacklistAddRequest {
    pub actor: ActorContext,
    pub user_id: String,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActorRequest {
    pub actor: ActorContext,
}

/// Acknowledges a setter with the newly effective value.
#[derive(Debug, Serialize)]
pub struct SettingAck {
    pub community_id: String,
    pub setting: &'static str,
    pub value: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BlacklistRemoveResponse {
    pub user_id: String,
    pub removed: bool,
}

#[derive(Debug, Serialize)]
pub struct BlacklistListResponse {
    pub total: usize,
    pub entries: Vec<BlacklistEntry>,
}

/// PUT /communities/{community_id}/admin/admin-role
async fn set_admin_role(
    State(state): State<ApiState>,
    Path(community_id): Path<String>,
    Json(req): Json<SetRoleRequest>,
) -> Result<Json<SettingAck>, (StatusCode, String)> {
    state
        .ledger
        .set_admin_role(&community_id, &req.actor, req.role_id.clone())
        .await
        .map_err(reject)?;
    Ok(Json(SettingAck {
        community_id,
        setting: "admin_role_id",
        value: req.role_id,
    }))
}

/// PUT /communities/{community_id}/admin/trusted-role
async fn set_trusted_role(
    State(state): State<ApiState>,
    Path(community_id): Path<String>,
    Json(req): Json<SetRoleRequest>,
) -> Result<Json<SettingAck>, (StatusCode, String)> {
    state
        .ledger
        .set_trusted_role(&community_id, &req.actor, req.role_id.clone())
        .await
        .map_err(reject)?;
    Ok(Json(SettingAck {
        community_id,
        setting: "trusted_role_id",
        value: req.role_id,
    }))
}

/// PUT /communities/{community_id}/admin/log-channel
async fn set_log_channel(
    State(state): State<ApiState>,
    Path(community_id): Path<String>,
    Json(req): Json<SetChannelRequest>,
) -> Result<Json<SettingAck>, (StatusCode, String)> {
    state
        .ledger
        .set_log_channel(&community_id, &req.actor, req.channel_id.clone())
        .await
        .map_err(reject)?;
    Ok(Json(SettingAck {
        community_id,
        setting: "log_channel_id",
        value: req.channel_id,
    }))
}

/// PUT /communities/{community_id}/admin/decay-half-life
async fn set_decay_half_life(
    State(state): State<ApiState>,
    Path(community_id): Path<String>,
    Json(req): Json<SetHalfLifeRequest>,
) -> Result<Json<SettingAck>, (StatusCode, String)> {
    state
        .ledger
        .set_decay_half_life(&community_id, &req.actor, req.days)
        .await
        .map_err(reject)?;
    Ok(Json(SettingAck {
        community_id,
        setting: "decay_half_life_days",
        value: Some(req.days.to_string()),
    }))
}

/// POST /communities/{community_id}/admin/blacklist
async fn blacklist_add(
    State(state): State<ApiState>,
    Path(community_id): Path<String>,
    Json(req): Json<BlacklistAddRequest>,
) -> Result<Json<BlacklistEntry>, (StatusCode, String)> {
    let reason = req.reason.unwrap_or_else(|| "No reason provided".to_string());
    let entry = state
        .ledger
        .blacklist_add(&community_id, &req.actor, &req.user_id, &reason)
        .await
        .map_err(reject)?;
    Ok(Json(entry))
}

/// DELETE /communities/{community_id}/admin/blacklist/{user_id}
async fn blacklist_remove(
    State(state): State<ApiState>,
    Path((community_id, user_id)): Path<(String, String)>,
    Json(req): Json<ActorRequest>,
) -> Result<Json<BlacklistRemoveResponse>, (StatusCode, String)> {
    let removed = state
        .ledger
        .blacklist_remove(&community_id, &req.actor, &user_id)
        .await
        .map_err(reject)?;
    Ok(Json(BlacklistRemoveResponse { user_id, removed }))
}

/// POST /communities/{community_id}/admin/blacklist/list
async fn blacklist_list(
    State(state): State<ApiState>,
    Path(community_id): Path<String>,
    Json(req): Json<ActorRequest>,
) -> Result<Json<BlacklistListResponse>, (StatusCode, String)> {
    let entries = state
        .ledger
        .blacklist_list(&community_id, &req.actor)
        .await
        .map_err(reject)?;
    Ok(Json(BlacklistListResponse {
        total: entries.len(),
        entries,
    }))
}

/// POST /communities/{community_id}/admin/export/{target_id}
///
/// Full-audit CSV, removed records included, rendered in memory and
/// returned to the requester as an attachment. Nothing is persisted, so
/// there is no artifact to clean up after delivery.
async fn export_vouches(
    State(state): State<ApiState>,
    Path((community_id, target_id)): Path<(String, String)>,
    Json(req): Json<ActorRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let settings = state
        .db
        .settings()
        .get_or_create(&community_id)
        .await
        .map_err(store_reject)?;
    ensure_elevated(&req.actor, &settings, GatedCommand::Export).map_err(reject)?;

    let records = state
        .db
        .vouches()
        .all_for_target(&community_id, &target_id)
        .await
        .map_err(store_reject)?;

    let csv = render_csv(&records);
    let disposition = format!("attachment; filename=\"vouches_{target_id}.csv\"");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}
