//! Vouch command endpoints: create, remove, purge, and the paginated
//! listing with its navigation surface.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{reject, store_reject, ApiState};
use crate::directory::IdentityProfile;
use crate::error::LedgerError;
use crate::ledger::access::{ensure_elevated, GatedCommand};
use crate::ledger::record::{validate_reason, ActorContext, TargetRef, VouchRecord};
use crate::paging::{clamp_page, page_slice, total_pages, PageCursor, PageStep, PAGE_SIZE};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/", post(create_vouch))
        .route("/purge", post(purge_target))
        .route("/page", post(navigate_page))
        .route("/received/{target_id}", get(list_vouches))
        .route("/{vouch_id}", delete(remove_vouch))
}

#[derive(Debug, Deserialize)]
pub struct CreateVouchRequest {
    pub actor: ActorContext,
    pub target: TargetRef,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveVouchRequest {
    pub actor: ActorContext,
}

#[derive(Debug, Deserialize)]
pub struct PurgeRequest {
    pub actor: ActorContext,
    pub target_id: String,
}

#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    pub id: i64,
    pub removed: bool,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub target_id: String,
    /// Exactly how many live records the bulk update reached.
    pub affected: u64,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub requester_id: String,
    pub page: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PageNavRequest {
    pub actor_id: String,
    pub cursor: String,
    pub step: PageStep,
}

#[derive(Debug, Serialize)]
pub struct VouchEntry {
    pub id: i64,
    pub voucher_name: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct VouchPageResponse {
    pub subject: IdentityProfile,
    /// Zero-based page index.
    pub page: usize,
    /// At least 1; an empty listing is a single empty page.
    pub total_pages: usize,
    pub total_records: usize,
    pub entries: Vec<VouchEntry>,
    /// Self-contained navigation state for the next step.
    pub cursor: String,
}

/// POST /communities/{community_id}/vouches
async fn create_vouch(
    State(state): State<ApiState>,
    Path(community_id): Path<String>,
    Json(req): Json<CreateVouchRequest>,
) -> Result<Json<VouchRecord>, (StatusCode, String)> {
    validate_reason(&req.reason).map_err(reject)?;
    let record = state
        .ledger
        .create(&community_id, &req.actor, &req.target, &req.reason)
        .await
        .map_err(reject)?;
    Ok(Json(record))
}

/// DELETE /communities/{community_id}/vouches/{vouch_id}
///
/// Remove-by-id sits in the admin-gated command set, so the command gate
/// runs first; the ledger independently enforces the voucher-or-elevated
/// rule on the record itself.
async fn remove_vouch(
    State(state): State<ApiState>,
    Path((community_id, vouch_id)): Path<(String, i64)>,
    Json(req): Json<RemoveVouchRequest>,
) -> Result<Json<RemovedResponse>, (StatusCode, String)> {
    let settings = state
        .db
        .settings()
        .get_or_create(&community_id)
        .await
        .map_err(store_reject)?;
    ensure_elevated(&req.actor, &settings, GatedCommand::RemoveVouch).map_err(reject)?;

    let record = state.ledger.soft_delete(vouch_id, &req.actor).await.map_err(reject)?;
    Ok(Json(RemovedResponse {
        id: record.id,
        removed: true,
    }))
}

/// POST /communities/{community_id}/vouches/purge
async fn purge_target(
    State(state): State<ApiState>,
    Path(community_id): Path<String>,
    Json(req): Json<PurgeRequest>,
) -> Result<Json<PurgeResponse>, (StatusCode, String)> {
    let affected = state
        .ledger
        .purge(&community_id, &req.target_id, &req.actor)
        .await
        .map_err(reject)?;
    Ok(Json(PurgeResponse {
        target_id: req.target_id,
        affected,
    }))
}

/// GET /communities/{community_id}/vouches/received/{target_id}
async fn list_vouches(
    State(state): State<ApiState>,
    Path((community_id, target_id)): Path<(String, String)>,
    Query(query): Query<ListQuery>,
) -> Result<Json<VouchPageResponse>, (StatusCode, String)> {
    let records = state
        .db
        .vouches()
        .live_for_target(&community_id, &target_id)
        .await
        .map_err(store_reject)?;

    let page = clamp_page(
        query.page.unwrap_or(0),
        total_pages(records.len(), PAGE_SIZE),
    );
    let response =
        page_response(&state, &community_id, &target_id, &query.requester_id, &records, page)
            .await;
    Ok(Json(response))
}

/// POST /communities/{community_id}/vouches/page
///
/// One navigation step. The live record set is re-fetched and re-chunked
/// every time so a removal between page views is reflected, and only the
/// identity that opened the listing may navigate it.
async fn navigate_page(
    State(state): State<ApiState>,
    Path(community_id): Path<String>,
    Json(req): Json<PageNavRequest>,
) -> Result<Json<VouchPageResponse>, (StatusCode, String)> {
    let cursor = PageCursor::decode(&req.cursor).map_err(reject)?;
    cursor.ensure_requester(&req.actor_id).map_err(reject)?;
    if cursor.community_id != community_id {
        return Err(reject(LedgerError::Validation(
            "cursor does not belong to this community".to_string(),
        )));
    }

    let records = state
        .db
        .vouches()
        .live_for_target(&community_id, &cursor.subject_id)
        .await
        .map_err(store_reject)?;

    let requested = cursor.page as i64 + req.step.delta();
    let page = clamp_page(requested, total_pages(records.len(), PAGE_SIZE));
    let response = page_response(
        &state,
        &community_id,
        &cursor.subject_id,
        &cursor.requester_id,
        &records,
        page,
    )
    .await;
    Ok(Json(response))
}

async fn page_response(
    state: &ApiState,
    community_id: &str,
    target_id: &str,
    requester_id: &str,
    records: &[VouchRecord],
    page: usize,
) -> VouchPageResponse {
    let total = total_pages(records.len(), PAGE_SIZE);

    let entries = page_slice(records, page, PAGE_SIZE)
        .iter()
        .map(|r| VouchEntry {
            id: r.id,
            voucher_name: r.voucher_name.clone(),
            reason: r.reason.clone(),
            created_at: r.created_at,
        })
        .collect();

    // Directory first, then the denormalized snapshot name, then the
    // placeholder: the page renders even for a member who left.
    let subject = match state.directory.resolve(target_id).await {
        Some(profile) => profile,
        None => records
            .first()
            .map(|r| IdentityProfile {
                id: target_id.to_string(),
                display_name: r.target_name.clone(),
                avatar_url: None,
            })
            .unwrap_or_else(|| IdentityProfile::placeholder(target_id)),
    };

    let cursor = PageCursor {
        requester_id: requester_id.to_string(),
        subject_id: target_id.to_string(),
        community_id: community_id.to_string(),
        page,
        total: total.max(1),
    };

    VouchPageResponse {
        subject,
        page,
        total_pages: total.max(1),
        total_records: records.len(),
        entries,
        cursor: cursor.encode(),
    }
}
