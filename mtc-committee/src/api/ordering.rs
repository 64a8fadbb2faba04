//! Live catalog listing and chair-only reordering

use crate::api::ApiResult;
use crate::catalog::ordering;
use crate::AppState;
use axum::{extract::State, Json};
use mtc_common::db::models::Competency;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub member_id: Uuid,
    /// Every live competency id, in the desired display order
    pub ordered_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub ok: bool,
}

/// GET /competencies - live catalog in position order
pub async fn list_competencies(State(state): State<AppState>) -> ApiResult<Vec<Competency>> {
    Ok(Json(ordering::list_competencies(&state.db).await?))
}

/// POST /competencies/reorder - rewrite catalog positions atomically
pub async fn reorder(
    State(state): State<AppState>,
    Json(req): Json<ReorderRequest>,
) -> ApiResult<ReorderResponse> {
    ordering::reorder(&state.db, req.member_id, &req.ordered_ids).await?;
    Ok(Json(ReorderResponse { ok: true }))
}
