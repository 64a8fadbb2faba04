//! Tag catalog endpoints (chair-only except listing)

use crate::api::ApiResult;
use crate::catalog::tags;
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use mtc_common::db::models::Tag;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    pub member_id: Uuid,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameTagRequest {
    pub member_id: Uuid,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteTagRequest {
    pub member_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// GET /tags - the tag vocabulary
pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Vec<Tag>> {
    Ok(Json(tags::list_tags(&state.db).await?))
}

/// POST /tags - create a tag
pub async fn create_tag(
    State(state): State<AppState>,
    Json(req): Json<CreateTagRequest>,
) -> ApiResult<Tag> {
    Ok(Json(tags::create_tag(&state.db, req.member_id, &req.name).await?))
}

/// PUT /tags/:id - rename a tag
pub async fn rename_tag(
    State(state): State<AppState>,
    Path(tag_id): Path<Uuid>,
    Json(req): Json<RenameTagRequest>,
) -> ApiResult<Tag> {
    Ok(Json(tags::rename_tag(&state.db, req.member_id, tag_id, &req.name).await?))
}

/// DELETE /tags/:id - delete a tag and its membership everywhere
pub async fn delete_tag(
    State(state): State<AppState>,
    Path(tag_id): Path<Uuid>,
    Json(req): Json<DeleteTagRequest>,
) -> ApiResult<OkResponse> {
    tags::delete_tag(&state.db, req.member_id, tag_id).await?;
    Ok(Json(OkResponse { ok: true }))
}
