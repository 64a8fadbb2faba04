//! Committee roster endpoint (read-only; membership itself is managed
//! alongside authentication, outside this service)

use crate::api::ApiResult;
use crate::catalog::members;
use crate::AppState;
use axum::{extract::State, Json};
use mtc_common::db::models::Member;

/// GET /members - the committee roster
pub async fn list_members(State(state): State<AppState>) -> ApiResult<Vec<Member>> {
    Ok(Json(members::list_members(&state.db).await?))
}
