//! Media attachment metadata endpoints
//!
//! Phase one hands out a grant with the storage path for the out-of-band
//! byte transfer; phase two persists the metadata row. The optional
//! stage_id/question_id pair on the wire collapses into the XOR
//! [`MediaParent`] enum here, matching the one-parent rule.

use crate::api::ApiResult;
use crate::catalog::media::{self, MediaParent, UploadRequest};
use crate::catalog::members;
use crate::AppState;
use axum::{extract::State, Json};
use mtc_common::Error;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct UploadRequestBody {
    pub member_id: Uuid,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    #[serde(default)]
    pub stage_id: Option<Uuid>,
    #[serde(default)]
    pub question_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UploadConfirmBody {
    pub member_id: Uuid,
    pub file_id: Uuid,
    pub storage_path: String,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    #[serde(default)]
    pub stage_id: Option<Uuid>,
    #[serde(default)]
    pub question_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct UploadGrantResponse {
    pub file_id: Uuid,
    pub storage_path: String,
}

#[derive(Debug, Serialize)]
pub struct UploadConfirmResponse {
    pub id: Uuid,
}

/// POST /media/request - validate an upload and issue a storage grant
pub async fn request_upload(
    State(state): State<AppState>,
    Json(body): Json<UploadRequestBody>,
) -> ApiResult<UploadGrantResponse> {
    members::role_of(&state.db, body.member_id).await?;
    let req = UploadRequest {
        file_name: body.file_name,
        mime_type: body.mime_type,
        size_bytes: body.size_bytes,
        parent: parent_from(body.stage_id, body.question_id)?,
    };
    let grant = media::request_upload(&state.db, &req).await?;
    Ok(Json(UploadGrantResponse { file_id: grant.file_id, storage_path: grant.storage_path }))
}

/// POST /media/confirm - persist metadata after the byte transfer
pub async fn confirm_upload(
    State(state): State<AppState>,
    Json(body): Json<UploadConfirmBody>,
) -> ApiResult<UploadConfirmResponse> {
    members::role_of(&state.db, body.member_id).await?;
    let req = UploadRequest {
        file_name: body.file_name,
        mime_type: body.mime_type,
        size_bytes: body.size_bytes,
        parent: parent_from(body.stage_id, body.question_id)?,
    };
    let id = media::confirm_upload(&state.db, &req, body.file_id, &body.storage_path).await?;
    Ok(Json(UploadConfirmResponse { id }))
}

fn parent_from(
    stage_id: Option<Uuid>,
    question_id: Option<Uuid>,
) -> Result<MediaParent, Error> {
    match (stage_id, question_id) {
        (Some(stage), None) => Ok(MediaParent::Stage(stage)),
        (None, Some(question)) => Ok(MediaParent::Question(question)),
        _ => Err(Error::Validation(
            "Provide either stage_id or question_id, not both".to_string(),
        )),
    }
}
