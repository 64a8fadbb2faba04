//! Ballot endpoint

use crate::api::ApiResult;
use crate::catalog::ballots::{self, BallotOutcome};
use crate::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CastBallotRequest {
    pub member_id: Uuid,
    pub subject_id: Uuid,
    pub vote: bool,
}

#[derive(Debug, Serialize)]
pub struct CastBallotResponse {
    /// false only when the subject had already merged before this ballot
    pub accepted: bool,
    pub merged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_id: Option<Uuid>,
}

/// POST /ballots - cast or change a vote on a staged proposal
pub async fn cast_ballot(
    State(state): State<AppState>,
    Json(req): Json<CastBallotRequest>,
) -> ApiResult<CastBallotResponse> {
    let outcome = ballots::cast_ballot(&state.db, req.subject_id, req.member_id, req.vote).await?;

    let response = match outcome {
        BallotOutcome::Recorded { live_id } => CastBallotResponse {
            accepted: true,
            merged: live_id.is_some(),
            live_id,
        },
        BallotOutcome::AlreadyMerged { live_id } => CastBallotResponse {
            accepted: false,
            merged: true,
            live_id: Some(live_id),
        },
    };
    Ok(Json(response))
}
