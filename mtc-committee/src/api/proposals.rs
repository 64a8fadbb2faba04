//! Proposal submission endpoints
//!
//! The correct-option index is 1-based on the wire (matching the forms
//! that call this API) and 0-based everywhere inside the service.

use crate::api::ApiResult;
use crate::catalog::submission::{self, CompetencyDraft, QuestionDraft, OPTION_COUNT};
use crate::AppState;
use axum::{extract::State, Json};
use mtc_common::db::models::Difficulty;
use mtc_common::Error;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SubmitCompetencyRequest {
    pub member_id: Uuid,
    pub name: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
    #[serde(default)]
    pub justification: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OptionBody {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitQuestionRequest {
    pub member_id: Uuid,
    pub competency_id: Uuid,
    pub prompt: String,
    pub options: Vec<OptionBody>,
    /// 1-based index of the correct option
    pub correct_index: usize,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub id: Uuid,
    /// true when the proposal awaits voting, false for a chair bypass
    pub staged: bool,
}

/// POST /competencies - submit a competency proposal
pub async fn submit_competency(
    State(state): State<AppState>,
    Json(req): Json<SubmitCompetencyRequest>,
) -> ApiResult<SubmitResponse> {
    let draft = CompetencyDraft {
        name: req.name,
        difficulty: req.difficulty,
        tag_ids: req.tag_ids,
        justification: req.justification,
    };
    let outcome = submission::submit_competency(&state.db, req.member_id, &draft).await?;
    Ok(Json(SubmitResponse { id: outcome.id(), staged: outcome.is_staged() }))
}

/// POST /questions - submit a question proposal
pub async fn submit_question(
    State(state): State<AppState>,
    Json(req): Json<SubmitQuestionRequest>,
) -> ApiResult<SubmitResponse> {
    if req.correct_index < 1 || req.correct_index > OPTION_COUNT {
        return Err(Error::Validation(format!(
            "correct_index must be between 1 and {}",
            OPTION_COUNT
        ))
        .into());
    }

    let draft = QuestionDraft {
        competency_id: req.competency_id,
        prompt: req.prompt,
        options: req.options.into_iter().map(|o| o.body).collect(),
        correct_index: req.correct_index - 1,
    };
    let outcome = submission::submit_question(&state.db, req.member_id, &draft).await?;
    Ok(Json(SubmitResponse { id: outcome.id(), staged: outcome.is_staged() }))
}
