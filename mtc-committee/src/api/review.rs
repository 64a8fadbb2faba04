//! Review queue endpoints: pending proposals with their tallies

use crate::api::ApiResult;
use crate::catalog::submission;
use crate::AppState;
use axum::extract::{Query, State};
use axum::Json;
use mtc_common::db::models::{Difficulty, QuestionOption, Tally};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    /// When present, each row carries this voter's own current ballot
    pub voter_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct TallyView {
    pub for_count: i64,
    pub against_count: i64,
    pub total: i64,
    pub approval: f64,
}

impl From<Tally> for TallyView {
    fn from(t: Tally) -> Self {
        TallyView {
            for_count: t.for_count,
            against_count: t.against_count,
            total: t.total(),
            approval: t.approval(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PendingCompetencyView {
    pub id: Uuid,
    pub name: String,
    pub difficulty: Difficulty,
    pub tag_ids: Vec<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    pub proposer_id: Uuid,
    pub tally: TallyView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_vote: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct PendingQuestionView {
    pub id: Uuid,
    pub competency_id: Uuid,
    pub prompt: String,
    pub options: Vec<QuestionOption>,
    pub proposer_id: Uuid,
    pub tally: TallyView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_vote: Option<bool>,
}

/// GET /review/competencies - pending competency proposals
pub async fn pending_competencies(
    State(state): State<AppState>,
    Query(query): Query<ReviewQuery>,
) -> ApiResult<Vec<PendingCompetencyView>> {
    let pending = submission::list_pending_competencies(&state.db, query.voter_id).await?;
    Ok(Json(
        pending
            .into_iter()
            .map(|p| PendingCompetencyView {
                id: p.proposal.id,
                name: p.proposal.name,
                difficulty: p.proposal.difficulty,
                tag_ids: p.proposal.tag_ids,
                justification: p.proposal.justification,
                proposer_id: p.proposal.proposer_id,
                tally: p.tally.into(),
                my_vote: p.my_vote,
            })
            .collect(),
    ))
}

/// GET /review/questions - pending question proposals
pub async fn pending_questions(
    State(state): State<AppState>,
    Query(query): Query<ReviewQuery>,
) -> ApiResult<Vec<PendingQuestionView>> {
    let pending = submission::list_pending_questions(&state.db, query.voter_id).await?;
    Ok(Json(
        pending
            .into_iter()
            .map(|p| PendingQuestionView {
                id: p.proposal.id,
                competency_id: p.proposal.competency_id,
                prompt: p.proposal.prompt,
                options: p.proposal.options,
                proposer_id: p.proposal.proposer_id,
                tally: p.tally.into(),
                my_vote: p.my_vote,
            })
            .collect(),
    ))
}
