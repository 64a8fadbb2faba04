//! Proposal submission service
//!
//! Single entry point for both roles: validation is shared, and the chair
//! "bypass" is simply a submission that lands directly in the merged
//! state through the same live-insert constructors the merge coordinator
//! uses. Members land in the staging tables instead, where ballots decide.

use crate::catalog::ballots;
use crate::catalog::members::{self, parse_uuid};
use crate::catalog::merge;
use mtc_common::db::models::{
    Difficulty, QuestionOption, StagedCompetency, StagedQuestion, Tally,
};
use mtc_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

/// Number of answer options every question carries
pub const OPTION_COUNT: usize = 4;

/// A competency proposal as it arrives from the caller
#[derive(Debug, Clone)]
pub struct CompetencyDraft {
    pub name: String,
    pub difficulty: Difficulty,
    pub tag_ids: Vec<Uuid>,
    pub justification: Option<String>,
}

/// A question proposal; `correct_index` is 0-based here
#[derive(Debug, Clone)]
pub struct QuestionDraft {
    pub competency_id: Uuid,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

/// Where a submission landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Staged for committee voting
    Staged(Uuid),
    /// Created directly in the live catalog (chair privilege)
    Live(Uuid),
}

impl SubmissionOutcome {
    pub fn id(&self) -> Uuid {
        match self {
            SubmissionOutcome::Staged(id) | SubmissionOutcome::Live(id) => *id,
        }
    }

    pub fn is_staged(&self) -> bool {
        matches!(self, SubmissionOutcome::Staged(_))
    }
}

/// Submit a competency proposal
pub async fn submit_competency(
    pool: &SqlitePool,
    proposer_id: Uuid,
    draft: &CompetencyDraft,
) -> Result<SubmissionOutcome> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(Error::Validation("Competency name must not be empty".to_string()));
    }
    ensure_tags_exist(pool, &draft.tag_ids).await?;

    let role = members::role_of(pool, proposer_id).await?;

    if role.is_chair() {
        let mut tx = pool.begin().await?;
        let id = merge::insert_live_competency(&mut tx, name, draft.difficulty, &draft.tag_ids)
            .await?;
        tx.commit().await?;
        info!("Chair {} created live competency {} directly", proposer_id, id);
        return Ok(SubmissionOutcome::Live(id));
    }

    let id = Uuid::new_v4();
    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO competencies_stage (id, name, difficulty, justification, proposer_id, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(name)
    .bind(draft.difficulty.as_str())
    .bind(draft.justification.as_deref().map(str::trim).filter(|j| !j.is_empty()))
    .bind(proposer_id.to_string())
    .bind(chrono::Utc::now().timestamp())
    .execute(&mut *tx)
    .await?;

    for tag_id in &draft.tag_ids {
        sqlx::query("INSERT INTO competency_stage_tags (stage_id, tag_id) VALUES (?, ?)")
            .bind(id.to_string())
            .bind(tag_id.to_string())
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    info!("Member {} proposed competency {}", proposer_id, id);
    Ok(SubmissionOutcome::Staged(id))
}

/// Submit a question proposal against a live competency
pub async fn submit_question(
    pool: &SqlitePool,
    proposer_id: Uuid,
    draft: &QuestionDraft,
) -> Result<SubmissionOutcome> {
    let prompt = draft.prompt.trim();
    if prompt.is_empty() {
        return Err(Error::Validation("Question text must not be empty".to_string()));
    }
    if draft.options.len() != OPTION_COUNT {
        return Err(Error::Validation(format!(
            "A question needs exactly {} answer options",
            OPTION_COUNT
        )));
    }
    if draft.options.iter().any(|o| o.trim().is_empty()) {
        return Err(Error::Validation("All four answer options must be filled".to_string()));
    }
    if draft.correct_index >= OPTION_COUNT {
        return Err(Error::Validation(format!(
            "Correct option index out of range: {}",
            draft.correct_index
        )));
    }

    let target_exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM competencies WHERE id = ?)")
            .bind(draft.competency_id.to_string())
            .fetch_one(pool)
            .await?;
    if !target_exists {
        return Err(Error::Reference(format!(
            "Target competency is not in the live catalog: {}",
            draft.competency_id
        )));
    }

    let role = members::role_of(pool, proposer_id).await?;

    let options: Vec<QuestionOption> = draft
        .options
        .iter()
        .enumerate()
        .map(|(ord, body)| QuestionOption {
            ord: ord as i64,
            body: body.trim().to_string(),
            is_correct: ord == draft.correct_index,
        })
        .collect();

    if role.is_chair() {
        let mut tx = pool.begin().await?;
        let id =
            merge::insert_live_question(&mut tx, draft.competency_id, prompt, &options).await?;
        tx.commit().await?;
        info!("Chair {} created live question {} directly", proposer_id, id);
        return Ok(SubmissionOutcome::Live(id));
    }

    let id = Uuid::new_v4();
    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO questions_stage (id, competency_id, prompt, proposer_id, created_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(draft.competency_id.to_string())
    .bind(prompt)
    .bind(proposer_id.to_string())
    .bind(chrono::Utc::now().timestamp())
    .execute(&mut *tx)
    .await?;

    for option in &options {
        sqlx::query(
            "INSERT INTO question_stage_options (stage_id, ord, body, is_correct)
             VALUES (?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(option.ord)
        .bind(&option.body)
        .bind(option.is_correct)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    info!("Member {} proposed question {}", proposer_id, id);
    Ok(SubmissionOutcome::Staged(id))
}

/// A pending proposal with its current tally for the review queue
#[derive(Debug, Clone)]
pub struct PendingCompetency {
    pub proposal: StagedCompetency,
    pub tally: Tally,
    pub my_vote: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct PendingQuestion {
    pub proposal: StagedQuestion,
    pub tally: Tally,
    pub my_vote: Option<bool>,
}

/// Pending competency proposals, oldest first
pub async fn list_pending_competencies(
    pool: &SqlitePool,
    voter_id: Option<Uuid>,
) -> Result<Vec<PendingCompetency>> {
    let rows: Vec<(String, String, String, Option<String>, String, i64)> = sqlx::query_as(
        "SELECT id, name, difficulty, justification, proposer_id, created_at
         FROM competencies_stage ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await?;

    let mut pending = Vec::with_capacity(rows.len());
    for (id, name, difficulty, justification, proposer_id, created_at) in rows {
        let stage_id = parse_uuid(&id)?;
        let tag_rows: Vec<(String,)> =
            sqlx::query_as("SELECT tag_id FROM competency_stage_tags WHERE stage_id = ?")
                .bind(&id)
                .fetch_all(pool)
                .await?;
        let tag_ids = tag_rows
            .iter()
            .map(|(t,)| parse_uuid(t))
            .collect::<Result<Vec<_>>>()?;

        pending.push(PendingCompetency {
            proposal: StagedCompetency {
                id: stage_id,
                name,
                difficulty: Difficulty::parse(&difficulty)?,
                tag_ids,
                justification,
                proposer_id: parse_uuid(&proposer_id)?,
                created_at,
            },
            tally: ballots::tally_for(pool, stage_id).await?,
            my_vote: match voter_id {
                Some(voter) => ballots::ballot_of(pool, stage_id, voter).await?,
                None => None,
            },
        });
    }
    Ok(pending)
}

/// Pending question proposals, oldest first
pub async fn list_pending_questions(
    pool: &SqlitePool,
    voter_id: Option<Uuid>,
) -> Result<Vec<PendingQuestion>> {
    let rows: Vec<(String, String, String, String, i64)> = sqlx::query_as(
        "SELECT id, competency_id, prompt, proposer_id, created_at
         FROM questions_stage ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await?;

    let mut pending = Vec::with_capacity(rows.len());
    for (id, competency_id, prompt, proposer_id, created_at) in rows {
        let stage_id = parse_uuid(&id)?;
        let option_rows: Vec<(i64, String, i64)> = sqlx::query_as(
            "SELECT ord, body, is_correct FROM question_stage_options
             WHERE stage_id = ? ORDER BY ord",
        )
        .bind(&id)
        .fetch_all(pool)
        .await?;

        pending.push(PendingQuestion {
            proposal: StagedQuestion {
                id: stage_id,
                competency_id: parse_uuid(&competency_id)?,
                prompt,
                options: option_rows
                    .into_iter()
                    .map(|(ord, body, is_correct)| QuestionOption {
                        ord,
                        body,
                        is_correct: is_correct != 0,
                    })
                    .collect(),
                proposer_id: parse_uuid(&proposer_id)?,
                created_at,
            },
            tally: ballots::tally_for(pool, stage_id).await?,
            my_vote: match voter_id {
                Some(voter) => ballots::ballot_of(pool, stage_id, voter).await?,
                None => None,
            },
        });
    }
    Ok(pending)
}

/// Fail with a dangling-id error unless every tag exists
async fn ensure_tags_exist(pool: &SqlitePool, tag_ids: &[Uuid]) -> Result<()> {
    for tag_id in tag_ids {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM tags WHERE id = ?)")
            .bind(tag_id.to_string())
            .fetch_one(pool)
            .await?;
        if !exists {
            return Err(Error::Reference(format!("Tag does not exist: {}", tag_id)));
        }
    }
    Ok(())
}
