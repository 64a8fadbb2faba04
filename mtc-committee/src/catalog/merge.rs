//! Merge coordinator
//!
//! Evaluated synchronously after every ballot: once a staged proposal has
//! at least [`QUORUM`] ballots and at least [`APPROVAL_THRESHOLD`]
//! approval, it is promoted into the live catalog in a single transaction
//! that also reassigns attached media, deletes the staged row and all of
//! its ballots, and records the outcome. Racing attempts for the same
//! subject serialize on the staged row's write lock, so exactly one of
//! them performs the promotion and the rest observe it as already merged.

use crate::catalog::ballots;
use crate::catalog::members::parse_uuid;
use mtc_common::db::models::{Difficulty, ProposalKind, QuestionOption, Tally};
use mtc_common::{Error, Result};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

/// Minimum total ballot count before a merge can be considered
pub const QUORUM: i64 = 4;

/// Minimum approval ratio required, together with quorum, to merge
pub const APPROVAL_THRESHOLD: f64 = 0.5;

/// Result of a merge attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// This call performed the staged-to-live promotion
    Merged(Uuid),
    /// The proposal has not reached quorum-weighted majority yet
    Pending,
    /// A concurrent or earlier call already promoted the proposal
    AlreadyMerged(Uuid),
}

/// True when a tally satisfies the merge predicate
pub fn merge_predicate(tally: &Tally) -> bool {
    tally.total() >= QUORUM && tally.approval() >= APPROVAL_THRESHOLD
}

/// Attempt the staged-to-live promotion for a subject
///
/// The whole check-and-act sequence runs in one transaction. The first
/// statement is a self-assignment touch of the staged row: it forces the
/// write lock before the tally is read, so two ballots crossing the
/// threshold concurrently cannot both read an eligible tally. The loser
/// re-enters after the winner commits, finds the staged row gone, and
/// resolves the subject through the outcome log instead of failing.
pub async fn try_merge(pool: &SqlitePool, subject_id: Uuid) -> Result<MergeOutcome> {
    let mut tx = pool.begin().await?;
    let subject = subject_id.to_string();

    let kind = lock_staged_row(&mut tx, &subject).await?;
    let Some(kind) = kind else {
        // Staged row gone; either merged by a racing call or never existed
        let outcome: Option<(String,)> =
            sqlx::query_as("SELECT live_id FROM proposal_outcomes WHERE stage_id = ?")
                .bind(&subject)
                .fetch_optional(&mut *tx)
                .await?;
        return match outcome {
            Some((live_id,)) => Ok(MergeOutcome::AlreadyMerged(parse_uuid(&live_id)?)),
            None => Err(Error::NotFound(format!("No staged proposal: {}", subject_id))),
        };
    };

    let tally = ballots::tally(&mut tx, subject_id).await?;
    if !merge_predicate(&tally) {
        return Ok(MergeOutcome::Pending);
    }

    let live_id = match kind {
        ProposalKind::Competency => promote_competency(&mut tx, &subject).await?,
        ProposalKind::Question => promote_question(&mut tx, &subject).await?,
    };

    sqlx::query("DELETE FROM ballots WHERE subject_id = ?")
        .bind(&subject)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO proposal_outcomes (stage_id, kind, live_id, merged_at)
         VALUES (?, ?, ?, ?)",
    )
    .bind(&subject)
    .bind(kind.as_str())
    .bind(live_id.to_string())
    .bind(chrono::Utc::now().timestamp())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        "Merged staged {} {} into live {} ({} for / {} against)",
        kind.as_str(),
        subject_id,
        live_id,
        tally.for_count,
        tally.against_count
    );

    Ok(MergeOutcome::Merged(live_id))
}

/// Touch the staged row to take the write lock, returning its kind
async fn lock_staged_row(
    tx: &mut SqliteConnection,
    subject: &str,
) -> Result<Option<ProposalKind>> {
    let touched = sqlx::query("UPDATE competencies_stage SET name = name WHERE id = ?")
        .bind(subject)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if touched == 1 {
        return Ok(Some(ProposalKind::Competency));
    }

    let touched = sqlx::query("UPDATE questions_stage SET prompt = prompt WHERE id = ?")
        .bind(subject)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if touched == 1 {
        return Ok(Some(ProposalKind::Question));
    }

    Ok(None)
}

/// Promote a staged competency: copy fields and tag set, delete the stage
async fn promote_competency(tx: &mut SqliteConnection, subject: &str) -> Result<Uuid> {
    let (name, difficulty): (String, String) =
        sqlx::query_as("SELECT name, difficulty FROM competencies_stage WHERE id = ?")
            .bind(subject)
            .fetch_one(&mut *tx)
            .await?;

    let tag_rows: Vec<(String,)> =
        sqlx::query_as("SELECT tag_id FROM competency_stage_tags WHERE stage_id = ?")
            .bind(subject)
            .fetch_all(&mut *tx)
            .await?;
    let tag_ids = tag_rows
        .iter()
        .map(|(id,)| parse_uuid(id))
        .collect::<Result<Vec<_>>>()?;

    let live_id =
        insert_live_competency(tx, &name, Difficulty::parse(&difficulty)?, &tag_ids).await?;

    // Stage-tag links cascade with the staged row
    sqlx::query("DELETE FROM competencies_stage WHERE id = ?")
        .bind(subject)
        .execute(&mut *tx)
        .await?;

    Ok(live_id)
}

/// Promote a staged question: copy prompt and options verbatim, move any
/// attached media to the new live id, delete the stage
async fn promote_question(tx: &mut SqliteConnection, subject: &str) -> Result<Uuid> {
    let (competency_id, prompt): (String, String) =
        sqlx::query_as("SELECT competency_id, prompt FROM questions_stage WHERE id = ?")
            .bind(subject)
            .fetch_one(&mut *tx)
            .await?;

    let option_rows: Vec<(i64, String, i64)> = sqlx::query_as(
        "SELECT ord, body, is_correct FROM question_stage_options
         WHERE stage_id = ? ORDER BY ord",
    )
    .bind(subject)
    .fetch_all(&mut *tx)
    .await?;
    let options: Vec<QuestionOption> = option_rows
        .into_iter()
        .map(|(ord, body, is_correct)| QuestionOption { ord, body, is_correct: is_correct != 0 })
        .collect();

    let live_id = insert_live_question(tx, parse_uuid(&competency_id)?, &prompt, &options).await?;

    // Media ownership moves in the same transaction that deletes the stage
    sqlx::query(
        "UPDATE question_media SET question_id = ?, stage_id = NULL WHERE stage_id = ?",
    )
    .bind(live_id.to_string())
    .bind(subject)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM questions_stage WHERE id = ?")
        .bind(subject)
        .execute(&mut *tx)
        .await?;

    Ok(live_id)
}

/// Insert a live competency at the next catalog position
///
/// Shared constructor for the voted merge path and the chair bypass, so
/// both produce the same live shape.
pub(crate) async fn insert_live_competency(
    tx: &mut SqliteConnection,
    name: &str,
    difficulty: Difficulty,
    tag_ids: &[Uuid],
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let next_position: i64 =
        sqlx::query_scalar("SELECT COALESCE(MAX(position), 0) + 1 FROM competencies")
            .fetch_one(&mut *tx)
            .await?;

    sqlx::query(
        "INSERT INTO competencies (id, name, difficulty, position, created_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(name)
    .bind(difficulty.as_str())
    .bind(next_position)
    .bind(chrono::Utc::now().timestamp())
    .execute(&mut *tx)
    .await?;

    for tag_id in tag_ids {
        sqlx::query("INSERT INTO competency_tags (competency_id, tag_id) VALUES (?, ?)")
            .bind(id.to_string())
            .bind(tag_id.to_string())
            .execute(&mut *tx)
            .await?;
    }

    Ok(id)
}

/// Insert a live question with its four options, preserving order
///
/// Shared constructor for the voted merge path and the chair bypass.
pub(crate) async fn insert_live_question(
    tx: &mut SqliteConnection,
    competency_id: Uuid,
    prompt: &str,
    options: &[QuestionOption],
) -> Result<Uuid> {
    let id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO questions (id, competency_id, prompt, created_at)
         VALUES (?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(competency_id.to_string())
    .bind(prompt)
    .bind(chrono::Utc::now().timestamp())
    .execute(&mut *tx)
    .await?;

    for option in options {
        sqlx::query(
            "INSERT INTO question_options (question_id, ord, body, is_correct)
             VALUES (?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(option.ord)
        .bind(&option.body)
        .bind(option.is_correct)
        .execute(&mut *tx)
        .await?;
    }

    Ok(id)
}
