//! Ballot tally engine
//!
//! One ballot per (subject, voter): a repeat vote from the same member
//! replaces the earlier value in place, so the tally is a pure function
//! of the current rows. Every accepted ballot synchronously triggers the
//! merge coordinator, which means a voter can observe the promotion their
//! own ballot caused in the same response.

use crate::catalog::members::{self, parse_uuid};
use crate::catalog::merge::{self, MergeOutcome};
use mtc_common::db::models::Tally;
use mtc_common::{Error, Result};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

/// Result of casting a ballot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallotOutcome {
    /// Ballot recorded; `live_id` is set when this ballot (or a racing
    /// one) pushed the proposal over the threshold
    Recorded { live_id: Option<Uuid> },
    /// The subject was already promoted before this ballot arrived;
    /// nothing was recorded, benign from the voter's point of view
    AlreadyMerged { live_id: Uuid },
}

/// Record a for/against ballot and evaluate the merge predicate
pub async fn cast_ballot(
    pool: &SqlitePool,
    subject_id: Uuid,
    voter_id: Uuid,
    vote: bool,
) -> Result<BallotOutcome> {
    // Unknown voters are rejected before anything is written
    members::role_of(pool, voter_id).await?;

    // Guarded upsert: inserts or updates only while the staged row still
    // exists, so a ballot can never outlive its subject
    let recorded = sqlx::query(
        "INSERT INTO ballots (subject_id, voter_id, vote, updated_at)
         SELECT ?1, ?2, ?3, ?4
         WHERE EXISTS (SELECT 1 FROM competencies_stage WHERE id = ?1)
            OR EXISTS (SELECT 1 FROM questions_stage WHERE id = ?1)
         ON CONFLICT(subject_id, voter_id)
         DO UPDATE SET vote = excluded.vote, updated_at = excluded.updated_at",
    )
    .bind(subject_id.to_string())
    .bind(voter_id.to_string())
    .bind(vote)
    .bind(chrono::Utc::now().timestamp())
    .execute(pool)
    .await?
    .rows_affected();

    if recorded == 0 {
        // Subject no longer staged; distinguish merged from nonexistent
        let outcome: Option<(String,)> =
            sqlx::query_as("SELECT live_id FROM proposal_outcomes WHERE stage_id = ?")
                .bind(subject_id.to_string())
                .fetch_optional(pool)
                .await?;
        return match outcome {
            Some((live_id,)) => Ok(BallotOutcome::AlreadyMerged { live_id: parse_uuid(&live_id)? }),
            None => Err(Error::NotFound(format!("No staged proposal: {}", subject_id))),
        };
    }

    debug!("Ballot recorded: subject={} voter={} vote={}", subject_id, voter_id, vote);

    match merge::try_merge(pool, subject_id).await {
        Ok(MergeOutcome::Merged(live_id)) => Ok(BallotOutcome::Recorded { live_id: Some(live_id) }),
        // A racing ballot beat us to the promotion; ours was still counted
        Ok(MergeOutcome::AlreadyMerged(live_id)) => {
            Ok(BallotOutcome::Recorded { live_id: Some(live_id) })
        }
        Ok(MergeOutcome::Pending) => Ok(BallotOutcome::Recorded { live_id: None }),
        // The subject vanished between the upsert and the merge check; the
        // racing merge deletes ballots with the stage, so report it merged
        Err(Error::NotFound(_)) => {
            let outcome: Option<(String,)> =
                sqlx::query_as("SELECT live_id FROM proposal_outcomes WHERE stage_id = ?")
                    .bind(subject_id.to_string())
                    .fetch_optional(pool)
                    .await?;
            match outcome {
                Some((live_id,)) => {
                    Ok(BallotOutcome::Recorded { live_id: Some(parse_uuid(&live_id)?) })
                }
                None => Err(Error::NotFound(format!("No staged proposal: {}", subject_id))),
            }
        }
        Err(e) => Err(e),
    }
}

/// Current tally for a subject
pub async fn tally(conn: &mut SqliteConnection, subject_id: Uuid) -> Result<Tally> {
    let (for_count, against_count): (i64, i64) = sqlx::query_as(
        "SELECT
            COALESCE(SUM(CASE WHEN vote THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN vote THEN 0 ELSE 1 END), 0)
         FROM ballots WHERE subject_id = ?",
    )
    .bind(subject_id.to_string())
    .fetch_one(conn)
    .await?;

    Ok(Tally { for_count, against_count })
}

/// Pool-level tally convenience used by listings and tests
pub async fn tally_for(pool: &SqlitePool, subject_id: Uuid) -> Result<Tally> {
    let mut conn = pool.acquire().await?;
    tally(&mut conn, subject_id).await
}

/// A voter's current ballot on a subject, if any
pub async fn ballot_of(
    pool: &SqlitePool,
    subject_id: Uuid,
    voter_id: Uuid,
) -> Result<Option<bool>> {
    let row: Option<(bool,)> =
        sqlx::query_as("SELECT vote FROM ballots WHERE subject_id = ? AND voter_id = ?")
            .bind(subject_id.to_string())
            .bind(voter_id.to_string())
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|(vote,)| vote))
}
