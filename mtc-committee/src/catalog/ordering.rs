//! Ordering manager (chair-only)
//!
//! Live competency positions form a contiguous 1..N sequence. Reordering
//! only accepts the complete id set and rewrites every position in one
//! transaction; a partial application would leave a gap or a duplicate.

use crate::catalog::members::{self, parse_uuid};
use mtc_common::db::models::{Competency, Difficulty};
use mtc_common::{Error, Result};
use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::info;
use uuid::Uuid;

/// Rewrite catalog positions to match `ordered_ids`
///
/// The input must be exactly the current live id set. Positions are first
/// written negated and then flipped in a second pass, so the UNIQUE
/// constraint on `position` holds for every intermediate row state.
pub async fn reorder(pool: &SqlitePool, actor: Uuid, ordered_ids: &[Uuid]) -> Result<()> {
    members::require_chair(pool, actor, "Catalog reordering").await?;

    let distinct: HashSet<&Uuid> = ordered_ids.iter().collect();
    if distinct.len() != ordered_ids.len() {
        return Err(Error::Validation("Duplicate id in reorder request".to_string()));
    }

    let mut tx = pool.begin().await?;

    let current_rows: Vec<(String,)> = sqlx::query_as("SELECT id FROM competencies")
        .fetch_all(&mut *tx)
        .await?;
    let current: HashSet<Uuid> = current_rows
        .iter()
        .map(|(id,)| parse_uuid(id))
        .collect::<Result<HashSet<_>>>()?;

    if current.len() != ordered_ids.len() || !ordered_ids.iter().all(|id| current.contains(id)) {
        return Err(Error::Validation(
            "Reorder must list every live competency exactly once".to_string(),
        ));
    }

    for (index, id) in ordered_ids.iter().enumerate() {
        sqlx::query("UPDATE competencies SET position = ? WHERE id = ?")
            .bind(-((index as i64) + 1))
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;
    }
    sqlx::query("UPDATE competencies SET position = -position WHERE position < 0")
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    info!("Catalog reordered ({} competencies)", ordered_ids.len());
    Ok(())
}

/// Live catalog in display order, with tag ids attached
pub async fn list_competencies(pool: &SqlitePool) -> Result<Vec<Competency>> {
    let rows: Vec<(String, String, String, i64, i64)> = sqlx::query_as(
        "SELECT id, name, difficulty, position, created_at
         FROM competencies ORDER BY position",
    )
    .fetch_all(pool)
    .await?;

    let mut competencies = Vec::with_capacity(rows.len());
    for (id, name, difficulty, position, created_at) in rows {
        let tag_rows: Vec<(String,)> =
            sqlx::query_as("SELECT tag_id FROM competency_tags WHERE competency_id = ?")
                .bind(&id)
                .fetch_all(pool)
                .await?;

        competencies.push(Competency {
            id: parse_uuid(&id)?,
            name,
            difficulty: Difficulty::parse(&difficulty)?,
            tag_ids: tag_rows
                .iter()
                .map(|(t,)| parse_uuid(t))
                .collect::<Result<Vec<_>>>()?,
            position,
            created_at,
        });
    }
    Ok(competencies)
}
