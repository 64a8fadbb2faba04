//! Tag catalog manager (chair-only)
//!
//! Tags are referenced by id everywhere else, so renames never touch
//! competencies and deletes only remove membership links. Names are
//! unique case-insensitively, enforced by a NOCASE unique index.

use crate::catalog::members::{self, parse_uuid};
use mtc_common::db::models::Tag;
use mtc_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

/// Create a tag; rejects case-insensitive duplicates
pub async fn create_tag(pool: &SqlitePool, actor: Uuid, name: &str) -> Result<Tag> {
    members::require_chair(pool, actor, "Tag creation").await?;

    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation("Tag name must not be empty".to_string()));
    }

    let tag = Tag {
        id: Uuid::new_v4(),
        name: name.to_string(),
        created_at: chrono::Utc::now().timestamp(),
    };

    let result = sqlx::query("INSERT INTO tags (id, name, created_at) VALUES (?, ?, ?)")
        .bind(tag.id.to_string())
        .bind(&tag.name)
        .bind(tag.created_at)
        .execute(pool)
        .await;

    match result {
        Ok(_) => {
            info!("Tag created: {} ({})", tag.name, tag.id);
            Ok(tag)
        }
        Err(e) => Err(map_duplicate(e, name)),
    }
}

/// Rename a tag; same duplicate check as creation
pub async fn rename_tag(pool: &SqlitePool, actor: Uuid, tag_id: Uuid, new_name: &str) -> Result<Tag> {
    members::require_chair(pool, actor, "Tag renaming").await?;

    let new_name = new_name.trim();
    if new_name.is_empty() {
        return Err(Error::Validation("Tag name must not be empty".to_string()));
    }

    let result = sqlx::query("UPDATE tags SET name = ? WHERE id = ?")
        .bind(new_name)
        .bind(tag_id.to_string())
        .execute(pool)
        .await;

    match result {
        Ok(done) if done.rows_affected() == 0 => {
            Err(Error::Reference(format!("Tag does not exist: {}", tag_id)))
        }
        Ok(_) => {
            let (created_at,): (i64,) =
                sqlx::query_as("SELECT created_at FROM tags WHERE id = ?")
                    .bind(tag_id.to_string())
                    .fetch_one(pool)
                    .await?;
            info!("Tag renamed: {} -> {}", tag_id, new_name);
            Ok(Tag { id: tag_id, name: new_name.to_string(), created_at })
        }
        Err(e) => Err(map_duplicate(e, new_name)),
    }
}

/// Delete a tag; FK cascade removes its membership everywhere
pub async fn delete_tag(pool: &SqlitePool, actor: Uuid, tag_id: Uuid) -> Result<()> {
    members::require_chair(pool, actor, "Tag deletion").await?;

    let deleted = sqlx::query("DELETE FROM tags WHERE id = ?")
        .bind(tag_id.to_string())
        .execute(pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(Error::Reference(format!("Tag does not exist: {}", tag_id)));
    }
    info!("Tag deleted: {}", tag_id);
    Ok(())
}

/// The tag vocabulary, alphabetical
pub async fn list_tags(pool: &SqlitePool) -> Result<Vec<Tag>> {
    let rows: Vec<(String, String, i64)> =
        sqlx::query_as("SELECT id, name, created_at FROM tags ORDER BY name COLLATE NOCASE")
            .fetch_all(pool)
            .await?;

    rows.into_iter()
        .map(|(id, name, created_at)| {
            Ok(Tag { id: parse_uuid(&id)?, name, created_at })
        })
        .collect()
}

/// Translate a unique-index violation into the duplicate-name conflict
fn map_duplicate(e: sqlx::Error, name: &str) -> Error {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => {
            Error::Conflict(format!("Tag \"{}\" already exists", name))
        }
        _ => Error::Database(e),
    }
}
