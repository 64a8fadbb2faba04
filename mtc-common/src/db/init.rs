//! Database initialization
//!
//! Creates the catalog schema on first run and opens it idempotently
//! thereafter. All tables use `CREATE TABLE IF NOT EXISTS`, so calling
//! [`init_database`] against an existing file is safe.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enforce referential integrity; stage links and option rows rely on
    // FK cascades when a proposal is deleted.
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL allows concurrent readers while ballots and merges write
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    // Concurrent merge attempts on the same subject queue behind the write
    // lock rather than failing immediately
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_members_table(&pool).await?;
    create_tags_table(&pool).await?;
    create_competencies_table(&pool).await?;
    create_competency_tags_table(&pool).await?;
    create_competencies_stage_table(&pool).await?;
    create_competency_stage_tags_table(&pool).await?;
    create_questions_table(&pool).await?;
    create_question_options_table(&pool).await?;
    create_questions_stage_table(&pool).await?;
    create_question_stage_options_table(&pool).await?;
    create_ballots_table(&pool).await?;
    create_proposal_outcomes_table(&pool).await?;
    create_question_media_table(&pool).await?;

    Ok(pool)
}

/// Committee roster; role gates the chair-only paths
async fn create_members_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS members (
            id TEXT PRIMARY KEY,
            display_name TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'member'
                CHECK (role IN ('member', 'chair'))
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Tag vocabulary; names unique case-insensitively
async fn create_tags_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS tags (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_tags_name_nocase
         ON tags (name COLLATE NOCASE)",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Live competencies; position is contiguous 1..N and unique
async fn create_competencies_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS competencies (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            difficulty TEXT NOT NULL
                CHECK (difficulty IN ('Beginner', 'Intermediate', 'Expert')),
            position INTEGER NOT NULL UNIQUE,
            created_at INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_competency_tags_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS competency_tags (
            competency_id TEXT NOT NULL
                REFERENCES competencies(id) ON DELETE CASCADE,
            tag_id TEXT NOT NULL
                REFERENCES tags(id) ON DELETE CASCADE,
            PRIMARY KEY (competency_id, tag_id)
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Staged competency proposals; no position until merged
async fn create_competencies_stage_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS competencies_stage (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            difficulty TEXT NOT NULL
                CHECK (difficulty IN ('Beginner', 'Intermediate', 'Expert')),
            justification TEXT,
            proposer_id TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_competency_stage_tags_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS competency_stage_tags (
            stage_id TEXT NOT NULL
                REFERENCES competencies_stage(id) ON DELETE CASCADE,
            tag_id TEXT NOT NULL
                REFERENCES tags(id) ON DELETE CASCADE,
            PRIMARY KEY (stage_id, tag_id)
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_questions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS questions (
            id TEXT PRIMARY KEY,
            competency_id TEXT NOT NULL REFERENCES competencies(id),
            prompt TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Answer options; exactly 4 per question, ord 0..=3, order significant
async fn create_question_options_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS question_options (
            question_id TEXT NOT NULL
                REFERENCES questions(id) ON DELETE CASCADE,
            ord INTEGER NOT NULL CHECK (ord BETWEEN 0 AND 3),
            body TEXT NOT NULL,
            is_correct INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (question_id, ord)
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Staged question proposals; the target competency is already live
async fn create_questions_stage_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS questions_stage (
            id TEXT PRIMARY KEY,
            competency_id TEXT NOT NULL REFERENCES competencies(id),
            prompt TEXT NOT NULL,
            proposer_id TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_question_stage_options_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS question_stage_options (
            stage_id TEXT NOT NULL
                REFERENCES questions_stage(id) ON DELETE CASCADE,
            ord INTEGER NOT NULL CHECK (ord BETWEEN 0 AND 3),
            body TEXT NOT NULL,
            is_correct INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (stage_id, ord)
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// One ballot per (subject, voter); re-voting is an UPDATE, never an INSERT
async fn create_ballots_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS ballots (
            subject_id TEXT NOT NULL,
            voter_id TEXT NOT NULL,
            vote INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            PRIMARY KEY (subject_id, voter_id)
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Explicit merged terminal state per proposal
///
/// Written in the same transaction that promotes the staged row, so a
/// vanished staged id can be distinguished from one that never existed.
async fn create_proposal_outcomes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS proposal_outcomes (
            stage_id TEXT PRIMARY KEY,
            kind TEXT NOT NULL CHECK (kind IN ('competency', 'question')),
            live_id TEXT NOT NULL,
            merged_at INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Media attachment metadata; owned by a staged XOR a live question
async fn create_question_media_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS question_media (
            id TEXT PRIMARY KEY,
            stage_id TEXT,
            question_id TEXT,
            file_name TEXT NOT NULL,
            mime_type TEXT NOT NULL,
            size_bytes INTEGER NOT NULL,
            storage_path TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            CHECK ((stage_id IS NULL) != (question_id IS NULL))
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}
