//! Shared helpers for the workflow integration tests

#![allow(dead_code)]

use mtc_common::db::init_database;
use mtc_common::db::models::{Difficulty, Role};
use mtc_committee::catalog::members;
use mtc_committee::catalog::submission::{self, CompetencyDraft, QuestionDraft};
use sqlx::SqlitePool;
use std::path::PathBuf;
use uuid::Uuid;

/// Fresh throwaway database for one test
pub async fn setup_db(tag: &str) -> SqlitePool {
    let path = PathBuf::from(format!("/tmp/mtc-test-{}-{}.db", tag, Uuid::new_v4()));
    let _ = std::fs::remove_file(&path);
    init_database(&path).await.expect("database init")
}

/// A seeded roster: one chair and six voting members
pub struct Committee {
    pub chair: Uuid,
    pub members: Vec<Uuid>,
}

pub async fn seed_committee(pool: &SqlitePool) -> Committee {
    let chair = members::add_member(pool, "Chair", Role::Chair)
        .await
        .expect("seed chair");
    let mut voting = Vec::new();
    for n in 1..=6 {
        let id = members::add_member(pool, &format!("Member {}", n), Role::Member)
            .await
            .expect("seed member");
        voting.push(id);
    }
    Committee { chair, members: voting }
}

pub fn competency_draft(name: &str, tag_ids: Vec<Uuid>) -> CompetencyDraft {
    CompetencyDraft {
        name: name.to_string(),
        difficulty: Difficulty::Intermediate,
        tag_ids,
        justification: None,
    }
}

pub fn question_draft(competency_id: Uuid, prompt: &str, correct_index: usize) -> QuestionDraft {
    QuestionDraft {
        competency_id,
        prompt: prompt.to_string(),
        options: vec![
            "Option A".to_string(),
            "Option B".to_string(),
            "Option C".to_string(),
            "Option D".to_string(),
        ],
        correct_index,
    }
}

/// Stage a competency proposal as a regular member
pub async fn stage_competency(pool: &SqlitePool, proposer: Uuid, name: &str) -> Uuid {
    let outcome = submission::submit_competency(pool, proposer, &competency_draft(name, vec![]))
        .await
        .expect("stage competency");
    assert!(outcome.is_staged());
    outcome.id()
}

/// Create a live competency directly through the chair bypass
pub async fn live_competency(pool: &SqlitePool, chair: Uuid, name: &str) -> Uuid {
    let outcome = submission::submit_competency(pool, chair, &competency_draft(name, vec![]))
        .await
        .expect("chair competency");
    assert!(!outcome.is_staged());
    outcome.id()
}

pub async fn count(pool: &SqlitePool, sql: &str) -> i64 {
    sqlx::query_scalar(sql).fetch_one(pool).await.expect("count query")
}
