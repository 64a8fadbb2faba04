//! Database models

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Difficulty grade of a competency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Expert,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Expert => "Expert",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "Beginner" => Ok(Difficulty::Beginner),
            "Intermediate" => Ok(Difficulty::Intermediate),
            "Expert" => Ok(Difficulty::Expert),
            other => Err(Error::Validation(format!("Unknown difficulty: {}", other))),
        }
    }
}

/// Committee role of a member
///
/// Chairs may create live entities directly, manage tags, and reorder the
/// catalog; members go through the staging/voting pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Chair,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Chair => "chair",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "member" => Ok(Role::Member),
            "chair" => Ok(Role::Chair),
            other => Err(Error::Internal(format!("Unknown role in roster: {}", other))),
        }
    }

    pub fn is_chair(&self) -> bool {
        matches!(self, Role::Chair)
    }
}

/// Kind of a staged proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalKind {
    Competency,
    Question,
}

impl ProposalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalKind::Competency => "competency",
            ProposalKind::Question => "question",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub display_name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub created_at: i64,
}

/// Live competency; `position` defines the catalog display order and is
/// contiguous 1..N across the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competency {
    pub id: Uuid,
    pub name: String,
    pub difficulty: Difficulty,
    pub tag_ids: Vec<Uuid>,
    pub position: i64,
    pub created_at: i64,
}

/// Proposed competency awaiting committee consensus; carries no position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagedCompetency {
    pub id: Uuid,
    pub name: String,
    pub difficulty: Difficulty,
    pub tag_ids: Vec<Uuid>,
    pub justification: Option<String>,
    pub proposer_id: Uuid,
    pub created_at: i64,
}

/// One of the four answer options of a question
///
/// `ord` is 0-based and significant; the display label A-D derives from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOption {
    pub ord: i64,
    pub body: String,
    pub is_correct: bool,
}

impl QuestionOption {
    /// Positional display label (A, B, C, D)
    pub fn label(&self) -> char {
        (b'A' + self.ord as u8) as char
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub competency_id: Uuid,
    pub prompt: String,
    pub options: Vec<QuestionOption>,
    pub created_at: i64,
}

/// Proposed question; `competency_id` targets an already-live competency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagedQuestion {
    pub id: Uuid,
    pub competency_id: Uuid,
    pub prompt: String,
    pub options: Vec<QuestionOption>,
    pub proposer_id: Uuid,
    pub created_at: i64,
}

/// Current for/against counts of a staged proposal
///
/// A pure function of the one-ballot-per-voter rows, not of call history.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Tally {
    pub for_count: i64,
    pub against_count: i64,
}

impl Tally {
    pub fn total(&self) -> i64 {
        self.for_count + self.against_count
    }

    /// Approval ratio; 0.0 when no ballots have been cast
    pub fn approval(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.for_count as f64 / total as f64
        }
    }
}

/// Metadata row for an uploaded media file
///
/// Owned by a staged question XOR a live question; ownership moves to the
/// live question when its parent proposal merges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub id: Uuid,
    pub stage_id: Option<Uuid>,
    pub question_id: Option<Uuid>,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub storage_path: String,
    pub created_at: i64,
}
