//! Media attachment metadata
//!
//! The two-phase upload protocol: the caller requests a grant (validated
//! here), transfers the raw bytes directly to storage out-of-band, then
//! confirms the upload to persist the metadata row. Signed-URL issuance
//! and the byte transfer itself are external collaborators; this module
//! owns validation and the `question_media` rows. Ownership moves from a
//! staged question to its live counterpart inside the merge transaction.

use crate::catalog::members::parse_uuid;
use mtc_common::db::models::MediaAttachment;
use mtc_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

/// MIME types accepted for question media
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
    "video/mp4",
    "video/webm",
];

/// Upload size ceiling (50 MB)
pub const MAX_SIZE_BYTES: i64 = 50 * 1024 * 1024;

/// Owner of an attachment: a staged question XOR a live question
///
/// The enum makes "never both, never neither" unrepresentable; the HTTP
/// boundary converts the optional-field pair into this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaParent {
    Stage(Uuid),
    Question(Uuid),
}

impl MediaParent {
    pub fn id(&self) -> Uuid {
        match self {
            MediaParent::Stage(id) | MediaParent::Question(id) => *id,
        }
    }
}

/// Validated upload descriptor
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub parent: MediaParent,
}

/// Grant handed back to the caller for the out-of-band byte transfer
#[derive(Debug, Clone)]
pub struct UploadGrant {
    pub file_id: Uuid,
    pub storage_path: String,
}

/// Validate an upload and issue a storage grant
pub async fn request_upload(pool: &SqlitePool, req: &UploadRequest) -> Result<UploadGrant> {
    validate_upload(req)?;
    ensure_parent_exists(pool, &req.parent).await?;

    let file_id = Uuid::new_v4();
    Ok(UploadGrant {
        storage_path: storage_path(&req.parent, file_id, &req.file_name),
        file_id,
    })
}

/// Persist the metadata row after the bytes have been transferred
pub async fn confirm_upload(
    pool: &SqlitePool,
    req: &UploadRequest,
    file_id: Uuid,
    storage_path: &str,
) -> Result<Uuid> {
    validate_upload(req)?;
    ensure_parent_exists(pool, &req.parent).await?;

    let (stage_id, question_id) = match req.parent {
        MediaParent::Stage(id) => (Some(id.to_string()), None),
        MediaParent::Question(id) => (None, Some(id.to_string())),
    };

    sqlx::query(
        "INSERT INTO question_media
            (id, stage_id, question_id, file_name, mime_type, size_bytes, storage_path, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(file_id.to_string())
    .bind(stage_id)
    .bind(question_id)
    .bind(&req.file_name)
    .bind(&req.mime_type)
    .bind(req.size_bytes)
    .bind(storage_path)
    .bind(chrono::Utc::now().timestamp())
    .execute(pool)
    .await?;

    info!("Media attachment {} confirmed for {:?}", file_id, req.parent);
    Ok(file_id)
}

/// Attachments currently owned by a parent
pub async fn attachments_for(pool: &SqlitePool, parent: &MediaParent) -> Result<Vec<MediaAttachment>> {
    let (column, id) = match parent {
        MediaParent::Stage(id) => ("stage_id", id),
        MediaParent::Question(id) => ("question_id", id),
    };
    let sql = format!(
        "SELECT id, stage_id, question_id, file_name, mime_type, size_bytes, storage_path, created_at
         FROM question_media WHERE {} = ? ORDER BY created_at, id",
        column
    );

    let rows: Vec<(String, Option<String>, Option<String>, String, String, i64, String, i64)> =
        sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_all(pool)
            .await?;

    rows.into_iter()
        .map(
            |(id, stage_id, question_id, file_name, mime_type, size_bytes, storage_path, created_at)| {
                Ok(MediaAttachment {
                    id: parse_uuid(&id)?,
                    stage_id: stage_id.as_deref().map(parse_uuid).transpose()?,
                    question_id: question_id.as_deref().map(parse_uuid).transpose()?,
                    file_name,
                    mime_type,
                    size_bytes,
                    storage_path,
                    created_at,
                })
            },
        )
        .collect()
}

fn validate_upload(req: &UploadRequest) -> Result<()> {
    if req.file_name.trim().is_empty() {
        return Err(Error::Validation("File name must not be empty".to_string()));
    }
    if !ALLOWED_MIME_TYPES.contains(&req.mime_type.as_str()) {
        return Err(Error::Validation(format!("File type not allowed: {}", req.mime_type)));
    }
    if req.size_bytes <= 0 {
        return Err(Error::Validation("File size must be positive".to_string()));
    }
    if req.size_bytes > MAX_SIZE_BYTES {
        return Err(Error::Validation("File exceeds 50MB limit".to_string()));
    }
    Ok(())
}

async fn ensure_parent_exists(pool: &SqlitePool, parent: &MediaParent) -> Result<()> {
    let (sql, id) = match parent {
        MediaParent::Stage(id) => {
            ("SELECT EXISTS (SELECT 1 FROM questions_stage WHERE id = ?)", id)
        }
        MediaParent::Question(id) => ("SELECT EXISTS (SELECT 1 FROM questions WHERE id = ?)", id),
    };
    let exists: bool = sqlx::query_scalar(sql)
        .bind(id.to_string())
        .fetch_one(pool)
        .await?;
    if exists {
        Ok(())
    } else {
        Err(Error::Reference(format!("Upload parent does not exist: {}", id)))
    }
}

/// Scoped storage path: parent id as folder keeps attachments separated
fn storage_path(parent: &MediaParent, file_id: Uuid, file_name: &str) -> String {
    let ext = file_name.rsplit('.').next().filter(|e| !e.is_empty() && *e != file_name);
    match ext {
        Some(ext) => format!("questions/{}/{}.{}", parent.id(), file_id, ext),
        None => format!("questions/{}/{}", parent.id(), file_id),
    }
}
