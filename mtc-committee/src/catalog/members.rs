//! Committee roster lookups
//!
//! Authentication and sessions live outside this service; callers arrive
//! as bare member ids and the roster is the authority for their role.

use mtc_common::db::models::{Member, Role};
use mtc_common::{Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Resolve a member's committee role
pub async fn role_of(pool: &SqlitePool, member_id: Uuid) -> Result<Role> {
    let row: Option<(String,)> = sqlx::query_as("SELECT role FROM members WHERE id = ?")
        .bind(member_id.to_string())
        .fetch_optional(pool)
        .await?;

    match row {
        Some((role,)) => Role::parse(&role),
        None => Err(Error::Reference(format!(
            "Unknown committee member: {}",
            member_id
        ))),
    }
}

/// Require chair privilege for an operation
pub async fn require_chair(pool: &SqlitePool, member_id: Uuid, operation: &str) -> Result<()> {
    if role_of(pool, member_id).await?.is_chair() {
        Ok(())
    } else {
        Err(Error::Forbidden(format!("{} requires the chair role", operation)))
    }
}

/// Add a member to the roster
pub async fn add_member(
    pool: &SqlitePool,
    display_name: &str,
    role: Role,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO members (id, display_name, role) VALUES (?, ?, ?)")
        .bind(id.to_string())
        .bind(display_name)
        .bind(role.as_str())
        .execute(pool)
        .await?;
    Ok(id)
}

/// List the roster
pub async fn list_members(pool: &SqlitePool) -> Result<Vec<Member>> {
    let rows: Vec<(String, String, String)> =
        sqlx::query_as("SELECT id, display_name, role FROM members ORDER BY display_name")
            .fetch_all(pool)
            .await?;

    rows.into_iter()
        .map(|(id, display_name, role)| {
            Ok(Member {
                id: parse_uuid(&id)?,
                display_name,
                role: Role::parse(&role)?,
            })
        })
        .collect()
}

/// Parse a UUID stored as TEXT, mapping corruption to an internal error
pub(crate) fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|_| Error::Internal(format!("Malformed UUID in database: {}", s)))
}
