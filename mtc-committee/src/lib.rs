//! mtc-committee library - Committee consensus workflow service
//!
//! Proposal submission, ballot tallying, exactly-once merge into the live
//! catalog, chair-only tag and ordering management, and the media
//! attachment metadata protocol, exposed over an axum JSON API.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;

pub mod api;
pub mod catalog;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, post, put};

    Router::new()
        // Health endpoint
        .route("/health", get(api::health::health))
        // Proposal submission
        .route("/competencies", post(api::proposals::submit_competency))
        .route("/questions", post(api::proposals::submit_question))
        // Voting
        .route("/ballots", post(api::ballots::cast_ballot))
        // Review queue
        .route("/review/competencies", get(api::review::pending_competencies))
        .route("/review/questions", get(api::review::pending_questions))
        // Live catalog + ordering
        .route("/competencies", get(api::ordering::list_competencies))
        .route("/competencies/reorder", post(api::ordering::reorder))
        // Tag catalog
        .route("/tags", get(api::tags::list_tags))
        .route("/tags", post(api::tags::create_tag))
        .route("/tags/:id", put(api::tags::rename_tag))
        .route("/tags/:id", delete(api::tags::delete_tag))
        // Roster
        .route("/members", get(api::members::list_members))
        // Media attachment metadata
        .route("/media/request", post(api::media::request_upload))
        .route("/media/confirm", post(api::media::confirm_upload))
        .with_state(state)
        // Enable CORS for local dashboard access
        .layer(CorsLayer::permissive())
}
