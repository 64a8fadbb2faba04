//! Router-level tests: JSON contracts and error-to-status mapping

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::*;
use mtc_committee::{build_router, AppState};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`
use uuid::Uuid;

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.expect("read body");
    serde_json::from_slice(&bytes).expect("parse JSON")
}

#[tokio::test]
async fn health_endpoint_responds() {
    let pool = setup_db("api-health").await;
    let app = build_router(AppState::new(pool));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["module"], "committee");
}

#[tokio::test]
async fn member_competency_submission_is_staged() {
    let pool = setup_db("api-submit").await;
    let committee = seed_committee(&pool).await;
    let app = build_router(AppState::new(pool));

    let response = app
        .oneshot(json_request(
            "POST",
            "/competencies",
            json!({
                "member_id": committee.members[0],
                "name": "Stent apposition",
                "difficulty": "Expert",
                "tag_ids": [],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["staged"], true);
    assert!(body["id"].as_str().is_some());
}

#[tokio::test]
async fn question_boundary_index_is_one_based() {
    let pool = setup_db("api-question-index").await;
    let committee = seed_committee(&pool).await;
    let target = live_competency(&pool, committee.chair, "Target").await;
    let app = build_router(AppState::new(pool.clone()));

    // correct_index 3 on the wire selects option C
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/questions",
            json!({
                "member_id": committee.members[0],
                "competency_id": target,
                "prompt": "Which option?",
                "options": [
                    {"body": "A"}, {"body": "B"}, {"body": "C"}, {"body": "D"}
                ],
                "correct_index": 3,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let review = app
        .oneshot(Request::builder().uri("/review/questions").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = extract_json(review.into_body()).await;
    let options = body[0]["options"].as_array().unwrap();
    let correct: Vec<bool> = options.iter().map(|o| o["is_correct"].as_bool().unwrap()).collect();
    assert_eq!(correct, vec![false, false, true, false]);

    // Index 0 is out of the 1-based range
    let app = build_router(AppState::new(pool));
    let response = app
        .oneshot(json_request(
            "POST",
            "/questions",
            json!({
                "member_id": committee.members[0],
                "competency_id": target,
                "prompt": "Which option?",
                "options": [
                    {"body": "A"}, {"body": "B"}, {"body": "C"}, {"body": "D"}
                ],
                "correct_index": 0,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ballot_on_unknown_subject_is_404() {
    let pool = setup_db("api-ballot-404").await;
    let committee = seed_committee(&pool).await;
    let app = build_router(AppState::new(pool));

    let response = app
        .oneshot(json_request(
            "POST",
            "/ballots",
            json!({
                "member_id": committee.members[0],
                "subject_id": Uuid::new_v4(),
                "vote": true,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ballot_response_carries_merge_result() {
    let pool = setup_db("api-ballot-merge").await;
    let committee = seed_committee(&pool).await;
    let subject = stage_competency(&pool, committee.members[0], "Proposal").await;
    let app = build_router(AppState::new(pool));

    for voter in &committee.members[1..4] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/ballots",
                json!({"member_id": voter, "subject_id": subject, "vote": true}),
            ))
            .await
            .unwrap();
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["accepted"], true);
        assert_eq!(body["merged"], false);
    }

    // Fourth for-vote crosses quorum; the voter sees the live id
    let response = app
        .oneshot(json_request(
            "POST",
            "/ballots",
            json!({"member_id": committee.members[4], "subject_id": subject, "vote": true}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["accepted"], true);
    assert_eq!(body["merged"], true);
    assert!(body["live_id"].as_str().is_some());
}

#[tokio::test]
async fn chair_only_endpoints_reject_members() {
    let pool = setup_db("api-forbidden").await;
    let committee = seed_committee(&pool).await;
    let app = build_router(AppState::new(pool));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/tags",
            json!({"member_id": committee.members[0], "name": "IVUS"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(json_request(
            "POST",
            "/competencies/reorder",
            json!({"member_id": committee.members[0], "ordered_ids": []}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn duplicate_tag_is_409() {
    let pool = setup_db("api-tag-conflict").await;
    let committee = seed_committee(&pool).await;
    let app = build_router(AppState::new(pool));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/tags",
            json!({"member_id": committee.chair, "name": "IVUS"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(json_request(
            "POST",
            "/tags",
            json!({"member_id": committee.chair, "name": "ivus"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn media_request_requires_exactly_one_parent() {
    let pool = setup_db("api-media-xor").await;
    let committee = seed_committee(&pool).await;
    let app = build_router(AppState::new(pool));

    // Neither parent
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/media/request",
            json!({
                "member_id": committee.members[0],
                "file_name": "frame.png",
                "mime_type": "image/png",
                "size_bytes": 1024,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Both parents
    let response = app
        .oneshot(json_request(
            "POST",
            "/media/request",
            json!({
                "member_id": committee.members[0],
                "file_name": "frame.png",
                "mime_type": "image/png",
                "size_bytes": 1024,
                "stage_id": Uuid::new_v4(),
                "question_id": Uuid::new_v4(),
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn review_queue_includes_my_vote() {
    let pool = setup_db("api-review").await;
    let committee = seed_committee(&pool).await;
    let subject = stage_competency(&pool, committee.members[0], "Proposal").await;
    mtc_committee::catalog::ballots::cast_ballot(&pool, subject, committee.members[1], true)
        .await
        .unwrap();
    let app = build_router(AppState::new(pool));

    let uri = format!("/review/competencies?voter_id={}", committee.members[1]);
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body[0]["my_vote"], true);
    assert_eq!(body[0]["tally"]["for_count"], 1);
    assert_eq!(body[0]["tally"]["total"], 1);
}
