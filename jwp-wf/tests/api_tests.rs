//! Integration tests for jwp-wf API endpoints
//!
//! Drive the axum router directly with tower's oneshot against an
//! in-memory database: no sockets, no background dispatcher.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use jwp_common::db::models::{encode_string_list, EditorProfile, ReviewerProfile, User};
use jwp_common::events::EventBus;
use jwp_wf::{build_router, db, AppState};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot`
use uuid::Uuid;

async fn setup_app() -> (axum::Router, SqlitePool) {
    let pool = jwp_common::db::init_test_database()
        .await
        .expect("Should create in-memory database");
    let state = AppState::new(pool.clone(), EventBus::new(64));
    (build_router(state), pool)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn seed_author(pool: &SqlitePool) -> Uuid {
    let user = User {
        guid: Uuid::new_v4(),
        name: "A. Author".to_string(),
        email: "author@example.edu".to_string(),
        affiliation: Some("Example University".to_string()),
        role: "author".to_string(),
    };
    db::users::insert_user(pool, &user).await.unwrap();
    user.guid
}

async fn seed_reviewer(pool: &SqlitePool, email: &str, keywords: &[&str]) -> Uuid {
    let user = User {
        guid: Uuid::new_v4(),
        name: email.to_string(),
        email: email.to_string(),
        affiliation: None,
        role: "reviewer".to_string(),
    };
    db::users::insert_user(pool, &user).await.unwrap();
    let profile = ReviewerProfile {
        user_id: user.guid,
        keywords: encode_string_list(&keywords.iter().map(|s| s.to_string()).collect::<Vec<_>>()),
        current_load: 0,
        max_per_month: 3,
        quality_score: 0.5,
        completed_count: 0,
        late_count: 0,
        last_review_at: None,
    };
    db::profiles::insert_reviewer_profile(pool, &profile)
        .await
        .unwrap();
    user.guid
}

async fn seed_editor(pool: &SqlitePool, email: &str, sections: &[&str]) -> Uuid {
    let user = User {
        guid: Uuid::new_v4(),
        name: email.to_string(),
        email: email.to_string(),
        affiliation: None,
        role: "editor".to_string(),
    };
    db::users::insert_user(pool, &user).await.unwrap();
    let profile = EditorProfile {
        user_id: user.guid,
        sections: encode_string_list(&sections.iter().map(|s| s.to_string()).collect::<Vec<_>>()),
        current_load: 0,
        accepting: true,
    };
    db::profiles::insert_editor_profile(pool, &profile)
        .await
        .unwrap();
    user.guid
}

fn submission_body(author_id: Uuid) -> Value {
    json!({
        "title": "Reviewer matching under workload constraints",
        "abstract": "We evaluate multi-factor reviewer scoring.",
        "keywords": ["machine learning", "peer review"],
        "category": "computer science",
        "author_id": author_id,
        "authors": [{
            "name": "A. Author",
            "email": "author@example.edu",
            "institution": "Example University",
            "is_corresponding": true
        }]
    })
}

/// Submit through the API and return the new article id
async fn submit_article(app: &axum::Router, author_id: Uuid) -> Uuid {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/workflow/submit",
            submission_body(author_id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    body["article_id"].as_str().unwrap().parse().unwrap()
}

/// Move an article to under_review through the status endpoint
async fn walk_to_under_review(app: &axum::Router, article_id: Uuid) {
    for status in ["technical_check", "under_review"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/api/manuscripts/{}/status", article_id),
                json!({ "status": status }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _pool) = setup_app().await;

    let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "jwp-wf");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_submit_rejects_short_title() {
    let (app, pool) = setup_app().await;
    let author_id = seed_author(&pool).await;

    let mut body = submission_body(author_id);
    body["title"] = json!("Title");

    let response = app
        .oneshot(json_request("POST", "/api/workflow/submit", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("at least 10 characters"));
}

#[tokio::test]
async fn test_submit_rejects_two_corresponding_authors() {
    let (app, pool) = setup_app().await;
    let author_id = seed_author(&pool).await;

    let mut body = submission_body(author_id);
    body["authors"] = json!([
        {
            "name": "A. Author",
            "email": "author@example.edu",
            "institution": "Example University",
            "is_corresponding": true
        },
        {
            "name": "B. Author",
            "email": "b@example.edu",
            "institution": "Example University",
            "is_corresponding": true
        }
    ]);

    let response = app
        .oneshot(json_request("POST", "/api/workflow/submit", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_submit_and_history() {
    let (app, pool) = setup_app().await;
    let author_id = seed_author(&pool).await;
    let article_id = submit_article(&app, author_id).await;

    let response = app
        .oneshot(empty_request(
            "GET",
            &format!("/api/manuscripts/{}/history", article_id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["current_status"], "submitted");
    let history = body["history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["status"], "submitted");
    assert_eq!(history[0]["note"], "Initial submission");
}

#[tokio::test]
async fn test_invalid_transition_returns_conflict() {
    let (app, pool) = setup_app().await;
    let author_id = seed_author(&pool).await;
    let article_id = submit_article(&app, author_id).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/manuscripts/{}/status", article_id),
            json!({ "status": "published" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "CONFLICT");

    // Persisted status unchanged
    let response = app
        .oneshot(empty_request(
            "GET",
            &format!("/api/manuscripts/{}/history", article_id),
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["current_status"], "submitted");
}

#[tokio::test]
async fn test_unknown_article_returns_not_found() {
    let (app, _pool) = setup_app().await;

    let response = app
        .oneshot(empty_request(
            "GET",
            &format!("/api/manuscripts/{}/reviews", Uuid::new_v4()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_full_review_cycle_over_api() {
    let (app, pool) = setup_app().await;
    let author_id = seed_author(&pool).await;
    seed_editor(&pool, "editor@journal.org", &["general"]).await;
    seed_reviewer(&pool, "r1@example.edu", &["machine learning"]).await;
    seed_reviewer(&pool, "r2@example.edu", &["peer review"]).await;

    let article_id = submit_article(&app, author_id).await;
    walk_to_under_review(&app, article_id).await;

    // Assign reviewers
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/manuscripts/{}/assign-reviewers", article_id),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = extract_json(response.into_body()).await;
    assert_eq!(report["success"], true);
    assert_eq!(report["selected"].as_array().unwrap().len(), 2);

    // Fetch the created reviews
    let response = app
        .clone()
        .oneshot(empty_request(
            "GET",
            &format!("/api/manuscripts/{}/reviews", article_id),
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let reviews: Vec<(String, String)> = body["reviews"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| {
            (
                r["guid"].as_str().unwrap().to_string(),
                r["reviewer_id"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(reviews.len(), 2);

    // Both reviewers accept; the second submission completes the set
    let mut last = Value::Null;
    for (review_id, reviewer_id) in &reviews {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/reviews/{}/submit", review_id),
                json!({
                    "reviewer_id": reviewer_id,
                    "recommendation": "accept",
                    "rating": 4.5
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        last = extract_json(response.into_body()).await;
    }
    assert_eq!(last["decision"], "accepted");

    // History reflects the aggregate decision
    let response = app
        .oneshot(empty_request(
            "GET",
            &format!("/api/manuscripts/{}/history", article_id),
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["current_status"], "accepted");
    let history = body["history"].as_array().unwrap();
    assert_eq!(history.last().unwrap()["status"], "accepted");
}

#[tokio::test]
async fn test_editor_decision_endpoint() {
    let (app, pool) = setup_app().await;
    let author_id = seed_author(&pool).await;
    let article_id = submit_article(&app, author_id).await;
    walk_to_under_review(&app, article_id).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/manuscripts/{}/decision", article_id),
            json!({ "decision": "major_revision" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["old_status"], "under_review");
    assert_eq!(body["new_status"], "revision_requested");
}

#[tokio::test]
async fn test_assign_editor_conflicts_when_already_assigned() {
    let (app, pool) = setup_app().await;
    let author_id = seed_author(&pool).await;
    seed_editor(&pool, "editor@journal.org", &["general"]).await;

    // Auto-assignment at submission already set the editor
    let article_id = submit_article(&app, author_id).await;

    let response = app
        .oneshot(empty_request(
            "POST",
            &format!("/api/manuscripts/{}/assign-editor", article_id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_maintenance_sweeps_return_counts() {
    let (app, _pool) = setup_app().await;

    let response = app
        .clone()
        .oneshot(empty_request(
            "POST",
            "/api/maintenance/reviews/sweep-overdue",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["marked_overdue"], 0);

    let response = app
        .oneshot(empty_request(
            "POST",
            "/api/maintenance/assignments/expire",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["expired"], 0);
}
