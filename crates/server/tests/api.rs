//! End-to-end API tests over the in-process router.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use db::DBService;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use server::{AppState, app, auth::USER_ID_HEADER};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

async fn test_app() -> (Router, TempDir) {
    let dir = TempDir::new().expect("tempdir");
    let url = format!("sqlite://{}/test.db", dir.path().display());
    let db = DBService::new(&url).await.expect("open test database");
    (app(AppState::new(db)), dir)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.expect("send request");
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn authed(method: &str, uri: &str, user_id: Uuid, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(USER_ID_HEADER, user_id.to_string());
    match body {
        Some(value) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn requests_without_a_user_id_are_unauthorized() {
    let (router, _dir) = test_app().await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/habits")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&router, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn health_needs_no_authentication() {
    let (router, _dir) = test_app().await;
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!("ok"));
}

#[tokio::test]
async fn habit_lifecycle_create_complete_duplicate_delete() {
    let (router, _dir) = test_app().await;
    let user_id = Uuid::new_v4();

    // Create.
    let (status, body) = send(
        &router,
        authed(
            "POST",
            "/api/habits",
            user_id,
            Some(json!({"name": "morning run", "frequency": "daily"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    let habit_id = body["data"]["id"].as_str().unwrap().to_string();

    // Mark complete for today.
    let uri = format!("/api/habits/{habit_id}/completions");
    let (status, body) = send(&router, authed("POST", &uri, user_id, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["habit_id"].as_str().unwrap(), habit_id);

    // Same day again: the ledger refuses.
    let (status, body) = send(&router, authed("POST", &uri, user_id, None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], json!(false));

    // The listing reflects the completion.
    let (status, body) = send(&router, authed("GET", "/api/habits", user_id, None)).await;
    assert_eq!(status, StatusCode::OK);
    let habits = body["data"].as_array().unwrap();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0]["progress"]["completed_current_period"], json!(true));
    assert_eq!(habits[0]["progress"]["streak"], json!(1));
    assert_eq!(habits[0]["progress"]["completion_rate"], json!(100));

    // Progress endpoint agrees.
    let uri = format!("/api/habits/{habit_id}/progress");
    let (status, body) = send(&router, authed("GET", &uri, user_id, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["streak"], json!(1));

    // Cascade delete, then the ledger is gone with the habit.
    let uri = format!("/api/habits/{habit_id}");
    let (status, _) = send(&router, authed("DELETE", &uri, user_id, None)).await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/api/habits/{habit_id}/completions");
    let (status, _) = send(&router, authed("GET", &uri, user_id, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn other_users_cannot_see_or_complete_a_habit() {
    let (router, _dir) = test_app().await;
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();

    let (_, body) = send(
        &router,
        authed(
            "POST",
            "/api/habits",
            owner,
            Some(json!({"name": "journal", "frequency": "weekly"})),
        ),
    )
    .await;
    let habit_id = body["data"]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/habits/{habit_id}");
    let (status, _) = send(&router, authed("GET", &uri, stranger, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/habits/{habit_id}/completions");
    let (status, _) = send(&router, authed("POST", &uri, stranger, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_active_names_conflict_and_validation_fails_fast() {
    let (router, _dir) = test_app().await;
    let user_id = Uuid::new_v4();

    let payload = json!({"name": "stretch", "frequency": "daily"});
    let (status, _) = send(
        &router,
        authed("POST", "/api/habits", user_id, Some(payload.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &router,
        authed("POST", "/api/habits", user_id, Some(payload)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &router,
        authed(
            "POST",
            "/api/habits",
            user_id,
            Some(json!({"name": "   ", "frequency": "daily"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}
