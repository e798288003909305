use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use hirevantage_backend::{
    database::memory_store::MemoryStore, middleware::auth::encode_session, routes,
    services::notification_service::TracingNotifier, AppState,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

const SECRET: &str = "test_secret_key";

fn app() -> Router {
    let state = AppState::with_store(
        Arc::new(MemoryStore::new()),
        Arc::new(TracingNotifier),
        SECRET,
    );
    routes::router(state, 1000)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create(app: &Router, token: Option<&str>, title: &str) -> JsonValue {
    let (status, body) = send(
        app,
        "POST",
        "/api/requirements",
        token,
        Some(json!({
            "title": title,
            "description": "Own the scheduling service",
            "skills": ["Rust", " Rust ", "SQL"],
            "number_of_positions": 2,
            "years_of_experience": 4,
            "price_per_interview": "120.50",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

#[tokio::test]
async fn bearer_token_sets_raised_by() {
    let app = app();
    let token = encode_session("org-42", Some("organization"), SECRET, 3600).unwrap();

    let body = create(&app, Some(&token), "Platform Engineer").await;

    assert_eq!(body["raised_by"], "org-42");
    assert_eq!(body["status"], "Pending");
    assert_eq!(body["skills"], json!(["Rust", "SQL"]));
}

#[tokio::test]
async fn anonymous_requirement_has_empty_raiser() {
    let app = app();

    let body = create(&app, None, "Data Engineer").await;

    assert_eq!(body["raised_by"], "");
}

#[tokio::test]
async fn token_signed_with_other_secret_is_unauthorized() {
    let app = app();
    let token = encode_session("org-42", None, "another_secret", 3600).unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/requirements",
        Some(&token),
        Some(json!({ "title": "Platform Engineer" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn empty_title_is_rejected() {
    let app = app();

    let (status, _) = send(
        &app,
        "POST",
        "/api/requirements",
        None,
        Some(json!({ "title": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn whitespace_title_is_rejected_on_create_and_update() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/requirements",
        None,
        Some(json!({ "title": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let id = create(&app, None, "Analyst").await["id"]
        .as_str()
        .unwrap()
        .to_string();
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/requirements/{}", id),
        None,
        Some(json!({ "title": " \t " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, unchanged) = send(&app, "GET", &format!("/api/requirements/{}", id), None, None).await;
    assert_eq!(unchanged["title"], "Analyst");
}

#[tokio::test]
async fn close_requires_approval_first() {
    let app = app();
    let id = create(&app, None, "SRE").await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/requirements/{}/close", id),
        None,
        Some(json!({ "status": "fulfilled" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/requirements/{}/status", id),
        None,
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Approved");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/requirements/{}/close", id),
        None,
        Some(json!({ "status": "hold" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/requirements/{}/close", id),
        None,
        Some(json!({ "status": "fulfilled" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Fulfilled");
}

#[tokio::test]
async fn partial_update_keeps_other_fields() {
    let app = app();
    let id = create(&app, None, "Backend Engineer").await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/requirements/{}", id),
        None,
        Some(json!({ "number_of_positions": 5 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["number_of_positions"], 5);
    assert_eq!(body["title"], "Backend Engineer");
    assert_eq!(body["years_of_experience"], 4);
}

#[tokio::test]
async fn list_filters_by_status() {
    let app = app();
    let first = create(&app, None, "First").await["id"]
        .as_str()
        .unwrap()
        .to_string();
    create(&app, None, "Second").await;
    send(
        &app,
        "POST",
        &format!("/api/requirements/{}/status", first),
        None,
        Some(json!({ "status": "approved" })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/requirements?status=approved", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], "First");

    let (_, all) = send(&app, "GET", "/api/requirements", None, None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn requirement_dashboard_reports_candidate_funnel() {
    let app = app();
    let id = create(&app, None, "Frontend Engineer").await["id"]
        .as_str()
        .unwrap()
        .to_string();
    let (status, body) = send(
        &app,
        "POST",
        "/api/candidates/bulk",
        None,
        Some(json!({
            "candidates": [
                { "full_name": "Ada", "email": "ada@example.com", "requirement_id": id },
                { "full_name": "Alan", "email": "alan@example.com", "requirement_id": id },
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["created"], 2);

    let (status, candidates) = send(
        &app,
        "GET",
        &format!("/api/requirements/{}/candidates", id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(candidates.as_array().unwrap().len(), 2);

    let (status, summary) = send(
        &app,
        "GET",
        &format!("/api/dashboard/requirements/{}", id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["title"], "Frontend Engineer");
    assert_eq!(summary["interviews"]["total"], 0);
    let funnel = summary["candidates_by_status"].as_object().unwrap();
    assert_eq!(funnel.values().filter_map(JsonValue::as_u64).sum::<u64>(), 2);

    let (status, _) = send(&app, "GET", "/api/dashboard/requirements/missing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
