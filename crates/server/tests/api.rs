use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .password_cost(4)
        .build()
        .await
        .unwrap();
    for user in ["alice", "bob"] {
        engine.create_user(user, "secret").await.unwrap();
    }
    server::router(Arc::new(engine))
}

fn basic(user: &str, password: &str) -> String {
    let token = base64::engine::general_purpose::STANDARD.encode(format!("{user}:{password}"));
    format!("Basic {token}")
}

async fn send(app: &Router, user: &str, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic(user, "secret"));
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn balance_of(app: &Router, user: &str) -> String {
    let (status, body) = send(app, user, Method::GET, "/balances/me/", None).await;
    assert_eq!(status, StatusCode::OK);
    body["amount"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn requests_without_valid_credentials_are_rejected() {
    let app = app().await;

    let request = Request::builder()
        .uri("/balances/me/")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/balances/me/")
        .header(header::AUTHORIZATION, basic("alice", "wrong"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn balance_follows_transaction_lifecycle() {
    let app = app().await;
    assert_eq!(balance_of(&app, "alice").await, "0.00");

    let (status, _) = send(
        &app,
        "alice",
        Method::POST,
        "/transactions/",
        Some(json!({"transaction_type": "IN", "amount": "100.00"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, created) = send(
        &app,
        "alice",
        Method::POST,
        "/transactions/",
        Some(json!({"transaction_type": "IN", "amount": 50, "description": "gift"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["amount"], "50.00");
    assert_eq!(created["description"], "gift");
    assert_eq!(balance_of(&app, "alice").await, "150.00");

    let id = created["id"].as_i64().unwrap();
    let (status, updated) = send(
        &app,
        "alice",
        Method::PATCH,
        &format!("/transactions/{id}/"),
        Some(json!({"transaction_type": "OUT", "amount": "30.00"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["transaction_type"], "OUT");
    assert_eq!(updated["description"], "gift");
    assert_eq!(balance_of(&app, "alice").await, "70.00");

    let (status, _) = send(&app, "alice", Method::DELETE, &format!("/transactions/{id}/"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(balance_of(&app, "alice").await, "100.00");
}

#[tokio::test]
async fn invalid_transactions_are_rejected_with_field_detail() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "alice",
        Method::POST,
        "/transactions/",
        Some(json!({"transaction_type": "OUT", "amount": "-3.00"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "amount");

    let (status, body) = send(
        &app,
        "alice",
        Method::POST,
        "/transactions/",
        Some(json!({"transaction_type": "OUT", "amount": "1.234"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "amount");

    for _ in 0..2 {
        let (status, body) = send(
            &app,
            "alice",
            Method::POST,
            "/transactions/",
            Some(json!({"transaction_type": "IN", "amount": "50000000000000000.00"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "amount");
    }

    let (status, body) = send(
        &app,
        "alice",
        Method::POST,
        "/transactions/",
        Some(json!({"transaction_type": "SIDEWAYS", "amount": "1.00"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, category) = send(
        &app,
        "bob",
        Method::POST,
        "/categories/",
        Some(json!({"name": "Bob's"})),
    )
    .await;
    let (status, body) = send(
        &app,
        "alice",
        Method::POST,
        "/transactions/",
        Some(json!({"transaction_type": "OUT", "amount": "1.00", "category": category["id"]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "category");

    assert_eq!(balance_of(&app, "alice").await, "0.00");
}

#[tokio::test]
async fn other_users_transactions_are_not_found() {
    let app = app().await;
    let (_, created) = send(
        &app,
        "alice",
        Method::POST,
        "/transactions/",
        Some(json!({"transaction_type": "IN", "amount": "10.00"})),
    )
    .await;
    let uri = format!("/transactions/{}/", created["id"]);

    let (status, _) = send(&app, "bob", Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "bob", Method::PATCH, &uri, Some(json!({"amount": "1.00"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "bob", Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(balance_of(&app, "alice").await, "10.00");
}

#[tokio::test]
async fn month_filter_selects_inclusive_month() {
    let app = app().await;
    for day in ["2024-02-01", "2024-02-29", "2024-03-01"] {
        send(
            &app,
            "alice",
            Method::POST,
            "/transactions/",
            Some(json!({"transaction_type": "IN", "amount": "1.00", "created_at": day})),
        )
        .await;
    }

    let (status, body) = send(
        &app,
        "alice",
        Method::GET,
        "/transactions/?created_at=2024-02-10",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let days: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|tx| tx["created_at"].as_str().unwrap())
        .collect();
    assert_eq!(days, vec!["2024-02-29", "2024-02-01"]);

    let (status, body) = send(
        &app,
        "alice",
        Method::GET,
        "/transactions/?created_at=not-a-date",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn deleting_category_keeps_transaction_and_balance() {
    let app = app().await;
    let (status, category) = send(
        &app,
        "alice",
        Method::POST,
        "/categories/",
        Some(json!({"name": "Food"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, tx) = send(
        &app,
        "alice",
        Method::POST,
        "/transactions/",
        Some(json!({"transaction_type": "OUT", "amount": "9.99", "category": category["id"]})),
    )
    .await;
    assert_eq!(tx["category"], category["id"]);

    let (status, _) = send(
        &app,
        "alice",
        Method::DELETE,
        &format!("/categories/{}/", category["id"]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, tx) = send(&app, "alice", Method::GET, &format!("/transactions/{}/", tx["id"]), None).await;
    assert_eq!(tx["category"], Value::Null);
    assert_eq!(balance_of(&app, "alice").await, "-9.99");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/categories/")
        .header(header::AUTHORIZATION, basic("alice", "secret"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\":"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn projects_and_tasks_round_trip() {
    let app = app().await;
    let (status, project) = send(
        &app,
        "alice",
        Method::POST,
        "/projects/",
        Some(json!({"name": "House", "end_date": "2025-06-30"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(project["is_active"], true);
    let tasks_uri = format!("/projects/{}/tasks/", project["id"]);

    let (status, task) = send(
        &app,
        "alice",
        Method::POST,
        &tasks_uri,
        Some(json!({"name": "Paint", "owner": "bob", "priority": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["status"], "N");
    assert_eq!(task["owner"], "bob");

    let (status, body) = send(
        &app,
        "alice",
        Method::POST,
        &tasks_uri,
        Some(json!({"name": "Ghost", "owner": "nobody"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "owner");

    let (status, _) = send(&app, "bob", Method::GET, &tasks_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let task_uri = format!("{tasks_uri}{}/", task["id"]);
    let (status, task) = send(
        &app,
        "alice",
        Method::PATCH,
        &task_uri,
        Some(json!({"status": "C", "owner": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["status"], "C");
    assert_eq!(task["owner"], Value::Null);

    let (status, body) = send(&app, "alice", Method::GET, "/projects/?is_active=false", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, _) = send(
        &app,
        "alice",
        Method::DELETE,
        &format!("/projects/{}/", project["id"]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "alice", Method::GET, &task_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn teams_validate_members() {
    let app = app().await;
    let (status, team) = send(
        &app,
        "alice",
        Method::POST,
        "/teams/",
        Some(json!({"members": ["bob", "bob", "alice"]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(team["members"], json!(["alice", "bob"]));
    assert_eq!(team["user"], "alice");

    let (status, body) = send(
        &app,
        "alice",
        Method::PATCH,
        &format!("/teams/{}/", team["id"]),
        Some(json!({"members": ["mallory"]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "members");

    let (status, body) = send(&app, "bob", Method::GET, "/teams/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}
