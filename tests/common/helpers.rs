//! Shared helper functions for integration tests.

use axum::{
    body::Body,
    http::{self, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{Duration, Utc};
use community_server::create_router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub async fn create_test_app(pool: PgPool) -> Router {
    create_router(pool, "Test Server".to_string(), 256 * 1024)
}

/// A seeded user plus a valid session token for it.
pub struct TestUser {
    pub id: Uuid,
    pub token: Uuid,
}

/// Inserts a user row and an unexpired session directly; session issuance
/// is outside the API surface.
pub async fn seed_user(pool: &PgPool, username: &str, is_admin: bool) -> TestUser {
    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (username, is_admin) VALUES ($1, $2) RETURNING id",
    )
    .bind(username)
    .bind(is_admin)
    .fetch_one(pool)
    .await
    .expect("Failed to seed user");

    let token = Uuid::new_v4();
    sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
        .bind(token)
        .bind(id)
        .bind(Utc::now() + Duration::hours(1))
        .execute(pool)
        .await
        .expect("Failed to seed session");

    TestUser { id, token }
}

/// Sends a request with an optional bearer token and JSON body.
pub async fn send(
    app: &Router,
    method: http::Method,
    uri: &str,
    token: Option<Uuid>,
    body: Option<Value>,
) -> Response<axum::body::Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json_body) => builder
            .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(Body::from(json_body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<axum::body::Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("Response body was not valid JSON")
}

pub async fn create_test_community(app: &Router, user: &TestUser, name: &str) -> Uuid {
    let response = send(
        app,
        http::Method::POST,
        "/communities",
        Some(user.token),
        Some(json!({ "name": name, "description": "..." })),
    )
    .await;
    assert_eq!(
        response.status(),
        StatusCode::CREATED,
        "Failed to create community in helper"
    );
    let community = body_json(response).await;
    Uuid::parse_str(community["id"].as_str().unwrap()).unwrap()
}

pub async fn join_test_community(app: &Router, user: &TestUser, community_id: Uuid) {
    let response = send(
        app,
        http::Method::POST,
        &format!("/communities/{community_id}/join"),
        Some(user.token),
        None,
    )
    .await;
    assert_eq!(
        response.status(),
        StatusCode::OK,
        "Failed to join community in helper"
    );
}

pub async fn create_test_post(
    app: &Router,
    user: &TestUser,
    community_id: Uuid,
    title: &str,
) -> Uuid {
    let response = send(
        app,
        http::Method::POST,
        &format!("/communities/{community_id}/posts"),
        Some(user.token),
        Some(json!({ "title": title, "content": "post body" })),
    )
    .await;
    assert_eq!(
        response.status(),
        StatusCode::CREATED,
        "Failed to create post in helper"
    );
    let post = body_json(response).await;
    Uuid::parse_str(post["id"].as_str().unwrap()).unwrap()
}

pub async fn create_test_comment(app: &Router, user: &TestUser, post_id: Uuid, content: &str) -> Uuid {
    let response = send(
        app,
        http::Method::POST,
        &format!("/posts/{post_id}/comments"),
        Some(user.token),
        Some(json!({ "content": content })),
    )
    .await;
    assert_eq!(
        response.status(),
        StatusCode::CREATED,
        "Failed to create comment in helper"
    );
    let comment = body_json(response).await;
    Uuid::parse_str(comment["id"].as_str().unwrap()).unwrap()
}
