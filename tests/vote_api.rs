mod common;

use axum::http::{self, StatusCode};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use common::helpers::{
    body_json, create_test_app, create_test_community, create_test_post, seed_user, send,
};

async fn cast(
    app: &axum::Router,
    token: Uuid,
    post_id: Uuid,
    vote_type: i16,
) -> (StatusCode, serde_json::Value) {
    let response = send(
        app,
        http::Method::POST,
        &format!("/posts/{post_id}/vote"),
        Some(token),
        Some(json!({ "vote_type": vote_type })),
    )
    .await;
    let status = response.status();
    (status, body_json(response).await)
}

async fn vote_row(pool: &PgPool, post_id: Uuid, user_id: Uuid) -> Option<i16> {
    sqlx::query_scalar("SELECT vote_type FROM post_votes WHERE post_id = $1 AND user_id = $2")
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .unwrap()
}

#[sqlx::test]
async fn test_first_cast_creates_vote(pool: PgPool) {
    let app = create_test_app(pool.clone()).await;
    let alice = seed_user(&pool, "alice", false).await;
    let community_id = create_test_community(&app, &alice, "news").await;
    let post_id = create_test_post(&app, &alice, community_id, "Headline").await;

    let (status, body) = cast(&app, alice.token, post_id, 1).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "created");
    assert_eq!(body["score"], 1);
    assert_eq!(vote_row(&pool, post_id, alice.id).await, Some(1));
}

#[sqlx::test]
async fn test_second_identical_cast_removes_vote(pool: PgPool) {
    let app = create_test_app(pool.clone()).await;
    let alice = seed_user(&pool, "alice", false).await;
    let community_id = create_test_community(&app, &alice, "news").await;
    let post_id = create_test_post(&app, &alice, community_id, "Headline").await;

    cast(&app, alice.token, post_id, 1).await;
    let (status, body) = cast(&app, alice.token, post_id, 1).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "removed");
    assert_eq!(body["score"], 0);
    // No row remains; net contribution is zero.
    assert_eq!(vote_row(&pool, post_id, alice.id).await, None);
}

#[sqlx::test]
async fn test_opposite_cast_switches_in_one_call(pool: PgPool) {
    let app = create_test_app(pool.clone()).await;
    let alice = seed_user(&pool, "alice", false).await;
    let community_id = create_test_community(&app, &alice, "news").await;
    let post_id = create_test_post(&app, &alice, community_id, "Headline").await;

    cast(&app, alice.token, post_id, 1).await;
    let (status, body) = cast(&app, alice.token, post_id, -1).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "updated");
    assert_eq!(body["score"], -1);
    // Exactly one row, now holding the new value.
    assert_eq!(vote_row(&pool, post_id, alice.id).await, Some(-1));
    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM post_votes WHERE post_id = $1")
        .bind(post_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[sqlx::test]
async fn test_score_sums_across_voters(pool: PgPool) {
    let app = create_test_app(pool.clone()).await;
    let alice = seed_user(&pool, "alice", false).await;
    let bob = seed_user(&pool, "bob", false).await;
    let carol = seed_user(&pool, "carol", false).await;
    let community_id = create_test_community(&app, &alice, "news").await;
    let post_id = create_test_post(&app, &alice, community_id, "Headline").await;

    cast(&app, alice.token, post_id, 1).await;
    cast(&app, bob.token, post_id, 1).await;
    let (_, body) = cast(&app, carol.token, post_id, -1).await;
    assert_eq!(body["score"], 1);
}

#[sqlx::test]
async fn test_invalid_vote_type_is_bad_request(pool: PgPool) {
    let app = create_test_app(pool.clone()).await;
    let alice = seed_user(&pool, "alice", false).await;
    let community_id = create_test_community(&app, &alice, "news").await;
    let post_id = create_test_post(&app, &alice, community_id, "Headline").await;

    let (status, body) = cast(&app, alice.token, post_id, 0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "vote_type");
    assert_eq!(vote_row(&pool, post_id, alice.id).await, None);

    let (status, _) = cast(&app, alice.token, post_id, 5).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test]
async fn test_vote_requires_authentication(pool: PgPool) {
    let app = create_test_app(pool.clone()).await;
    let alice = seed_user(&pool, "alice", false).await;
    let community_id = create_test_community(&app, &alice, "news").await;
    let post_id = create_test_post(&app, &alice, community_id, "Headline").await;

    let response = send(
        &app,
        http::Method::POST,
        &format!("/posts/{post_id}/vote"),
        None,
        Some(json!({ "vote_type": 1 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test]
async fn test_vote_on_missing_post_is_not_found(pool: PgPool) {
    let app = create_test_app(pool.clone()).await;
    let alice = seed_user(&pool, "alice", false).await;

    let (status, _) = cast(&app, alice.token, Uuid::new_v4(), 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
