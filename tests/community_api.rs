mod common;

use axum::http::{self, StatusCode};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use common::helpers::{
    body_json, create_test_app, create_test_community, join_test_community, seed_user, send,
};

#[sqlx::test]
async fn test_create_community_success(pool: PgPool) {
    let app = create_test_app(pool.clone()).await;
    let alice = seed_user(&pool, "alice", false).await;

    let response = send(
        &app,
        http::Method::POST,
        "/communities",
        Some(alice.token),
        Some(json!({ "name": "rustaceans", "description": "all things crustacean" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let community = body_json(response).await;
    assert_eq!(community["name"], "rustaceans");
    assert_eq!(community["created_by"], json!(alice.id));

    // The creator is a moderator from the start.
    let role: String = sqlx::query_scalar(
        "SELECT role FROM community_members WHERE community_id = $1 AND user_id = $2",
    )
    .bind(Uuid::parse_str(community["id"].as_str().unwrap()).unwrap())
    .bind(alice.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(role, "moderator");
}

#[sqlx::test]
async fn test_create_community_requires_auth(pool: PgPool) {
    let app = create_test_app(pool).await;

    let response = send(
        &app,
        http::Method::POST,
        "/communities",
        None,
        Some(json!({ "name": "anonymous" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test]
async fn test_duplicate_community_name_is_bad_request(pool: PgPool) {
    let app = create_test_app(pool.clone()).await;
    let alice = seed_user(&pool, "alice", false).await;
    create_test_community(&app, &alice, "gardening").await;

    let response = send(
        &app,
        http::Method::POST,
        "/communities",
        Some(alice.token),
        Some(json!({ "name": "gardening" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "bad_request");
    assert_eq!(body["field"], "name");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM communities WHERE name = $1")
        .bind("gardening")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1, "No second community row may exist");
}

#[sqlx::test]
async fn test_join_and_leave_community(pool: PgPool) {
    let app = create_test_app(pool.clone()).await;
    let alice = seed_user(&pool, "alice", false).await;
    let bob = seed_user(&pool, "bob", false).await;
    let community_id = create_test_community(&app, &alice, "chess").await;

    let response = send(
        &app,
        http::Method::POST,
        &format!("/communities/{community_id}/join"),
        Some(bob.token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    let response = send(
        &app,
        http::Method::POST,
        &format!("/communities/{community_id}/leave"),
        Some(bob.token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM community_members WHERE community_id = $1 AND user_id = $2",
    )
    .bind(community_id)
    .bind(bob.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test]
async fn test_duplicate_join_is_conflict(pool: PgPool) {
    let app = create_test_app(pool.clone()).await;
    let alice = seed_user(&pool, "alice", false).await;
    let bob = seed_user(&pool, "bob", false).await;
    let community_id = create_test_community(&app, &alice, "chess").await;
    join_test_community(&app, &bob, community_id).await;

    let response = send(
        &app,
        http::Method::POST,
        &format!("/communities/{community_id}/join"),
        Some(bob.token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"], "conflict");
}

#[sqlx::test]
async fn test_leave_without_membership_is_not_found(pool: PgPool) {
    let app = create_test_app(pool.clone()).await;
    let alice = seed_user(&pool, "alice", false).await;
    let bob = seed_user(&pool, "bob", false).await;
    let community_id = create_test_community(&app, &alice, "chess").await;

    let response = send(
        &app,
        http::Method::POST,
        &format!("/communities/{community_id}/leave"),
        Some(bob.token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test]
async fn test_update_community_requires_moderator(pool: PgPool) {
    let app = create_test_app(pool.clone()).await;
    let alice = seed_user(&pool, "alice", false).await;
    let bob = seed_user(&pool, "bob", false).await;
    let community_id = create_test_community(&app, &alice, "chess").await;
    join_test_community(&app, &bob, community_id).await;

    // Plain member is rejected.
    let response = send(
        &app,
        http::Method::PUT,
        &format!("/communities/{community_id}"),
        Some(bob.token),
        Some(json!({ "description": "bob's takeover" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The creator (moderator) may edit.
    let response = send(
        &app,
        http::Method::PUT,
        &format!("/communities/{community_id}"),
        Some(alice.token),
        Some(json!({ "description": "openings and endgames" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let community = body_json(response).await;
    assert_eq!(community["description"], "openings and endgames");
}

#[sqlx::test]
async fn test_moderator_promotion_and_demotion(pool: PgPool) {
    let app = create_test_app(pool.clone()).await;
    let alice = seed_user(&pool, "alice", false).await;
    let bob = seed_user(&pool, "bob", false).await;
    let community_id = create_test_community(&app, &alice, "chess").await;
    join_test_community(&app, &bob, community_id).await;

    let response = send(
        &app,
        http::Method::POST,
        &format!("/communities/{community_id}/moderators"),
        Some(alice.token),
        Some(json!({ "user_id": bob.id })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Promoting again conflicts.
    let response = send(
        &app,
        http::Method::POST,
        &format!("/communities/{community_id}/moderators"),
        Some(alice.token),
        Some(json!({ "user_id": bob.id })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = send(
        &app,
        http::Method::DELETE,
        &format!("/communities/{community_id}/moderators/{}", bob.id),
        Some(alice.token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Demoting a non-moderator is NOT_FOUND.
    let response = send(
        &app,
        http::Method::DELETE,
        &format!("/communities/{community_id}/moderators/{}", bob.id),
        Some(alice.token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test]
async fn test_promote_non_member_is_not_found(pool: PgPool) {
    let app = create_test_app(pool.clone()).await;
    let alice = seed_user(&pool, "alice", false).await;
    let stranger = seed_user(&pool, "stranger", false).await;
    let community_id = create_test_community(&app, &alice, "chess").await;

    let response = send(
        &app,
        http::Method::POST,
        &format!("/communities/{community_id}/moderators"),
        Some(alice.token),
        Some(json!({ "user_id": stranger.id })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test]
async fn test_tag_lifecycle(pool: PgPool) {
    let app = create_test_app(pool.clone()).await;
    let alice = seed_user(&pool, "alice", false).await;
    let community_id = create_test_community(&app, &alice, "chess").await;

    let response = send(
        &app,
        http::Method::POST,
        &format!("/communities/{community_id}/tags"),
        Some(alice.token),
        Some(json!({ "name": "tactics" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let tag = body_json(response).await;
    let tag_id = Uuid::parse_str(tag["id"].as_str().unwrap()).unwrap();

    // Duplicate tag name within the community conflicts.
    let response = send(
        &app,
        http::Method::POST,
        &format!("/communities/{community_id}/tags"),
        Some(alice.token),
        Some(json!({ "name": "tactics" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = send(
        &app,
        http::Method::DELETE,
        &format!("/communities/{community_id}/tags/{tag_id}"),
        Some(alice.token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        &app,
        http::Method::DELETE,
        &format!("/communities/{community_id}/tags/{tag_id}"),
        Some(alice.token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test]
async fn test_expired_session_is_rejected(pool: PgPool) {
    let app = create_test_app(pool.clone()).await;
    let alice = seed_user(&pool, "alice", false).await;
    sqlx::query("UPDATE sessions SET expires_at = now() - INTERVAL '1 minute' WHERE token = $1")
        .bind(alice.token)
        .execute(&pool)
        .await
        .unwrap();

    let response = send(
        &app,
        http::Method::POST,
        "/communities",
        Some(alice.token),
        Some(json!({ "name": "late" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test]
async fn test_admin_can_delete_community(pool: PgPool) {
    let app = create_test_app(pool.clone()).await;
    let alice = seed_user(&pool, "alice", false).await;
    let root = seed_user(&pool, "root", true).await;
    let community_id = create_test_community(&app, &alice, "doomed").await;

    let response = send(
        &app,
        http::Method::DELETE,
        &format!("/communities/{community_id}"),
        Some(root.token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM communities WHERE id = $1")
        .bind(community_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test]
async fn test_delete_community_requires_admin(pool: PgPool) {
    let app = create_test_app(pool.clone()).await;
    let alice = seed_user(&pool, "alice", false).await;
    let community_id = create_test_community(&app, &alice, "sturdy").await;

    // Even the creator-moderator cannot remove a community outright.
    let response = send(
        &app,
        http::Method::DELETE,
        &format!("/communities/{community_id}"),
        Some(alice.token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app,
        http::Method::DELETE,
        &format!("/communities/{}", Uuid::new_v4()),
        Some(alice.token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
