use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{require_author_or_moderator, CurrentUser},
    constants::MAX_COMMENT_CONTENT_LENGTH,
    error::ApiError,
    repositories::{comment_repository, post_repository},
    utils::PaginationParams,
    AppState,
};

#[derive(Deserialize)]
pub struct CommentPayload {
    content: String,
}

/// Comment content must be 1..=500 characters after trimming.
fn validate_content(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation_field(
            "content",
            "Content cannot be empty",
        ));
    }
    if trimmed.chars().count() > MAX_COMMENT_CONTENT_LENGTH {
        return Err(ApiError::validation_field(
            "content",
            format!("Content exceeds maximum length of {MAX_COMMENT_CONTENT_LENGTH} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

pub async fn create_comment_handler(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    user: CurrentUser,
    Json(payload): Json<CommentPayload>,
) -> Result<Response, ApiError> {
    post_repository::get_post_by_id(&state.db_pool, post_id)
        .await?
        .ok_or(ApiError::NotFound("Post"))?;

    let content = validate_content(&payload.content)?;
    let comment =
        comment_repository::create_comment(&state.db_pool, post_id, user.id, content).await?;
    info!(comment_id = %comment.id, post_id = %post_id, author_id = %user.id, "Created comment");
    Ok((StatusCode::CREATED, Json(comment)).into_response())
}

pub async fn list_comments_handler(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Response, ApiError> {
    post_repository::get_post_by_id(&state.db_pool, post_id)
        .await?
        .ok_or(ApiError::NotFound("Post"))?;
    let comments =
        comment_repository::get_comments_by_post(&state.db_pool, post_id, &pagination).await?;
    Ok((StatusCode::OK, Json(comments)).into_response())
}

pub async fn update_comment_handler(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    user: CurrentUser,
    Json(payload): Json<CommentPayload>,
) -> Result<Response, ApiError> {
    let comment = comment_repository::get_comment_by_id(&state.db_pool, comment_id)
        .await?
        .ok_or(ApiError::NotFound("Comment"))?;
    // Editing is author-only; moderators may delete but not rewrite.
    if comment.author_id != user.id {
        warn!(comment_id = %comment_id, user_id = %user.id, "User attempted to edit a comment they did not create");
        return Err(ApiError::Forbidden);
    }

    let content = validate_content(&payload.content)?;
    let updated = comment_repository::update_content(&state.db_pool, comment_id, content)
        .await?
        .ok_or(ApiError::NotFound("Comment"))?;
    info!(comment_id = %updated.id, "Updated comment");
    Ok((StatusCode::OK, Json(updated)).into_response())
}

pub async fn delete_comment_handler(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    user: CurrentUser,
) -> Result<Response, ApiError> {
    let comment = comment_repository::get_comment_by_id(&state.db_pool, comment_id)
        .await?
        .ok_or(ApiError::NotFound("Comment"))?;
    let post = post_repository::get_post_by_id(&state.db_pool, comment.post_id)
        .await?
        .ok_or(ApiError::NotFound("Post"))?;

    // One policy everywhere: the author, a moderator of the post's
    // community, or an admin may delete.
    require_author_or_moderator(&state.db_pool, post.community_id, comment.author_id, &user)
        .await?;

    let rows = comment_repository::delete_comment(&state.db_pool, comment_id).await?;
    if rows == 0 {
        return Err(ApiError::NotFound("Comment"));
    }
    info!(comment_id = %comment_id, deleted_by = %user.id, "Deleted comment");
    Ok(StatusCode::NO_CONTENT.into_response())
}
