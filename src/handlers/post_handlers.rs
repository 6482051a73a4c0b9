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
    constants::{MAX_POST_CONTENT_LENGTH, MAX_POST_TITLE_LENGTH},
    error::ApiError,
    repositories::{
        community_repository, member_repository,
        post_repository::{self, CreatePostData},
        user_repository,
    },
    utils::{PaginationParams, SearchParams},
    AppState,
};

#[derive(Deserialize)]
pub struct CreatePostPayload {
    title: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdatePostPayload {
    #[serde(default)]
    content: Option<String>,
}

/// Normalizes optional post content: trims, rejects over-limit text, and
/// collapses whitespace-only input to None.
fn validate_content(content: Option<String>) -> Result<Option<String>, ApiError> {
    match content {
        None => Ok(None),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            if trimmed.chars().count() > MAX_POST_CONTENT_LENGTH {
                return Err(ApiError::validation_field(
                    "content",
                    format!("Content exceeds maximum length of {MAX_POST_CONTENT_LENGTH} characters"),
                ));
            }
            Ok(Some(trimmed.to_string()))
        }
    }
}

pub async fn create_post_handler(
    State(state): State<AppState>,
    Path(community_id): Path<Uuid>,
    user: CurrentUser,
    Json(payload): Json<CreatePostPayload>,
) -> Result<Response, ApiError> {
    community_repository::get_community_by_id(&state.db_pool, community_id)
        .await?
        .ok_or(ApiError::NotFound("Community"))?;

    // Posting requires membership.
    if member_repository::get_member(&state.db_pool, community_id, user.id)
        .await?
        .is_none()
    {
        warn!(community_id = %community_id, user_id = %user.id, "Non-member attempted to post");
        return Err(ApiError::Forbidden);
    }

    let title = payload.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::validation_field("title", "Title cannot be empty"));
    }
    if title.chars().count() > MAX_POST_TITLE_LENGTH {
        return Err(ApiError::validation_field(
            "title",
            format!("Title exceeds maximum length of {MAX_POST_TITLE_LENGTH} characters"),
        ));
    }
    let content = validate_content(payload.content)?;

    let post = post_repository::create_post(
        &state.db_pool,
        community_id,
        user.id,
        CreatePostData { title, content },
    )
    .await?;
    info!(post_id = %post.id, community_id = %community_id, author_id = %user.id, "Created post");
    Ok((StatusCode::CREATED, Json(post)).into_response())
}

/// Site-wide feed, newest first, optionally filtered by a title search term.
pub async fn feed_handler(
    State(state): State<AppState>,
    Query(search): Query<SearchParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Response, ApiError> {
    let posts =
        post_repository::get_feed(&state.db_pool, search.search.as_deref(), &pagination).await?;
    Ok((StatusCode::OK, Json(posts)).into_response())
}

pub async fn list_community_posts_handler(
    State(state): State<AppState>,
    Path(community_id): Path<Uuid>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Response, ApiError> {
    community_repository::get_community_by_id(&state.db_pool, community_id)
        .await?
        .ok_or(ApiError::NotFound("Community"))?;
    let posts =
        post_repository::get_posts_by_community(&state.db_pool, community_id, &pagination).await?;
    Ok((StatusCode::OK, Json(posts)).into_response())
}

pub async fn list_user_posts_handler(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Response, ApiError> {
    user_repository::get_user_by_id(&state.db_pool, user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    let posts = post_repository::get_posts_by_author(&state.db_pool, user_id, &pagination).await?;
    Ok((StatusCode::OK, Json(posts)).into_response())
}

/// A user's saved posts are visible only to that user.
pub async fn list_saved_posts_handler(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    user: CurrentUser,
    Query(pagination): Query<PaginationParams>,
) -> Result<Response, ApiError> {
    if user.id != user_id {
        return Err(ApiError::Forbidden);
    }
    let posts = post_repository::get_posts_saved_by(&state.db_pool, user_id, &pagination).await?;
    Ok((StatusCode::OK, Json(posts)).into_response())
}

pub async fn get_post_handler(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let post = post_repository::get_post_detail(&state.db_pool, post_id)
        .await?
        .ok_or(ApiError::NotFound("Post"))?;
    Ok((StatusCode::OK, Json(post)).into_response())
}

pub async fn update_post_handler(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    user: CurrentUser,
    Json(payload): Json<UpdatePostPayload>,
) -> Result<Response, ApiError> {
    let post = post_repository::get_post_by_id(&state.db_pool, post_id)
        .await?
        .ok_or(ApiError::NotFound("Post"))?;
    if post.author_id != user.id {
        warn!(post_id = %post_id, user_id = %user.id, author_id = %post.author_id, "User attempted to edit a post they did not create");
        return Err(ApiError::Forbidden);
    }

    let content = validate_content(payload.content)?;
    let updated = post_repository::update_content(&state.db_pool, post_id, content)
        .await?
        .ok_or(ApiError::NotFound("Post"))?;
    info!(post_id = %updated.id, "Updated post");
    Ok((StatusCode::OK, Json(updated)).into_response())
}

pub async fn delete_post_handler(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    user: CurrentUser,
) -> Result<Response, ApiError> {
    let post = post_repository::get_post_by_id(&state.db_pool, post_id)
        .await?
        .ok_or(ApiError::NotFound("Post"))?;

    require_author_or_moderator(&state.db_pool, post.community_id, post.author_id, &user).await?;

    let rows = post_repository::delete_post(&state.db_pool, post_id).await?;
    if rows == 0 {
        return Err(ApiError::NotFound("Post"));
    }
    info!(post_id = %post_id, deleted_by = %user.id, "Deleted post");
    Ok(StatusCode::NO_CONTENT.into_response())
}
