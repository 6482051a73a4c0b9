use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    error::ApiError,
    repositories::{
        post_repository,
        reaction_repository::{self, ReactionKind},
    },
    AppState,
};

/// Shared create path for both reaction sets. The caller is expected to
/// know its current state; a duplicate insert is a conflict, not a no-op.
async fn add(
    pool: &PgPool,
    kind: ReactionKind,
    post_id: Uuid,
    user: &CurrentUser,
) -> Result<Response, ApiError> {
    post_repository::get_post_by_id(pool, post_id)
        .await?
        .ok_or(ApiError::NotFound("Post"))?;

    match reaction_repository::add_reaction(pool, kind, post_id, user.id).await {
        Ok(reaction) => {
            info!(post_id = %post_id, user_id = %user.id, kind = kind.noun(), "Added reaction");
            Ok((StatusCode::CREATED, Json(reaction)).into_response())
        }
        Err(e) if ApiError::is_unique_violation(&e) => Err(ApiError::conflict(format!(
            "Post already {}d",
            kind.noun()
        ))),
        Err(e) => Err(e.into()),
    }
}

async fn remove(
    pool: &PgPool,
    kind: ReactionKind,
    post_id: Uuid,
    user: &CurrentUser,
) -> Result<Response, ApiError> {
    let rows = reaction_repository::remove_reaction(pool, kind, post_id, user.id).await?;
    if rows == 0 {
        return Err(ApiError::NotFound(match kind {
            ReactionKind::Like => "Like",
            ReactionKind::Save => "Save",
        }));
    }
    info!(post_id = %post_id, user_id = %user.id, kind = kind.noun(), "Removed reaction");
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn like_post_handler(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    user: CurrentUser,
) -> Result<Response, ApiError> {
    add(&state.db_pool, ReactionKind::Like, post_id, &user).await
}

pub async fn unlike_post_handler(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    user: CurrentUser,
) -> Result<Response, ApiError> {
    remove(&state.db_pool, ReactionKind::Like, post_id, &user).await
}

pub async fn save_post_handler(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    user: CurrentUser,
) -> Result<Response, ApiError> {
    add(&state.db_pool, ReactionKind::Save, post_id, &user).await
}

pub async fn unsave_post_handler(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    user: CurrentUser,
) -> Result<Response, ApiError> {
    remove(&state.db_pool, ReactionKind::Save, post_id, &user).await
}
