use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{require_moderator, AdminUser, CurrentUser},
    constants::{MAX_COMMUNITY_NAME_LENGTH, MAX_TAG_NAME_LENGTH},
    error::ApiError,
    models::MemberRole,
    repositories::{
        community_repository::{self, CreateCommunityData},
        member_repository,
    },
    utils::PaginationParams,
    AppState,
};

#[derive(Deserialize)]
pub struct CreateCommunityPayload {
    name: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Serialize)]
pub struct MembershipResponse {
    pub success: bool,
    pub message: String,
}

pub async fn create_community_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateCommunityPayload>,
) -> Result<Response, ApiError> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::validation_field("name", "Name cannot be empty"));
    }
    if name.chars().count() > MAX_COMMUNITY_NAME_LENGTH {
        return Err(ApiError::validation_field(
            "name",
            format!("Name exceeds maximum length of {MAX_COMMUNITY_NAME_LENGTH} characters"),
        ));
    }

    let data = CreateCommunityData {
        name,
        description: payload.description.unwrap_or_default().trim().to_string(),
    };

    match community_repository::create_community(&state.db_pool, user.id, data).await {
        Ok(community) => {
            info!(community_id = %community.id, created_by = %user.id, "Created community");
            Ok((StatusCode::CREATED, Json(community)).into_response())
        }
        // A taken name is reported as a per-field validation failure,
        // not a conflict.
        Err(e) if ApiError::is_unique_violation(&e) => {
            Err(ApiError::validation_field("name", "Name already in use"))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn get_community_handler(
    State(state): State<AppState>,
    Path(community_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let community = community_repository::get_community_by_id(&state.db_pool, community_id)
        .await?
        .ok_or(ApiError::NotFound("Community"))?;
    Ok((StatusCode::OK, Json(community)).into_response())
}

pub async fn list_communities_handler(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Response, ApiError> {
    let communities = community_repository::list_communities(&state.db_pool, &pagination).await?;
    Ok((StatusCode::OK, Json(communities)).into_response())
}

#[derive(Deserialize)]
pub struct UpdateCommunityPayload {
    description: String,
}

pub async fn update_community_handler(
    State(state): State<AppState>,
    Path(community_id): Path<Uuid>,
    user: CurrentUser,
    Json(payload): Json<UpdateCommunityPayload>,
) -> Result<Response, ApiError> {
    require_moderator(&state.db_pool, community_id, &user).await?;

    let description = payload.description.trim().to_string();
    let community =
        community_repository::update_description(&state.db_pool, community_id, description)
            .await?
            .ok_or(ApiError::NotFound("Community"))?;
    info!(community_id = %community.id, updated_by = %user.id, "Updated community");
    Ok((StatusCode::OK, Json(community)).into_response())
}

/// Removing a whole community is a platform-admin operation, not a
/// moderator one.
pub async fn delete_community_handler(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(community_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let rows = community_repository::delete_community(&state.db_pool, community_id).await?;
    if rows == 0 {
        return Err(ApiError::NotFound("Community"));
    }
    info!(community_id = %community_id, deleted_by = %admin.id, "Deleted community");
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn join_community_handler(
    State(state): State<AppState>,
    Path(community_id): Path<Uuid>,
    user: CurrentUser,
) -> Result<Response, ApiError> {
    let community = community_repository::get_community_by_id(&state.db_pool, community_id)
        .await?
        .ok_or(ApiError::NotFound("Community"))?;

    match member_repository::add_member(&state.db_pool, community_id, user.id, MemberRole::Member)
        .await
    {
        Ok(_) => {
            info!(community_id = %community_id, user_id = %user.id, "User joined community");
            Ok((
                StatusCode::OK,
                Json(MembershipResponse {
                    success: true,
                    message: format!("Joined {}", community.name),
                }),
            )
                .into_response())
        }
        Err(e) if ApiError::is_unique_violation(&e) => {
            Err(ApiError::conflict("Already a member of this community"))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn leave_community_handler(
    State(state): State<AppState>,
    Path(community_id): Path<Uuid>,
    user: CurrentUser,
) -> Result<Response, ApiError> {
    let rows = member_repository::remove_member(&state.db_pool, community_id, user.id).await?;
    if rows == 0 {
        return Err(ApiError::NotFound("Membership"));
    }
    info!(community_id = %community_id, user_id = %user.id, "User left community");
    Ok((
        StatusCode::OK,
        Json(MembershipResponse {
            success: true,
            message: "Left community".to_string(),
        }),
    )
        .into_response())
}

#[derive(Deserialize)]
pub struct AddTagPayload {
    name: String,
}

pub async fn add_tag_handler(
    State(state): State<AppState>,
    Path(community_id): Path<Uuid>,
    user: CurrentUser,
    Json(payload): Json<AddTagPayload>,
) -> Result<Response, ApiError> {
    require_moderator(&state.db_pool, community_id, &user).await?;

    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::validation_field("name", "Tag name cannot be empty"));
    }
    if name.chars().count() > MAX_TAG_NAME_LENGTH {
        return Err(ApiError::validation_field(
            "name",
            format!("Tag name exceeds maximum length of {MAX_TAG_NAME_LENGTH} characters"),
        ));
    }

    match community_repository::add_tag(&state.db_pool, community_id, name).await {
        Ok(tag) => {
            info!(community_id = %community_id, tag_id = %tag.id, "Added community tag");
            Ok((StatusCode::CREATED, Json(tag)).into_response())
        }
        Err(e) if ApiError::is_unique_violation(&e) => {
            Err(ApiError::conflict("Tag already exists for this community"))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn remove_tag_handler(
    State(state): State<AppState>,
    Path((community_id, tag_id)): Path<(Uuid, Uuid)>,
    user: CurrentUser,
) -> Result<Response, ApiError> {
    require_moderator(&state.db_pool, community_id, &user).await?;

    let rows = community_repository::remove_tag(&state.db_pool, community_id, tag_id).await?;
    if rows == 0 {
        return Err(ApiError::NotFound("Tag"));
    }
    info!(community_id = %community_id, tag_id = %tag_id, "Removed community tag");
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn list_tags_handler(
    State(state): State<AppState>,
    Path(community_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    community_repository::get_community_by_id(&state.db_pool, community_id)
        .await?
        .ok_or(ApiError::NotFound("Community"))?;
    let tags = community_repository::list_tags(&state.db_pool, community_id).await?;
    Ok((StatusCode::OK, Json(tags)).into_response())
}

#[derive(Deserialize)]
pub struct AddModeratorPayload {
    user_id: Uuid,
}

pub async fn add_moderator_handler(
    State(state): State<AppState>,
    Path(community_id): Path<Uuid>,
    user: CurrentUser,
    Json(payload): Json<AddModeratorPayload>,
) -> Result<Response, ApiError> {
    require_moderator(&state.db_pool, community_id, &user).await?;

    let member = member_repository::get_member(&state.db_pool, community_id, payload.user_id)
        .await?
        .ok_or(ApiError::NotFound("Membership"))?;
    if member.role == MemberRole::Moderator {
        return Err(ApiError::conflict("User is already a moderator"));
    }

    let rows = member_repository::set_role(
        &state.db_pool,
        community_id,
        payload.user_id,
        MemberRole::Member,
        MemberRole::Moderator,
    )
    .await?;
    if rows == 0 {
        // Role changed between the check and the update.
        return Err(ApiError::conflict("User is already a moderator"));
    }
    info!(community_id = %community_id, user_id = %payload.user_id, promoted_by = %user.id, "Added moderator");
    Ok(StatusCode::OK.into_response())
}

pub async fn remove_moderator_handler(
    State(state): State<AppState>,
    Path((community_id, target_id)): Path<(Uuid, Uuid)>,
    user: CurrentUser,
) -> Result<Response, ApiError> {
    require_moderator(&state.db_pool, community_id, &user).await?;

    let rows = member_repository::set_role(
        &state.db_pool,
        community_id,
        target_id,
        MemberRole::Moderator,
        MemberRole::Member,
    )
    .await?;
    if rows == 0 {
        warn!(community_id = %community_id, user_id = %target_id, "Attempted to demote a non-moderator");
        return Err(ApiError::NotFound("Moderator"));
    }
    info!(community_id = %community_id, user_id = %target_id, demoted_by = %user.id, "Removed moderator");
    Ok(StatusCode::OK.into_response())
}
