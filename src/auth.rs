use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{MemberRole, User},
    repositories::member_repository,
    AppState,
};

/// The authenticated caller, resolved from a bearer session token.
///
/// Session issuance is handled by an external service; this extractor only
/// validates that the presented token maps to an unexpired session and loads
/// the owning user.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub is_admin: bool,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        CurrentUser {
            id: user.id,
            username: user.username,
            is_admin: user.is_admin,
        }
    }
}

fn bearer_token(parts: &Parts) -> Result<Uuid, ApiError> {
    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(ApiError::Unauthorized)?
        .to_str()
        .map_err(|_| ApiError::Unauthorized)?;

    let token = value.strip_prefix("Bearer ").ok_or(ApiError::Unauthorized)?;
    Uuid::parse_str(token.trim()).map_err(|_| ApiError::Unauthorized)
}

async fn lookup_session(pool: &PgPool, token: Uuid) -> Result<CurrentUser, ApiError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.username, u.is_admin, u.created_at
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = $1 AND s.expires_at > now()
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    user.map(CurrentUser::from).ok_or(ApiError::Unauthorized)
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Layered extractors (e.g. AdminUser) reuse the first lookup.
        if let Some(cached) = parts.extensions.get::<CurrentUser>() {
            debug!("Using cached session lookup for request");
            return Ok(cached.clone());
        }

        let app_state = AppState::from_ref(state);
        let token = bearer_token(parts)?;
        let user = lookup_session(&app_state.db_pool, token).await?;

        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// Wrapper extractor that additionally requires the platform admin flag.
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if user.is_admin {
            Ok(AdminUser(user))
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

/// Guard for moderation operations: passes for platform admins and for
/// members of the community whose role is moderator.
pub async fn require_moderator(
    pool: &PgPool,
    community_id: Uuid,
    user: &CurrentUser,
) -> Result<(), ApiError> {
    if user.is_admin {
        return Ok(());
    }
    match member_repository::get_member(pool, community_id, user.id).await? {
        Some(member) if member.role == MemberRole::Moderator => Ok(()),
        _ => Err(ApiError::Forbidden),
    }
}

/// Guard for author-or-moderator operations (post/comment deletion).
pub async fn require_author_or_moderator(
    pool: &PgPool,
    community_id: Uuid,
    author_id: Uuid,
    user: &CurrentUser,
) -> Result<(), ApiError> {
    if user.id == author_id {
        return Ok(());
    }
    require_moderator(pool, community_id, user).await
}
