use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Community, CommunityTag, MemberRole};
use crate::utils::PaginationParams;

pub struct CreateCommunityData {
    pub name: String,
    pub description: String,
}

/// Inserts a community and its creator's moderator membership in one
/// transaction so a half-created community can never exist.
pub async fn create_community(
    pool: &PgPool,
    creator_id: Uuid,
    data: CreateCommunityData,
) -> Result<Community, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let community = sqlx::query_as::<_, Community>(
        r#"
        INSERT INTO communities (name, description, created_by)
        VALUES ($1, $2, $3)
        RETURNING id, name, description, created_by, created_at
        "#,
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(creator_id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO community_members (community_id, user_id, role)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(community.id)
    .bind(creator_id)
    .bind(MemberRole::Moderator)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(community)
}

pub async fn get_community_by_id(
    pool: &PgPool,
    community_id: Uuid,
) -> Result<Option<Community>, sqlx::Error> {
    sqlx::query_as::<_, Community>(
        r#"
        SELECT id, name, description, created_by, created_at
        FROM communities
        WHERE id = $1
        "#,
    )
    .bind(community_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_communities(
    pool: &PgPool,
    pagination: &PaginationParams,
) -> Result<Vec<Community>, sqlx::Error> {
    sqlx::query_as::<_, Community>(
        r#"
        SELECT id, name, description, created_by, created_at
        FROM communities
        ORDER BY name ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(pagination.limit() as i64)
    .bind(pagination.offset() as i64)
    .fetch_all(pool)
    .await
}

pub async fn update_description(
    pool: &PgPool,
    community_id: Uuid,
    description: String,
) -> Result<Option<Community>, sqlx::Error> {
    sqlx::query_as::<_, Community>(
        r#"
        UPDATE communities
        SET description = $1
        WHERE id = $2
        RETURNING id, name, description, created_by, created_at
        "#,
    )
    .bind(description)
    .bind(community_id)
    .fetch_optional(pool)
    .await
}

/// Deletes a community; members, tags and posts cascade in the database.
pub async fn delete_community(pool: &PgPool, community_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM communities WHERE id = $1")
        .bind(community_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn add_tag(
    pool: &PgPool,
    community_id: Uuid,
    name: String,
) -> Result<CommunityTag, sqlx::Error> {
    sqlx::query_as::<_, CommunityTag>(
        r#"
        INSERT INTO community_tags (community_id, name)
        VALUES ($1, $2)
        RETURNING id, community_id, name
        "#,
    )
    .bind(community_id)
    .bind(name)
    .fetch_one(pool)
    .await
}

pub async fn remove_tag(
    pool: &PgPool,
    community_id: Uuid,
    tag_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM community_tags
        WHERE id = $1 AND community_id = $2
        "#,
    )
    .bind(tag_id)
    .bind(community_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn list_tags(
    pool: &PgPool,
    community_id: Uuid,
) -> Result<Vec<CommunityTag>, sqlx::Error> {
    sqlx::query_as::<_, CommunityTag>(
        r#"
        SELECT id, community_id, name
        FROM community_tags
        WHERE community_id = $1
        ORDER BY name ASC
        "#,
    )
    .bind(community_id)
    .fetch_all(pool)
    .await
}
