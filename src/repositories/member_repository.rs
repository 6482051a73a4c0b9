use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CommunityMember, MemberRole};

pub async fn get_member(
    pool: &PgPool,
    community_id: Uuid,
    user_id: Uuid,
) -> Result<Option<CommunityMember>, sqlx::Error> {
    sqlx::query_as::<_, CommunityMember>(
        r#"
        SELECT community_id, user_id, role, joined_at
        FROM community_members
        WHERE community_id = $1 AND user_id = $2
        "#,
    )
    .bind(community_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Inserts a membership row. The composite primary key rejects a duplicate
/// join with a unique violation.
pub async fn add_member(
    pool: &PgPool,
    community_id: Uuid,
    user_id: Uuid,
    role: MemberRole,
) -> Result<CommunityMember, sqlx::Error> {
    sqlx::query_as::<_, CommunityMember>(
        r#"
        INSERT INTO community_members (community_id, user_id, role)
        VALUES ($1, $2, $3)
        RETURNING community_id, user_id, role, joined_at
        "#,
    )
    .bind(community_id)
    .bind(user_id)
    .bind(role)
    .fetch_one(pool)
    .await
}

/// Deletes a membership row. Returns the number of rows affected.
pub async fn remove_member(
    pool: &PgPool,
    community_id: Uuid,
    user_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM community_members
        WHERE community_id = $1 AND user_id = $2
        "#,
    )
    .bind(community_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Updates a member's role, guarded by the previous role so promoting an
/// existing moderator (or demoting a plain member) affects zero rows.
pub async fn set_role(
    pool: &PgPool,
    community_id: Uuid,
    user_id: Uuid,
    from: MemberRole,
    to: MemberRole,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE community_members
        SET role = $4
        WHERE community_id = $1 AND user_id = $2 AND role = $3
        "#,
    )
    .bind(community_id)
    .bind(user_id)
    .bind(from)
    .bind(to)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
