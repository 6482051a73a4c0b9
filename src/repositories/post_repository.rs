use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Post, PostDetail};
use crate::utils::PaginationParams;

pub struct CreatePostData {
    pub title: String,
    pub content: Option<String>,
}

pub async fn create_post(
    pool: &PgPool,
    community_id: Uuid,
    author_id: Uuid,
    data: CreatePostData,
) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (community_id, author_id, title, content)
        VALUES ($1, $2, $3, $4)
        RETURNING id, community_id, author_id, title, content, created_at, updated_at
        "#,
    )
    .bind(community_id)
    .bind(author_id)
    .bind(&data.title)
    .bind(&data.content)
    .fetch_one(pool)
    .await
}

pub async fn get_post_by_id(pool: &PgPool, post_id: Uuid) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, community_id, author_id, title, content, created_at, updated_at
        FROM posts
        WHERE id = $1
        "#,
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await
}

// Aggregates are counted at read time from the related tables.
const DETAIL_COLUMNS: &str = r#"
    p.id, p.community_id, p.author_id, p.title, p.content, p.created_at, p.updated_at,
    (SELECT COUNT(*) FROM post_likes l WHERE l.post_id = p.id) AS like_count,
    (SELECT COUNT(*) FROM post_saves s WHERE s.post_id = p.id) AS save_count,
    (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count,
    COALESCE((SELECT SUM(v.vote_type) FROM post_votes v WHERE v.post_id = p.id), 0)::BIGINT AS score
"#;

pub async fn get_post_detail(
    pool: &PgPool,
    post_id: Uuid,
) -> Result<Option<PostDetail>, sqlx::Error> {
    let sql = format!("SELECT {DETAIL_COLUMNS} FROM posts p WHERE p.id = $1");
    sqlx::query_as::<_, PostDetail>(&sql)
        .bind(post_id)
        .fetch_optional(pool)
        .await
}

/// Escapes LIKE metacharacters so a search term matches literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Site-wide feed, newest first, with an optional title substring filter.
pub async fn get_feed(
    pool: &PgPool,
    search: Option<&str>,
    pagination: &PaginationParams,
) -> Result<Vec<PostDetail>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {DETAIL_COLUMNS}
        FROM posts p
        WHERE ($1::TEXT IS NULL OR p.title ILIKE '%' || $1 || '%' ESCAPE '\')
        ORDER BY p.created_at DESC
        LIMIT $2 OFFSET $3
        "#
    );
    sqlx::query_as::<_, PostDetail>(&sql)
        .bind(search.map(escape_like))
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(pool)
        .await
}

pub async fn get_posts_by_community(
    pool: &PgPool,
    community_id: Uuid,
    pagination: &PaginationParams,
) -> Result<Vec<PostDetail>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {DETAIL_COLUMNS}
        FROM posts p
        WHERE p.community_id = $1
        ORDER BY p.created_at DESC
        LIMIT $2 OFFSET $3
        "#
    );
    sqlx::query_as::<_, PostDetail>(&sql)
        .bind(community_id)
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(pool)
        .await
}

pub async fn get_posts_by_author(
    pool: &PgPool,
    author_id: Uuid,
    pagination: &PaginationParams,
) -> Result<Vec<PostDetail>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {DETAIL_COLUMNS}
        FROM posts p
        WHERE p.author_id = $1
        ORDER BY p.created_at DESC
        LIMIT $2 OFFSET $3
        "#
    );
    sqlx::query_as::<_, PostDetail>(&sql)
        .bind(author_id)
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(pool)
        .await
}

/// Posts a user has bookmarked, most recent save first.
pub async fn get_posts_saved_by(
    pool: &PgPool,
    user_id: Uuid,
    pagination: &PaginationParams,
) -> Result<Vec<PostDetail>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {DETAIL_COLUMNS}
        FROM posts p
        JOIN post_saves ps ON ps.post_id = p.id
        WHERE ps.user_id = $1
        ORDER BY ps.created_at DESC
        LIMIT $2 OFFSET $3
        "#
    );
    sqlx::query_as::<_, PostDetail>(&sql)
        .bind(user_id)
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(pool)
        .await
}

pub async fn update_content(
    pool: &PgPool,
    post_id: Uuid,
    content: Option<String>,
) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts
        SET content = $1, updated_at = now()
        WHERE id = $2
        RETURNING id, community_id, author_id, title, content, created_at, updated_at
        "#,
    )
    .bind(content)
    .bind(post_id)
    .fetch_optional(pool)
    .await
}

/// Deletes a post; likes, saves, votes and comments cascade in the database.
pub async fn delete_post(pool: &PgPool, post_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
