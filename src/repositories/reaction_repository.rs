use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Reaction;

/// The two independent reaction sets. Both share the same lifecycle: a row
/// exists or it does not, and the composite key forbids duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionKind {
    Like,
    Save,
}

impl ReactionKind {
    fn table(self) -> &'static str {
        match self {
            ReactionKind::Like => "post_likes",
            ReactionKind::Save => "post_saves",
        }
    }

    pub fn noun(self) -> &'static str {
        match self {
            ReactionKind::Like => "like",
            ReactionKind::Save => "save",
        }
    }
}

/// Inserts the (post, user) reaction row. A duplicate surfaces as a
/// unique violation from the composite primary key.
pub async fn add_reaction(
    pool: &PgPool,
    kind: ReactionKind,
    post_id: Uuid,
    user_id: Uuid,
) -> Result<Reaction, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO {} (post_id, user_id)
        VALUES ($1, $2)
        RETURNING post_id, user_id, created_at
        "#,
        kind.table()
    );
    sqlx::query_as::<_, Reaction>(&sql)
        .bind(post_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
}

/// Deletes the reaction row if present. Returns the number of rows affected.
pub async fn remove_reaction(
    pool: &PgPool,
    kind: ReactionKind,
    post_id: Uuid,
    user_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let sql = format!(
        "DELETE FROM {} WHERE post_id = $1 AND user_id = $2",
        kind.table()
    );
    let result = sqlx::query(&sql)
        .bind(post_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
