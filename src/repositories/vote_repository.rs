use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Vote, VoteState, VoteTransition};

/// What the cast did to the stored row.
#[derive(Debug)]
pub enum CastOutcome {
    Created(Vote),
    Switched(Vote),
    Removed,
}

/// Reconciles a requested vote against the caller's current row:
/// no row creates one, a different value switches it in place, the same
/// value deletes it. Runs as a single read-branch-write transaction; the
/// composite (post_id, user_id) key stops duplicate rows under a retry
/// race (the loser gets a unique violation).
pub async fn cast_vote(
    pool: &PgPool,
    post_id: Uuid,
    user_id: Uuid,
    vote_type: i16,
) -> Result<CastOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let current: Option<i16> = sqlx::query_scalar(
        r#"
        SELECT vote_type FROM post_votes
        WHERE post_id = $1 AND user_id = $2
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let outcome = match VoteState::from_stored(current).cast(vote_type) {
        VoteTransition::Create => {
            let vote = sqlx::query_as::<_, Vote>(
                r#"
                INSERT INTO post_votes (post_id, user_id, vote_type)
                VALUES ($1, $2, $3)
                RETURNING post_id, user_id, vote_type, created_at
                "#,
            )
            .bind(post_id)
            .bind(user_id)
            .bind(vote_type)
            .fetch_one(&mut *tx)
            .await?;
            CastOutcome::Created(vote)
        }
        VoteTransition::Switch => {
            let vote = sqlx::query_as::<_, Vote>(
                r#"
                UPDATE post_votes
                SET vote_type = $3
                WHERE post_id = $1 AND user_id = $2
                RETURNING post_id, user_id, vote_type, created_at
                "#,
            )
            .bind(post_id)
            .bind(user_id)
            .bind(vote_type)
            .fetch_one(&mut *tx)
            .await?;
            CastOutcome::Switched(vote)
        }
        VoteTransition::Remove => {
            sqlx::query(
                r#"
                DELETE FROM post_votes
                WHERE post_id = $1 AND user_id = $2
                "#,
            )
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
            CastOutcome::Removed
        }
    };

    tx.commit().await?;
    Ok(outcome)
}

/// A post's score is the sum of its vote rows, computed at read time.
pub async fn get_score(pool: &PgPool, post_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(vote_type), 0)::BIGINT
        FROM post_votes
        WHERE post_id = $1
        "#,
    )
    .bind(post_id)
    .fetch_one(pool)
    .await
}
