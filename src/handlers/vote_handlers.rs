use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    error::ApiError,
    models::Vote,
    repositories::{
        post_repository,
        vote_repository::{self, CastOutcome},
    },
    AppState,
};

#[derive(Deserialize)]
pub struct CastVotePayload {
    vote_type: i16,
}

#[derive(Serialize)]
pub struct CastVoteResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote: Option<Vote>,
    pub score: i64,
}

pub async fn cast_vote_handler(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    user: CurrentUser,
    Json(payload): Json<CastVotePayload>,
) -> Result<Response, ApiError> {
    if payload.vote_type != 1 && payload.vote_type != -1 {
        return Err(ApiError::validation_field(
            "vote_type",
            "vote_type must be -1 or 1",
        ));
    }

    post_repository::get_post_by_id(&state.db_pool, post_id)
        .await?
        .ok_or(ApiError::NotFound("Post"))?;

    let outcome =
        match vote_repository::cast_vote(&state.db_pool, post_id, user.id, payload.vote_type).await
        {
            Ok(outcome) => outcome,
            // Two concurrent first-time casts race on the composite key;
            // the loser is told to retry rather than creating a second row.
            Err(e) if ApiError::is_unique_violation(&e) => {
                return Err(ApiError::conflict("Vote already recorded"))
            }
            Err(e) => return Err(e.into()),
        };

    let score = vote_repository::get_score(&state.db_pool, post_id).await?;

    let (status, vote) = match outcome {
        CastOutcome::Created(vote) => ("created", Some(vote)),
        CastOutcome::Switched(vote) => ("updated", Some(vote)),
        CastOutcome::Removed => ("removed", None),
    };
    info!(post_id = %post_id, user_id = %user.id, status, score, "Cast vote");
    Ok((StatusCode::OK, Json(CastVoteResponse { status, vote, score })).into_response())
}
