pub mod comment_handlers;
pub mod community_handlers;
pub mod post_handlers;
pub mod reaction_handlers;
pub mod vote_handlers;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::models::ServerInfo;
use crate::AppState;

pub async fn get_server_info_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ServerInfo {
            name: state.server_name.clone(),
        }),
    )
}
