use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod utils;

use handlers::{
    comment_handlers::{
        create_comment_handler, delete_comment_handler, list_comments_handler,
        update_comment_handler,
    },
    community_handlers::{
        add_moderator_handler, add_tag_handler, create_community_handler,
        delete_community_handler, get_community_handler, join_community_handler,
        leave_community_handler, list_communities_handler, list_tags_handler,
        remove_moderator_handler, remove_tag_handler, update_community_handler,
    },
    get_server_info_handler,
    post_handlers::{
        create_post_handler, delete_post_handler, feed_handler, get_post_handler,
        list_community_posts_handler, list_saved_posts_handler, list_user_posts_handler,
        update_post_handler,
    },
    reaction_handlers::{
        like_post_handler, save_post_handler, unlike_post_handler, unsave_post_handler,
    },
    vote_handlers::cast_vote_handler,
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub server_name: String,
}

/// Builds the application router. Mutating routes resolve the caller via
/// the bearer-session extractor; read-only routes are public.
pub fn create_router(db_pool: PgPool, server_name: String, max_body_bytes: usize) -> Router {
    let app_state = AppState {
        db_pool,
        server_name,
    };

    Router::new()
        .route("/", get(get_server_info_handler))
        .route(
            "/communities",
            post(create_community_handler).get(list_communities_handler),
        )
        .route(
            "/communities/:community_id",
            get(get_community_handler)
                .put(update_community_handler)
                .delete(delete_community_handler),
        )
        .route("/communities/:community_id/join", post(join_community_handler))
        .route("/communities/:community_id/leave", post(leave_community_handler))
        .route(
            "/communities/:community_id/tags",
            post(add_tag_handler).get(list_tags_handler),
        )
        .route(
            "/communities/:community_id/tags/:tag_id",
            delete(remove_tag_handler),
        )
        .route(
            "/communities/:community_id/moderators",
            post(add_moderator_handler),
        )
        .route(
            "/communities/:community_id/moderators/:user_id",
            delete(remove_moderator_handler),
        )
        .route(
            "/communities/:community_id/posts",
            post(create_post_handler).get(list_community_posts_handler),
        )
        .route("/posts", get(feed_handler))
        .route(
            "/posts/:post_id",
            get(get_post_handler)
                .put(update_post_handler)
                .delete(delete_post_handler),
        )
        .route(
            "/posts/:post_id/like",
            post(like_post_handler).delete(unlike_post_handler),
        )
        .route(
            "/posts/:post_id/save",
            post(save_post_handler).delete(unsave_post_handler),
        )
        .route("/posts/:post_id/vote", post(cast_vote_handler))
        .route(
            "/posts/:post_id/comments",
            post(create_comment_handler).get(list_comments_handler),
        )
        .route(
            "/comments/:comment_id",
            put(update_comment_handler).delete(delete_comment_handler),
        )
        .route("/users/:user_id/posts", get(list_user_posts_handler))
        .route("/users/:user_id/saved", get(list_saved_posts_handler))
        .with_state(app_state)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
}
