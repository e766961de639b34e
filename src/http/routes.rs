use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::http::handlers;
use crate::http::middleware::post_authority::require_post_authority;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn users() -> Router<AppState> {
    Router::new()
        .route("/users", post(handlers::create_user))
        .route("/users/:id", get(handlers::get_user))
}

pub fn subforums() -> Router<AppState> {
    Router::new()
        .route(
            "/subforums",
            get(handlers::list_subforums).post(handlers::create_subforum),
        )
        .route(
            "/subforums/:id",
            get(handlers::get_subforum)
                .put(handlers::update_subforum)
                .delete(handlers::delete_subforum),
        )
        .route("/subforums/:id/children", get(handlers::list_child_subforums))
        .route(
            "/subforums/:id/roles",
            get(handlers::list_subforum_roles).post(handlers::grant_subforum_role),
        )
        .route(
            "/subforums/:id/roles/:role_id",
            delete(handlers::revoke_subforum_role),
        )
}

/// Reads and creates are open; update and delete pass through the post
/// authority check first.
pub fn posts(state: AppState) -> Router<AppState> {
    let gated = put(handlers::update_post)
        .delete(handlers::delete_post)
        .route_layer(middleware::from_fn_with_state(state, require_post_authority));

    Router::new()
        .route("/posts", get(handlers::list_posts).post(handlers::create_post))
        .route("/posts/:id", get(handlers::get_post).merge(gated))
        .route(
            "/posts/:id/comments",
            get(handlers::list_post_comments).post(handlers::comment_post),
        )
        .route(
            "/posts/:id/likes",
            get(handlers::list_post_likes).post(handlers::like_post),
        )
}
