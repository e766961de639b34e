use axum::Router;

use crate::AppState;

mod auth;
mod error;
mod extract;
mod handlers;
mod middleware;
mod routes;

pub use auth::{AdminToken, AuthUser};
pub use error::AppError;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health())
        .merge(routes::users())
        .merge(routes::subforums())
        .merge(routes::posts(state.clone()))
        .fallback(handlers::route_not_found)
        .with_state(state)
}
