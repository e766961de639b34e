use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::app::authorization::AuthorizationService;
use crate::http::extract::PathParam;
use crate::http::{AppError, AuthUser};
use crate::AppState;

/// Lets a request through to a post-mutating handler only when the acting
/// user wrote the post or moderates its subforum. Must be installed with
/// `route_layer` so the `{id}` parameter is already bound.
pub async fn require_post_authority(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(post_id): PathParam<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    AuthorizationService::new(state.store.clone())
        .check_post_authority(auth.user_id, post_id)
        .await?;

    Ok(next.run(request).await)
}
