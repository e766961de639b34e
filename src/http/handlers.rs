use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::engagement::EngagementService;
use crate::app::posts::{PostFilter, PostInput, PostService};
use crate::app::subforum_roles::SubforumRoleService;
use crate::app::subforums::{SubforumInput, SubforumService};
use crate::app::users::UserService;
use crate::domain::engagement::{Comment, Like};
use crate::domain::post::{Post, PostView};
use crate::domain::subforum::{Subforum, SubforumRole};
use crate::domain::user::User;
use crate::http::extract::{JsonBody, PathParam, QueryParams};
use crate::http::{AdminToken, AppError, AuthUser};
use crate::AppState;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = match state.store.ping().await {
        Ok(()) => "ok",
        Err(err) => {
            tracing::warn!(error = ?err, "store ping failed");
            "degraded"
        }
    };

    Json(HealthResponse { status })
}

pub async fn route_not_found() -> AppError {
    AppError::not_found("route not found")
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub display_name: String,
}

pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = UserService::new(state.store.clone())
        .create_user(&payload.display_name)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    PathParam(id): PathParam<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<User>, AppError> {
    let user = UserService::new(state.store.clone())
        .get_user_by_id(id)
        .await?;
    Ok(Json(user))
}

// ---------------------------------------------------------------------------
// Subforums
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct SubforumRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

impl From<SubforumRequest> for SubforumInput {
    fn from(request: SubforumRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            parent_id: request.parent_id,
        }
    }
}

#[derive(Deserialize)]
pub struct SubforumListQuery {
    pub name: Option<String>,
}

/// All subforums, or the one named by `?name=`.
pub async fn list_subforums(
    QueryParams(query): QueryParams<SubforumListQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Subforum>>, AppError> {
    let service = SubforumService::new(state.store.clone());
    let subforums = match query.name {
        Some(name) => vec![service.get_subforum_by_name(&name).await?],
        None => service.get_all_subforums().await?,
    };
    Ok(Json(subforums))
}

pub async fn create_subforum(
    _admin: AdminToken,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SubforumRequest>,
) -> Result<(StatusCode, Json<Subforum>), AppError> {
    let subforum = SubforumService::new(state.store.clone())
        .create_subforum(payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(subforum)))
}

pub async fn get_subforum(
    PathParam(id): PathParam<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Subforum>, AppError> {
    let subforum = SubforumService::new(state.store.clone())
        .get_subforum_by_id(id)
        .await?;
    Ok(Json(subforum))
}

pub async fn update_subforum(
    PathParam(id): PathParam<Uuid>,
    _admin: AdminToken,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SubforumRequest>,
) -> Result<Json<Subforum>, AppError> {
    let subforum = SubforumService::new(state.store.clone())
        .update_subforum(id, payload.into())
        .await?;
    Ok(Json(subforum))
}

pub async fn delete_subforum(
    PathParam(id): PathParam<Uuid>,
    _admin: AdminToken,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    SubforumService::new(state.store.clone())
        .delete_subforum(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_child_subforums(
    PathParam(id): PathParam<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Subforum>>, AppError> {
    let children = SubforumService::new(state.store.clone())
        .get_subforums_by_parent_id(id)
        .await?;
    Ok(Json(children))
}

// ---------------------------------------------------------------------------
// Subforum roles
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct GrantRoleRequest {
    pub user_id: Uuid,
}

pub async fn list_subforum_roles(
    PathParam(id): PathParam<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubforumRole>>, AppError> {
    SubforumService::new(state.store.clone())
        .get_subforum_by_id(id)
        .await?;
    let roles = SubforumRoleService::new(state.store.clone())
        .get_by_subforum_id(id)
        .await?;
    Ok(Json(roles))
}

pub async fn grant_subforum_role(
    PathParam(id): PathParam<Uuid>,
    _admin: AdminToken,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<GrantRoleRequest>,
) -> Result<(StatusCode, Json<SubforumRole>), AppError> {
    let role = SubforumRoleService::new(state.store.clone())
        .create(id, payload.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(role)))
}

pub async fn revoke_subforum_role(
    PathParam((id, role_id)): PathParam<(Uuid, Uuid)>,
    _admin: AdminToken,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    SubforumRoleService::new(state.store.clone())
        .delete(id, role_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

/// Post fields accepted from clients. `id` and author fields in the body are
/// ignored: identity comes from the path, authorship from the acting user.
#[derive(Deserialize)]
pub struct PostRequest {
    pub subforum_id: Uuid,
    pub title: String,
    pub content: String,
}

impl From<PostRequest> for PostInput {
    fn from(request: PostRequest) -> Self {
        Self {
            subforum_id: request.subforum_id,
            title: request.title,
            content: request.content,
        }
    }
}

#[derive(Deserialize)]
pub struct PostListQuery {
    pub userid: Option<Uuid>,
    pub subforumid: Option<Uuid>,
}

pub async fn list_posts(
    QueryParams(query): QueryParams<PostListQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Post>>, AppError> {
    let filter = PostFilter {
        user_id: query.userid,
        subforum_id: query.subforumid,
    };
    let posts = PostService::new(state.store.clone())
        .get_all_posts(|post| filter.matches(post))
        .await?;
    Ok(Json(posts))
}

pub async fn get_post(
    PathParam(id): PathParam<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<PostView>, AppError> {
    let view = PostService::new(state.store.clone())
        .get_post_view(id)
        .await?;
    Ok(Json(view))
}

pub async fn create_post(
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<PostRequest>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    let post = PostService::new(state.store.clone())
        .create_post(auth.user_id, payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update_post(
    PathParam(id): PathParam<Uuid>,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<PostRequest>,
) -> Result<Json<Post>, AppError> {
    let post = PostService::new(state.store.clone())
        .update_post(id, payload.into())
        .await?;
    Ok(Json(post))
}

pub async fn delete_post(
    PathParam(id): PathParam<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    PostService::new(state.store.clone())
        .delete_post(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Comments & likes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

#[derive(Deserialize)]
pub struct LikeRequest {
    #[serde(default = "default_like_value")]
    pub value: i16,
}

fn default_like_value() -> i16 {
    1
}

pub async fn list_post_comments(
    PathParam(id): PathParam<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Comment>>, AppError> {
    PostService::new(state.store.clone())
        .get_post_by_id(id)
        .await?;
    let comments = EngagementService::new(state.store.clone())
        .list_comments(id)
        .await?;
    Ok(Json(comments))
}

pub async fn comment_post(
    PathParam(id): PathParam<Uuid>,
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let comment = EngagementService::new(state.store.clone())
        .comment_post(auth.user_id, id, &payload.content)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn list_post_likes(
    PathParam(id): PathParam<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Like>>, AppError> {
    PostService::new(state.store.clone())
        .get_post_by_id(id)
        .await?;
    let likes = EngagementService::new(state.store.clone())
        .list_likes(id)
        .await?;
    Ok(Json(likes))
}

pub async fn like_post(
    PathParam(id): PathParam<Uuid>,
    auth: AuthUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LikeRequest>,
) -> Result<(StatusCode, Json<Like>), AppError> {
    let like = EngagementService::new(state.store.clone())
        .like_post(auth.user_id, id, payload.value)
        .await?;
    Ok((StatusCode::CREATED, Json(like)))
}
