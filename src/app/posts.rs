use time::OffsetDateTime;
use uuid::Uuid;

use crate::app::engagement::EngagementService;
use crate::app::error::{ServiceError, ServiceResult};
use crate::app::subforums::SubforumService;
use crate::app::users::UserService;
use crate::app::validation::required_text;
use crate::domain::post::{Post, PostView};
use crate::infra::store::Store;

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_CONTENT_CHARS: usize = 10_000;

/// The replaceable fields of a post. Identity, author and creation time are
/// owned by the service.
#[derive(Debug, Clone)]
pub struct PostInput {
    pub subforum_id: Uuid,
    pub title: String,
    pub content: String,
}

/// Equality filters for listing; unset fields match everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostFilter {
    pub user_id: Option<Uuid>,
    pub subforum_id: Option<Uuid>,
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        self.user_id.map_or(true, |id| post.user_id == id)
            && self.subforum_id.map_or(true, |id| post.subforum_id == id)
    }
}

#[derive(Clone)]
pub struct PostService {
    store: Store,
}

impl PostService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn create_post(&self, author_id: Uuid, input: PostInput) -> ServiceResult<Post> {
        let title = required_text("title", &input.title, MAX_TITLE_CHARS)?;
        let content = required_text("content", &input.content, MAX_CONTENT_CHARS)?;
        self.ensure_subforum_exists(input.subforum_id).await?;

        let post = Post {
            id: Uuid::now_v7(),
            subforum_id: input.subforum_id,
            user_id: author_id,
            title,
            content,
            created_at: OffsetDateTime::now_utc(),
        };

        self.store.insert_post(&post).await.map_err(|err| {
            tracing::error!(error = ?err, user_id = %author_id, "failed to create post");
            ServiceError::internal("failed to create post")
        })?;

        tracing::info!(post_id = %post.id, user_id = %author_id, subforum_id = %post.subforum_id, "post created");
        Ok(post)
    }

    pub async fn get_post_by_id(&self, post_id: Uuid) -> ServiceResult<Post> {
        let post = self.store.get_post(post_id).await.map_err(|err| {
            tracing::error!(error = ?err, post_id = %post_id, "failed to fetch post");
            ServiceError::internal("failed to fetch post")
        })?;
        post.ok_or_else(|| ServiceError::not_found("post not found"))
    }

    /// Every post accepted by `keep`, in creation order.
    pub async fn get_all_posts<F>(&self, keep: F) -> ServiceResult<Vec<Post>>
    where
        F: Fn(&Post) -> bool,
    {
        let posts = self.store.list_posts().await.map_err(|err| {
            tracing::error!(error = ?err, "failed to list posts");
            ServiceError::internal("failed to list posts")
        })?;
        Ok(posts.into_iter().filter(|post| keep(post)).collect())
    }

    /// Replaces subforum, title and content of `post_id`, then reads it back.
    pub async fn update_post(&self, post_id: Uuid, input: PostInput) -> ServiceResult<Post> {
        let current = self.get_post_by_id(post_id).await?;
        let title = required_text("title", &input.title, MAX_TITLE_CHARS)?;
        let content = required_text("content", &input.content, MAX_CONTENT_CHARS)?;
        if input.subforum_id != current.subforum_id {
            self.ensure_subforum_exists(input.subforum_id).await?;
        }

        let post = Post {
            subforum_id: input.subforum_id,
            title,
            content,
            ..current
        };
        let updated = self.store.update_post(&post).await.map_err(|err| {
            tracing::error!(error = ?err, post_id = %post_id, "failed to update post");
            ServiceError::internal("failed to update post")
        })?;
        if !updated {
            return Err(ServiceError::not_found("post not found"));
        }

        self.get_post_by_id(post_id).await
    }

    pub async fn delete_post(&self, post_id: Uuid) -> ServiceResult<()> {
        let deleted = self.store.delete_post(post_id).await.map_err(|err| {
            tracing::error!(error = ?err, post_id = %post_id, "failed to delete post");
            ServiceError::internal("failed to delete post")
        })?;

        if deleted {
            tracing::info!(post_id = %post_id, "post deleted");
            Ok(())
        } else {
            Err(ServiceError::not_found("post not found"))
        }
    }

    /// The post with its subforum, author, comments and likes.
    pub async fn get_post_view(&self, post_id: Uuid) -> ServiceResult<PostView> {
        let post = self.get_post_by_id(post_id).await?;
        let engagement = EngagementService::new(self.store.clone());
        let comments = engagement.list_comments(post.id).await?;
        let subforum = SubforumService::new(self.store.clone())
            .get_subforum_by_id(post.subforum_id)
            .await?;
        let user = UserService::new(self.store.clone())
            .find_user(post.user_id)
            .await?
            .ok_or_else(|| {
                tracing::error!(post_id = %post.id, user_id = %post.user_id, "post author missing");
                ServiceError::internal("failed to load post author")
            })?;
        let likes = engagement.list_likes(post.id).await?;

        Ok(PostView {
            id: post.id,
            title: post.title,
            content: post.content,
            created_at: post.created_at,
            subforum,
            user,
            comments,
            likes,
        })
    }

    async fn ensure_subforum_exists(&self, subforum_id: Uuid) -> ServiceResult<()> {
        match SubforumService::new(self.store.clone())
            .get_subforum_by_id(subforum_id)
            .await
        {
            Ok(_) => Ok(()),
            Err(ServiceError::NotFound(_)) => Err(ServiceError::bad_request("invalid subforum_id")),
            Err(err) => Err(err),
        }
    }
}
