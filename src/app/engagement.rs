use time::OffsetDateTime;
use uuid::Uuid;

use crate::app::error::{ServiceError, ServiceResult};
use crate::app::posts::PostService;
use crate::app::validation::required_text;
use crate::domain::engagement::{Comment, Like};
use crate::infra::store::Store;

pub const MAX_COMMENT_CHARS: usize = 5_000;

#[derive(Clone)]
pub struct EngagementService {
    store: Store,
}

impl EngagementService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn comment_post(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        content: &str,
    ) -> ServiceResult<Comment> {
        let content = required_text("content", content, MAX_COMMENT_CHARS)?;
        PostService::new(self.store.clone())
            .get_post_by_id(post_id)
            .await?;

        let comment = Comment {
            id: Uuid::now_v7(),
            post_id,
            user_id,
            content,
            created_at: OffsetDateTime::now_utc(),
        };
        self.store.insert_comment(&comment).await.map_err(|err| {
            tracing::error!(error = ?err, post_id = %post_id, user_id = %user_id, "failed to create comment");
            ServiceError::internal("failed to create comment")
        })?;

        Ok(comment)
    }

    pub async fn like_post(&self, user_id: Uuid, post_id: Uuid, value: i16) -> ServiceResult<Like> {
        if value != 1 && value != -1 {
            return Err(ServiceError::bad_request("value must be 1 or -1"));
        }
        PostService::new(self.store.clone())
            .get_post_by_id(post_id)
            .await?;

        let like = Like {
            id: Uuid::now_v7(),
            post_id,
            user_id,
            value,
            created_at: OffsetDateTime::now_utc(),
        };
        let inserted = self.store.insert_like(&like).await.map_err(|err| {
            tracing::error!(error = ?err, post_id = %post_id, user_id = %user_id, "failed to like post");
            ServiceError::internal("failed to like post")
        })?;

        if inserted {
            Ok(like)
        } else {
            Err(ServiceError::conflict("post already liked"))
        }
    }

    pub async fn list_comments(&self, post_id: Uuid) -> ServiceResult<Vec<Comment>> {
        self.store
            .list_comments_by_post(post_id)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, post_id = %post_id, "failed to list comments");
                ServiceError::internal("failed to list comments")
            })
    }

    pub async fn list_likes(&self, post_id: Uuid) -> ServiceResult<Vec<Like>> {
        self.store.list_likes_by_post(post_id).await.map_err(|err| {
            tracing::error!(error = ?err, post_id = %post_id, "failed to list likes");
            ServiceError::internal("failed to list likes")
        })
    }
}
