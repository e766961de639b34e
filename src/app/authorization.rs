//! Who may change a post.
//!
//! A post may be updated or deleted by its author, or by anyone holding a
//! role on the subforum the post lives in.

use uuid::Uuid;

use crate::app::error::{ServiceError, ServiceResult};
use crate::app::posts::PostService;
use crate::app::subforum_roles::SubforumRoleService;
use crate::app::subforums::SubforumService;
use crate::domain::post::Post;
use crate::domain::subforum::SubforumRole;
use crate::infra::store::Store;

pub fn may_modify_post(actor_id: Uuid, post: &Post, moderators: &[SubforumRole]) -> bool {
    actor_id == post.user_id || moderators.iter().any(|role| role.user_id == actor_id)
}

#[derive(Clone)]
pub struct AuthorizationService {
    store: Store,
}

impl AuthorizationService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Resolves the post, its subforum and the subforum's moderators, then
    /// applies [`may_modify_post`].
    pub async fn check_post_authority(&self, actor_id: Uuid, post_id: Uuid) -> ServiceResult<()> {
        let post = PostService::new(self.store.clone())
            .get_post_by_id(post_id)
            .await?;
        let subforum = SubforumService::new(self.store.clone())
            .get_subforum_by_id(post.subforum_id)
            .await?;
        let moderators = SubforumRoleService::new(self.store.clone())
            .get_by_subforum_id(subforum.id)
            .await?;

        if may_modify_post(actor_id, &post, &moderators) {
            Ok(())
        } else {
            tracing::warn!(actor_id = %actor_id, post_id = %post_id, "post modification denied");
            Err(ServiceError::permission_denied(
                "only the author or a subforum moderator may modify this post",
            ))
        }
    }
}
