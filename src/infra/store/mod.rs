//! Persistence boundary for every forum entity.
//!
//! Services only talk to [`EntityStore`]. Lookups return `Ok(None)` for a
//! missing row and reserve `Err` for backend failures, so callers can tell
//! "not found" apart from "store broken".

use anyhow::Result;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::engagement::{Comment, Like};
use crate::domain::post::Post;
use crate::domain::subforum::{Subforum, SubforumRole};
use crate::domain::user::User;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type Store = Arc<dyn EntityStore>;

/// Outcome of writing a subforum row. Name uniqueness is enforced here, at
/// write time, so concurrent writers cannot both claim a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubforumWrite {
    Written,
    NameTaken,
    Missing,
}

#[axum::async_trait]
pub trait EntityStore: Send + Sync {
    async fn ping(&self) -> Result<()>;

    async fn insert_user(&self, user: &User) -> Result<()>;
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Persists a subforum together with its initial role grants, all or
    /// nothing. Grants duplicating a `(subforum, user)` pair are skipped.
    /// Nothing is written when the name is taken.
    async fn insert_subforum(
        &self,
        subforum: &Subforum,
        roles: &[SubforumRole],
    ) -> Result<SubforumWrite>;
    async fn get_subforum(&self, id: Uuid) -> Result<Option<Subforum>>;
    async fn get_subforum_by_name(&self, name: &str) -> Result<Option<Subforum>>;
    async fn list_subforums(&self) -> Result<Vec<Subforum>>;
    async fn list_subforums_by_parent(&self, parent_id: Uuid) -> Result<Vec<Subforum>>;
    async fn update_subforum(&self, subforum: &Subforum) -> Result<SubforumWrite>;
    /// Removes the subforum, its descendants, and everything hanging off them.
    async fn delete_subforum(&self, id: Uuid) -> Result<bool>;

    /// Returns `false` when the user already holds a role on that subforum.
    async fn insert_role(&self, role: &SubforumRole) -> Result<bool>;
    async fn list_roles_by_subforum(&self, subforum_id: Uuid) -> Result<Vec<SubforumRole>>;
    async fn delete_role(&self, subforum_id: Uuid, role_id: Uuid) -> Result<bool>;

    async fn insert_post(&self, post: &Post) -> Result<()>;
    async fn get_post(&self, id: Uuid) -> Result<Option<Post>>;
    async fn list_posts(&self) -> Result<Vec<Post>>;
    async fn update_post(&self, post: &Post) -> Result<bool>;
    async fn delete_post(&self, id: Uuid) -> Result<bool>;

    async fn insert_comment(&self, comment: &Comment) -> Result<()>;
    async fn list_comments_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>>;

    /// Returns `false` when the user already liked the post.
    async fn insert_like(&self, like: &Like) -> Result<bool>;
    async fn list_likes_by_post(&self, post_id: Uuid) -> Result<Vec<Like>>;
}
