use anyhow::{anyhow, Result};
use std::collections::HashSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::domain::engagement::{Comment, Like};
use crate::domain::post::Post;
use crate::domain::subforum::{Subforum, SubforumRole};
use crate::domain::user::User;
use crate::infra::store::{EntityStore, SubforumWrite};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    subforums: Vec<Subforum>,
    roles: Vec<SubforumRole>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    likes: Vec<Like>,
}

impl Tables {
    fn has_role(&self, subforum_id: Uuid, user_id: Uuid) -> bool {
        self.roles
            .iter()
            .any(|role| role.subforum_id == subforum_id && role.user_id == user_id)
    }

    fn name_taken(&self, name: &str, except: Uuid) -> bool {
        self.subforums
            .iter()
            .any(|s| s.id != except && s.name == name)
    }

    fn remove_posts(&mut self, doomed: &HashSet<Uuid>) {
        self.posts.retain(|post| !doomed.contains(&post.id));
        self.comments.retain(|comment| !doomed.contains(&comment.post_id));
        self.likes.retain(|like| !doomed.contains(&like.post_id));
    }
}

/// In-process store for local runs and tests. Rows keep insertion order and
/// mirror the uniqueness and cascade rules of the SQL schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

#[axum::async_trait]
impl EntityStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        self.read().map(|_| ())
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut tables = self.write()?;
        if tables.users.iter().any(|existing| existing.id == user.id) {
            return Err(anyhow!("duplicate user id {}", user.id));
        }
        tables.users.push(user.clone());
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let tables = self.read()?;
        Ok(tables.users.iter().find(|user| user.id == id).cloned())
    }

    async fn insert_subforum(
        &self,
        subforum: &Subforum,
        roles: &[SubforumRole],
    ) -> Result<SubforumWrite> {
        let mut tables = self.write()?;
        if tables.subforums.iter().any(|existing| existing.id == subforum.id) {
            return Err(anyhow!("duplicate subforum id {}", subforum.id));
        }
        if tables.name_taken(&subforum.name, subforum.id) {
            return Ok(SubforumWrite::NameTaken);
        }
        tables.subforums.push(subforum.clone());
        for role in roles {
            if !tables.has_role(role.subforum_id, role.user_id) {
                tables.roles.push(role.clone());
            }
        }
        Ok(SubforumWrite::Written)
    }

    async fn get_subforum(&self, id: Uuid) -> Result<Option<Subforum>> {
        let tables = self.read()?;
        Ok(tables.subforums.iter().find(|s| s.id == id).cloned())
    }

    async fn get_subforum_by_name(&self, name: &str) -> Result<Option<Subforum>> {
        let tables = self.read()?;
        Ok(tables.subforums.iter().find(|s| s.name == name).cloned())
    }

    async fn list_subforums(&self) -> Result<Vec<Subforum>> {
        Ok(self.read()?.subforums.clone())
    }

    async fn list_subforums_by_parent(&self, parent_id: Uuid) -> Result<Vec<Subforum>> {
        let tables = self.read()?;
        Ok(tables
            .subforums
            .iter()
            .filter(|s| s.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn update_subforum(&self, subforum: &Subforum) -> Result<SubforumWrite> {
        let mut tables = self.write()?;
        if !tables.subforums.iter().any(|s| s.id == subforum.id) {
            return Ok(SubforumWrite::Missing);
        }
        if tables.name_taken(&subforum.name, subforum.id) {
            return Ok(SubforumWrite::NameTaken);
        }
        if let Some(existing) = tables.subforums.iter_mut().find(|s| s.id == subforum.id) {
            *existing = subforum.clone();
        }
        Ok(SubforumWrite::Written)
    }

    async fn delete_subforum(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.write()?;
        if !tables.subforums.iter().any(|s| s.id == id) {
            return Ok(false);
        }

        let mut doomed = HashSet::from([id]);
        loop {
            let before = doomed.len();
            let children: Vec<Uuid> = tables
                .subforums
                .iter()
                .filter(|s| s.parent_id.is_some_and(|parent| doomed.contains(&parent)))
                .map(|s| s.id)
                .collect();
            doomed.extend(children);
            if doomed.len() == before {
                break;
            }
        }

        let doomed_posts: HashSet<Uuid> = tables
            .posts
            .iter()
            .filter(|post| doomed.contains(&post.subforum_id))
            .map(|post| post.id)
            .collect();
        tables.remove_posts(&doomed_posts);
        tables.roles.retain(|role| !doomed.contains(&role.subforum_id));
        tables.subforums.retain(|s| !doomed.contains(&s.id));
        Ok(true)
    }

    async fn insert_role(&self, role: &SubforumRole) -> Result<bool> {
        let mut tables = self.write()?;
        if tables.has_role(role.subforum_id, role.user_id) {
            return Ok(false);
        }
        tables.roles.push(role.clone());
        Ok(true)
    }

    async fn list_roles_by_subforum(&self, subforum_id: Uuid) -> Result<Vec<SubforumRole>> {
        let tables = self.read()?;
        Ok(tables
            .roles
            .iter()
            .filter(|role| role.subforum_id == subforum_id)
            .cloned()
            .collect())
    }

    async fn delete_role(&self, subforum_id: Uuid, role_id: Uuid) -> Result<bool> {
        let mut tables = self.write()?;
        let before = tables.roles.len();
        tables
            .roles
            .retain(|role| !(role.id == role_id && role.subforum_id == subforum_id));
        Ok(tables.roles.len() < before)
    }

    async fn insert_post(&self, post: &Post) -> Result<()> {
        let mut tables = self.write()?;
        if tables.posts.iter().any(|existing| existing.id == post.id) {
            return Err(anyhow!("duplicate post id {}", post.id));
        }
        tables.posts.push(post.clone());
        Ok(())
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
        let tables = self.read()?;
        Ok(tables.posts.iter().find(|post| post.id == id).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        Ok(self.read()?.posts.clone())
    }

    async fn update_post(&self, post: &Post) -> Result<bool> {
        let mut tables = self.write()?;
        match tables.posts.iter_mut().find(|existing| existing.id == post.id) {
            Some(existing) => {
                *existing = post.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.write()?;
        if !tables.posts.iter().any(|post| post.id == id) {
            return Ok(false);
        }
        tables.remove_posts(&HashSet::from([id]));
        Ok(true)
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<()> {
        self.write()?.comments.push(comment.clone());
        Ok(())
    }

    async fn list_comments_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let tables = self.read()?;
        Ok(tables
            .comments
            .iter()
            .filter(|comment| comment.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn insert_like(&self, like: &Like) -> Result<bool> {
        let mut tables = self.write()?;
        if tables
            .likes
            .iter()
            .any(|existing| existing.post_id == like.post_id && existing.user_id == like.user_id)
        {
            return Ok(false);
        }
        tables.likes.push(like.clone());
        Ok(true)
    }

    async fn list_likes_by_post(&self, post_id: Uuid) -> Result<Vec<Like>> {
        let tables = self.read()?;
        Ok(tables
            .likes
            .iter()
            .filter(|like| like.post_id == post_id)
            .cloned()
            .collect())
    }
}
