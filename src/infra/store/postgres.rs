use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::engagement::{Comment, Like};
use crate::domain::post::Post;
use crate::domain::subforum::{Subforum, SubforumRole};
use crate::domain::user::User;
use crate::infra::db::Db;
use crate::infra::store::{EntityStore, SubforumWrite};

/// Production store backed by the schema in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    db: Db,
}

impl PgStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

/// `23505` is Postgres' `unique_violation`.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        display_name: row.get("display_name"),
        created_at: row.get("created_at"),
    }
}

fn subforum_from_row(row: &PgRow) -> Subforum {
    Subforum {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        parent_id: row.get("parent_id"),
    }
}

fn role_from_row(row: &PgRow) -> SubforumRole {
    SubforumRole {
        id: row.get("id"),
        subforum_id: row.get("subforum_id"),
        user_id: row.get("user_id"),
    }
}

fn post_from_row(row: &PgRow) -> Post {
    Post {
        id: row.get("id"),
        subforum_id: row.get("subforum_id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        content: row.get("content"),
        created_at: row.get("created_at"),
    }
}

fn comment_from_row(row: &PgRow) -> Comment {
    Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        user_id: row.get("user_id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
    }
}

fn like_from_row(row: &PgRow) -> Like {
    Like {
        id: row.get("id"),
        post_id: row.get("post_id"),
        user_id: row.get("user_id"),
        value: row.get("value"),
        created_at: row.get("created_at"),
    }
}

#[axum::async_trait]
impl EntityStore for PgStore {
    async fn ping(&self) -> Result<()> {
        self.db.ping().await
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        sqlx::query("INSERT INTO users (id, display_name, created_at) VALUES ($1, $2, $3)")
            .bind(user.id)
            .bind(&user.display_name)
            .bind(user.created_at)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, display_name, created_at FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn insert_subforum(
        &self,
        subforum: &Subforum,
        roles: &[SubforumRole],
    ) -> Result<SubforumWrite> {
        let mut tx = self.db.pool().begin().await?;
        let inserted = sqlx::query(
            "INSERT INTO subforums (id, name, description, parent_id) VALUES ($1, $2, $3, $4)",
        )
        .bind(subforum.id)
        .bind(&subforum.name)
        .bind(&subforum.description)
        .bind(subforum.parent_id)
        .execute(&mut *tx)
        .await;
        match inserted {
            Ok(_) => {}
            // Dropping `tx` rolls back.
            Err(err) if is_unique_violation(&err) => return Ok(SubforumWrite::NameTaken),
            Err(err) => return Err(err.into()),
        }

        for role in roles {
            sqlx::query(
                "INSERT INTO subforum_roles (id, subforum_id, user_id) VALUES ($1, $2, $3) \
                 ON CONFLICT (subforum_id, user_id) DO NOTHING",
            )
            .bind(role.id)
            .bind(role.subforum_id)
            .bind(role.user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(SubforumWrite::Written)
    }

    async fn get_subforum(&self, id: Uuid) -> Result<Option<Subforum>> {
        let row = sqlx::query(
            "SELECT id, name, description, parent_id FROM subforums WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row.as_ref().map(subforum_from_row))
    }

    async fn get_subforum_by_name(&self, name: &str) -> Result<Option<Subforum>> {
        let row = sqlx::query(
            "SELECT id, name, description, parent_id FROM subforums WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row.as_ref().map(subforum_from_row))
    }

    async fn list_subforums(&self) -> Result<Vec<Subforum>> {
        let rows = sqlx::query(
            "SELECT id, name, description, parent_id FROM subforums \
             ORDER BY created_at, id",
        )
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.iter().map(subforum_from_row).collect())
    }

    async fn list_subforums_by_parent(&self, parent_id: Uuid) -> Result<Vec<Subforum>> {
        let rows = sqlx::query(
            "SELECT id, name, description, parent_id FROM subforums \
             WHERE parent_id = $1 \
             ORDER BY created_at, id",
        )
        .bind(parent_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.iter().map(subforum_from_row).collect())
    }

    async fn update_subforum(&self, subforum: &Subforum) -> Result<SubforumWrite> {
        let result = sqlx::query(
            "UPDATE subforums SET name = $2, description = $3, parent_id = $4 WHERE id = $1",
        )
        .bind(subforum.id)
        .bind(&subforum.name)
        .bind(&subforum.description)
        .bind(subforum.parent_id)
        .execute(self.db.pool())
        .await;
        match result {
            Ok(done) if done.rows_affected() > 0 => Ok(SubforumWrite::Written),
            Ok(_) => Ok(SubforumWrite::Missing),
            Err(err) if is_unique_violation(&err) => Ok(SubforumWrite::NameTaken),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_subforum(&self, id: Uuid) -> Result<bool> {
        // Children, roles, posts, comments and likes go with it via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM subforums WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_role(&self, role: &SubforumRole) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO subforum_roles (id, subforum_id, user_id) VALUES ($1, $2, $3) \
             ON CONFLICT (subforum_id, user_id) DO NOTHING",
        )
        .bind(role.id)
        .bind(role.subforum_id)
        .bind(role.user_id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_roles_by_subforum(&self, subforum_id: Uuid) -> Result<Vec<SubforumRole>> {
        let rows = sqlx::query(
            "SELECT id, subforum_id, user_id FROM subforum_roles \
             WHERE subforum_id = $1 \
             ORDER BY created_at, id",
        )
        .bind(subforum_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.iter().map(role_from_row).collect())
    }

    async fn delete_role(&self, subforum_id: Uuid, role_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM subforum_roles WHERE id = $1 AND subforum_id = $2")
            .bind(role_id)
            .bind(subforum_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_post(&self, post: &Post) -> Result<()> {
        sqlx::query(
            "INSERT INTO posts (id, subforum_id, user_id, title, content, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(post.id)
        .bind(post.subforum_id)
        .bind(post.user_id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query(
            "SELECT id, subforum_id, user_id, title, content, created_at \
             FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row.as_ref().map(post_from_row))
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        let rows = sqlx::query(
            "SELECT id, subforum_id, user_id, title, content, created_at \
             FROM posts \
             ORDER BY created_at, id",
        )
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn update_post(&self, post: &Post) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE posts SET subforum_id = $2, title = $3, content = $4 WHERE id = $1",
        )
        .bind(post.id)
        .bind(post.subforum_id)
        .bind(&post.title)
        .bind(&post.content)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<()> {
        sqlx::query(
            "INSERT INTO comments (id, post_id, user_id, content, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(comment.id)
        .bind(comment.post_id)
        .bind(comment.user_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn list_comments_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT id, post_id, user_id, content, created_at \
             FROM comments \
             WHERE post_id = $1 \
             ORDER BY created_at, id",
        )
        .bind(post_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.iter().map(comment_from_row).collect())
    }

    async fn insert_like(&self, like: &Like) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO likes (id, post_id, user_id, value, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (post_id, user_id) DO NOTHING",
        )
        .bind(like.id)
        .bind(like.post_id)
        .bind(like.user_id)
        .bind(like.value)
        .bind(like.created_at)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_likes_by_post(&self, post_id: Uuid) -> Result<Vec<Like>> {
        let rows = sqlx::query(
            "SELECT id, post_id, user_id, value, created_at \
             FROM likes \
             WHERE post_id = $1 \
             ORDER BY created_at, id",
        )
        .bind(post_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows.iter().map(like_from_row).collect())
    }
}
