use time::OffsetDateTime;
use uuid::Uuid;

use crate::app::error::{ServiceError, ServiceResult};
use crate::app::validation::required_text;
use crate::domain::user::User;
use crate::infra::store::Store;

pub const MAX_DISPLAY_NAME_CHARS: usize = 64;

#[derive(Clone)]
pub struct UserService {
    store: Store,
}

impl UserService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn create_user(&self, display_name: &str) -> ServiceResult<User> {
        let display_name = required_text("display_name", display_name, MAX_DISPLAY_NAME_CHARS)?;
        let user = User {
            id: Uuid::now_v7(),
            display_name,
            created_at: OffsetDateTime::now_utc(),
        };

        self.store.insert_user(&user).await.map_err(|err| {
            tracing::error!(error = ?err, "failed to create user");
            ServiceError::internal("failed to create user")
        })?;

        tracing::info!(user_id = %user.id, "user created");
        Ok(user)
    }

    /// `Ok(None)` when no such user exists.
    pub async fn find_user(&self, user_id: Uuid) -> ServiceResult<Option<User>> {
        self.store.get_user(user_id).await.map_err(|err| {
            tracing::error!(error = ?err, user_id = %user_id, "failed to fetch user");
            ServiceError::internal("failed to fetch user")
        })
    }

    pub async fn get_user_by_id(&self, user_id: Uuid) -> ServiceResult<User> {
        self.find_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user not found"))
    }
}
