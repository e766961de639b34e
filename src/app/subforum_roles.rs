use uuid::Uuid;

use crate::app::error::{ServiceError, ServiceResult};
use crate::app::subforums::SubforumService;
use crate::app::users::UserService;
use crate::domain::subforum::SubforumRole;
use crate::infra::store::Store;

#[derive(Clone)]
pub struct SubforumRoleService {
    store: Store,
}

impl SubforumRoleService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Role grants of a subforum in grant order. Unknown subforums have none.
    pub async fn get_by_subforum_id(&self, subforum_id: Uuid) -> ServiceResult<Vec<SubforumRole>> {
        self.store
            .list_roles_by_subforum(subforum_id)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, subforum_id = %subforum_id, "failed to list subforum roles");
                ServiceError::internal("failed to list subforum roles")
            })
    }

    pub async fn create(&self, subforum_id: Uuid, user_id: Uuid) -> ServiceResult<SubforumRole> {
        SubforumService::new(self.store.clone())
            .get_subforum_by_id(subforum_id)
            .await?;
        if UserService::new(self.store.clone())
            .find_user(user_id)
            .await?
            .is_none()
        {
            return Err(ServiceError::bad_request("invalid user_id"));
        }

        let role = SubforumRole {
            id: Uuid::now_v7(),
            subforum_id,
            user_id,
        };
        let inserted = self.store.insert_role(&role).await.map_err(|err| {
            tracing::error!(error = ?err, subforum_id = %subforum_id, user_id = %user_id, "failed to create subforum role");
            ServiceError::internal("failed to create subforum role")
        })?;

        if !inserted {
            return Err(ServiceError::conflict("user already holds a role on this subforum"));
        }

        tracing::info!(subforum_id = %subforum_id, user_id = %user_id, role_id = %role.id, "subforum role granted");
        Ok(role)
    }

    pub async fn delete(&self, subforum_id: Uuid, role_id: Uuid) -> ServiceResult<()> {
        let deleted = self
            .store
            .delete_role(subforum_id, role_id)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, subforum_id = %subforum_id, role_id = %role_id, "failed to delete subforum role");
                ServiceError::internal("failed to delete subforum role")
            })?;

        if deleted {
            tracing::info!(subforum_id = %subforum_id, role_id = %role_id, "subforum role revoked");
            Ok(())
        } else {
            Err(ServiceError::not_found("role not found"))
        }
    }
}
