use std::collections::HashSet;

use uuid::Uuid;

use crate::app::error::{ServiceError, ServiceResult};
use crate::app::subforum_roles::SubforumRoleService;
use crate::app::validation::{optional_text, required_text};
use crate::domain::subforum::{Subforum, SubforumRole};
use crate::infra::store::{Store, SubforumWrite};

pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Caller-supplied subforum fields. Ids are never taken from input.
#[derive(Debug, Clone)]
pub struct SubforumInput {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct SubforumService {
    store: Store,
}

impl SubforumService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Creates a subforum that starts out moderated by everyone moderating
    /// its parent. The subforum and the inherited grants are written in one
    /// store transaction.
    pub async fn create_subforum(&self, input: SubforumInput) -> ServiceResult<Subforum> {
        let name = required_text("name", &input.name, MAX_NAME_CHARS)?;
        let description =
            optional_text("description", input.description.as_deref(), MAX_DESCRIPTION_CHARS)?;

        let subforum = Subforum {
            id: Uuid::now_v7(),
            name,
            description,
            parent_id: input.parent_id,
        };

        let inherited = match input.parent_id {
            Some(parent_id) => {
                if self.find(parent_id).await?.is_none() {
                    return Err(ServiceError::bad_request("invalid parent_id"));
                }
                let parent_roles = SubforumRoleService::new(self.store.clone())
                    .get_by_subforum_id(parent_id)
                    .await?;
                inherit_roles(&parent_roles, subforum.id)
            }
            None => Vec::new(),
        };

        let written = self
            .store
            .insert_subforum(&subforum, &inherited)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, name = %subforum.name, "failed to create subforum");
                ServiceError::internal("failed to create subforum")
            })?;
        if written == SubforumWrite::NameTaken {
            return Err(ServiceError::conflict("subforum name already taken"));
        }

        tracing::info!(
            subforum_id = %subforum.id,
            parent_id = ?subforum.parent_id,
            inherited_roles = inherited.len(),
            "subforum created"
        );
        Ok(subforum)
    }

    pub async fn get_subforum_by_id(&self, id: Uuid) -> ServiceResult<Subforum> {
        self.find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("subforum not found"))
    }

    /// Direct children of `parent_id`; an empty list when it has none.
    pub async fn get_subforums_by_parent_id(&self, parent_id: Uuid) -> ServiceResult<Vec<Subforum>> {
        self.get_subforum_by_id(parent_id).await?;
        self.store
            .list_subforums_by_parent(parent_id)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, parent_id = %parent_id, "failed to list child subforums");
                ServiceError::internal("failed to list subforums")
            })
    }

    pub async fn get_all_subforums(&self) -> ServiceResult<Vec<Subforum>> {
        self.store.list_subforums().await.map_err(|err| {
            tracing::error!(error = ?err, "failed to list subforums");
            ServiceError::internal("failed to list subforums")
        })
    }

    pub async fn get_subforum_by_name(&self, name: &str) -> ServiceResult<Subforum> {
        self.find_by_name(name.trim())
            .await?
            .ok_or_else(|| ServiceError::not_found("subforum not found"))
    }

    /// Full replace of the mutable fields, then a read-back. Name clashes are
    /// reported by the store at write time.
    pub async fn update_subforum(&self, id: Uuid, input: SubforumInput) -> ServiceResult<Subforum> {
        self.get_subforum_by_id(id).await?;

        let name = required_text("name", &input.name, MAX_NAME_CHARS)?;
        let description =
            optional_text("description", input.description.as_deref(), MAX_DESCRIPTION_CHARS)?;

        if let Some(parent_id) = input.parent_id {
            self.ensure_valid_parent(id, parent_id).await?;
        }

        let subforum = Subforum {
            id,
            name,
            description,
            parent_id: input.parent_id,
        };
        let written = self.store.update_subforum(&subforum).await.map_err(|err| {
            tracing::error!(error = ?err, subforum_id = %id, "failed to update subforum");
            ServiceError::internal("failed to update subforum")
        })?;
        match written {
            SubforumWrite::Written => {}
            SubforumWrite::NameTaken => {
                return Err(ServiceError::conflict("subforum name already taken"))
            }
            SubforumWrite::Missing => return Err(ServiceError::not_found("subforum not found")),
        }

        self.get_subforum_by_id(id).await
    }

    pub async fn delete_subforum(&self, id: Uuid) -> ServiceResult<()> {
        let deleted = self.store.delete_subforum(id).await.map_err(|err| {
            tracing::error!(error = ?err, subforum_id = %id, "failed to delete subforum");
            ServiceError::internal("failed to delete subforum")
        })?;

        if deleted {
            tracing::info!(subforum_id = %id, "subforum deleted");
            Ok(())
        } else {
            Err(ServiceError::not_found("subforum not found"))
        }
    }

    async fn find(&self, id: Uuid) -> ServiceResult<Option<Subforum>> {
        self.store.get_subforum(id).await.map_err(|err| {
            tracing::error!(error = ?err, subforum_id = %id, "failed to fetch subforum");
            ServiceError::internal("failed to fetch subforum")
        })
    }

    async fn find_by_name(&self, name: &str) -> ServiceResult<Option<Subforum>> {
        self.store.get_subforum_by_name(name).await.map_err(|err| {
            tracing::error!(error = ?err, name = %name, "failed to fetch subforum by name");
            ServiceError::internal("failed to fetch subforum")
        })
    }

    /// The new parent must exist and must not sit below `id` in the tree.
    async fn ensure_valid_parent(&self, id: Uuid, parent_id: Uuid) -> ServiceResult<()> {
        if parent_id == id {
            return Err(ServiceError::bad_request("subforum cannot be its own parent"));
        }

        let mut seen = HashSet::new();
        let mut cursor = Some(parent_id);
        while let Some(current) = cursor {
            if current == id {
                return Err(ServiceError::bad_request("parent_id would create a cycle"));
            }
            if !seen.insert(current) {
                break;
            }
            match self.find(current).await? {
                Some(ancestor) => cursor = ancestor.parent_id,
                None if current == parent_id => {
                    return Err(ServiceError::bad_request("invalid parent_id"))
                }
                None => break,
            }
        }
        Ok(())
    }
}

/// One fresh grant per distinct parent role-holder, bound to `subforum_id`.
fn inherit_roles(parent_roles: &[SubforumRole], subforum_id: Uuid) -> Vec<SubforumRole> {
    let mut holders = HashSet::new();
    parent_roles
        .iter()
        .filter(|role| holders.insert(role.user_id))
        .map(|role| role.rebind(subforum_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::store::MemoryStore;
    use std::sync::Arc;

    fn input(name: &str) -> SubforumInput {
        SubforumInput {
            name: name.to_string(),
            description: None,
            parent_id: None,
        }
    }

    #[tokio::test]
    async fn concurrent_creates_with_one_name_yield_one_conflict() {
        let service = SubforumService::new(Arc::new(MemoryStore::new()));

        let (a, b) = tokio::join!(
            service.create_subforum(input("general")),
            service.create_subforum(input("general")),
        );

        let conflicts = [&a, &b]
            .iter()
            .filter(|r| matches!(r, Err(ServiceError::Conflict(_))))
            .count();
        assert_eq!(conflicts, 1);
        assert!(a.is_ok() || b.is_ok());
        assert_eq!(service.get_all_subforums().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rename_onto_taken_name_conflicts() {
        let service = SubforumService::new(Arc::new(MemoryStore::new()));
        service.create_subforum(input("general")).await.unwrap();
        let other = service.create_subforum(input("other")).await.unwrap();

        let err = service
            .update_subforum(other.id, input("general"))
            .await
            .unwrap_err();

        assert_eq!(err, ServiceError::conflict("subforum name already taken"));
        assert_eq!(service.get_subforum_by_id(other.id).await.unwrap().name, "other");
    }

    #[test]
    fn inherit_roles_rebinds_and_dedups() {
        let parent = Uuid::now_v7();
        let child = Uuid::now_v7();
        let (alice, bob) = (Uuid::now_v7(), Uuid::now_v7());
        let grant = |user_id| SubforumRole {
            id: Uuid::now_v7(),
            subforum_id: parent,
            user_id,
        };
        let parent_roles = vec![grant(alice), grant(bob), grant(alice)];

        let inherited = inherit_roles(&parent_roles, child);

        let holders: Vec<Uuid> = inherited.iter().map(|r| r.user_id).collect();
        assert_eq!(holders, vec![alice, bob]);
        assert!(inherited.iter().all(|r| r.subforum_id == child));
        assert!(inherited
            .iter()
            .all(|r| parent_roles.iter().all(|p| p.id != r.id)));
    }
}
