use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named discussion area. Subforums form a forest through `parent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subforum {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}

/// Grants `user_id` moderation rights over `subforum_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubforumRole {
    pub id: Uuid,
    pub subforum_id: Uuid,
    pub user_id: Uuid,
}

impl SubforumRole {
    /// Copy of this grant bound to another subforum, under a fresh id.
    pub fn rebind(&self, subforum_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            subforum_id,
            user_id: self.user_id,
        }
    }
}
