pub mod authorization;
pub mod engagement;
pub mod error;
pub mod posts;
pub mod subforum_roles;
pub mod subforums;
pub mod users;
pub mod validation;

pub use error::{ServiceError, ServiceResult};
