//! Identity use cases.

pub mod create_user;
pub mod grant_permission;

pub use create_user::{CreateUser, CreateUserCommand};
pub use grant_permission::{GrantPermission, GrantPermissionCommand};
