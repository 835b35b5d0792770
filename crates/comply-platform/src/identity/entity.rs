//! Identity Entities
//!
//! Users, roles, permission definitions, and the role-permission links
//! that an upstream authentication layer expands into a principal's flat
//! permission claim set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::usecase::Entity;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// Unique login email.
    pub email: String,
    pub display_name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.into(),
            display_name: display_name.into(),
            active: true,
            created_at: Utc::now(),
        }
    }
}

impl Entity for User {
    const FAMILY: &'static str = "users";
    const NAME: &'static str = "User";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,
    /// Unique role code, e.g. "compliance-admin".
    pub code: String,
    pub name: String,
}

impl Role {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            code: code.into(),
            name: name.into(),
        }
    }
}

impl Entity for Role {
    const FAMILY: &'static str = "roles";
    const NAME: &'static str = "Role";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Definition of a grantable permission key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionDef {
    pub id: String,
    /// The capability string operations demand, e.g. "frameworks:create".
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PermissionDef {
    pub fn new(key: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            key: key.into(),
            description,
        }
    }
}

impl Entity for PermissionDef {
    const FAMILY: &'static str = "permissions";
    const NAME: &'static str = "Permission";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Grant of one permission to one role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePermission {
    pub id: String,
    pub role_id: String,
    pub permission_id: String,
    pub granted_at: DateTime<Utc>,
}

impl RolePermission {
    pub fn new(role_id: impl Into<String>, permission_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role_id: role_id.into(),
            permission_id: permission_id.into(),
            granted_at: Utc::now(),
        }
    }
}

impl Entity for RolePermission {
    const FAMILY: &'static str = "role_permissions";
    const NAME: &'static str = "RolePermission";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Permission keys demanded by the use-case operations.
/// Format: {area}:{action}.
pub mod permissions {
    pub mod frameworks {
        pub const VIEW: &str = "frameworks:view";
        pub const CREATE: &str = "frameworks:create";
        pub const UPDATE: &str = "frameworks:update";
        pub const DELETE: &str = "frameworks:delete";
        pub const ADD_VERSION: &str = "frameworks:add-version";
        pub const ADD_CLAUSE: &str = "frameworks:add-clause";

        pub const ALL: &[&str] = &[VIEW, CREATE, UPDATE, DELETE, ADD_VERSION, ADD_CLAUSE];
    }

    pub mod organizations {
        pub const VIEW: &str = "organizations:view";
        pub const CREATE: &str = "organizations:create";
        pub const ADD_DEPARTMENT: &str = "organizations:add-department";
        pub const ADD_MEMBER: &str = "organizations:add-member";

        pub const ALL: &[&str] = &[VIEW, CREATE, ADD_DEPARTMENT, ADD_MEMBER];
    }

    pub mod identity {
        pub const USER_CREATE: &str = "users:create";
        pub const PERMISSION_GRANT: &str = "roles:grant-permission";

        pub const ALL: &[&str] = &[USER_CREATE, PERMISSION_GRANT];
    }

    pub mod answers {
        pub const SUBMIT: &str = "answers:submit";

        pub const ALL: &[&str] = &[SUBMIT];
    }
}
