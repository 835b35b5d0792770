//! Organization Entities
//!
//! Organizations are assessed against frameworks; departments subdivide
//! them and memberships tie users to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::usecase::Entity;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    /// Company registration code, unique across organizations.
    pub registration_code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(registration_code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            registration_code: registration_code.into(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

impl Entity for Organization {
    const FAMILY: &'static str = "organizations";
    const NAME: &'static str = "Organization";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub organization_id: String,
    pub name: String,
}

impl Department {
    pub fn new(organization_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            organization_id: organization_id.into(),
            name: name.into(),
        }
    }
}

impl Entity for Department {
    const FAMILY: &'static str = "departments";
    const NAME: &'static str = "Department";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A user's membership in an organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: String,
    pub organization_id: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(
        organization_id: impl Into<String>,
        user_id: impl Into<String>,
        department_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            organization_id: organization_id.into(),
            user_id: user_id.into(),
            department_id,
            joined_at: Utc::now(),
        }
    }
}

impl Entity for Membership {
    const FAMILY: &'static str = "memberships";
    const NAME: &'static str = "Membership";

    fn id(&self) -> &str {
        &self.id
    }
}
