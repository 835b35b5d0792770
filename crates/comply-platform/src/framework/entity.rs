//! Compliance Framework Entities
//!
//! A framework (e.g. ISO 27001) is published in versions; each version
//! groups clauses into categories, and a clause may carry checklist items
//! that assessors tick off.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::usecase::Entity;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Framework {
    pub id: String,
    /// Stable short code, unique across frameworks (e.g. "iso-27001").
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Framework {
    pub fn new(code: impl Into<String>, name: impl Into<String>, description: Option<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), code, name, description)
    }

    pub fn with_id(
        id: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            name: name.into(),
            description,
            created_at: Utc::now(),
        }
    }
}

impl Entity for Framework {
    const FAMILY: &'static str = "frameworks";
    const NAME: &'static str = "Framework";

    fn id(&self) -> &str {
        &self.id
    }
}

/// One published revision of a framework.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkVersion {
    pub id: String,
    pub framework_id: String,
    /// Revision label, unique within its framework (e.g. "2022").
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_from: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl FrameworkVersion {
    pub fn new(
        framework_id: impl Into<String>,
        label: impl Into<String>,
        effective_from: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            framework_id: framework_id.into(),
            label: label.into(),
            effective_from,
            created_at: Utc::now(),
        }
    }
}

impl Entity for FrameworkVersion {
    const FAMILY: &'static str = "framework_versions";
    const NAME: &'static str = "FrameworkVersion";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Grouping of clauses within one framework version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub version_id: String,
    pub code: String,
    pub title: String,
    pub display_order: u32,
}

impl Category {
    pub fn new(
        version_id: impl Into<String>,
        code: impl Into<String>,
        title: impl Into<String>,
        display_order: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            version_id: version_id.into(),
            code: code.into(),
            title: title.into(),
            display_order,
        }
    }
}

impl Entity for Category {
    const FAMILY: &'static str = "categories";
    const NAME: &'static str = "Category";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A single requirement within a framework version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clause {
    pub id: String,
    pub version_id: String,
    pub category_id: String,
    /// Citation reference, e.g. "A.5.1".
    pub reference: String,
    pub title: String,
    pub text: String,
}

impl Clause {
    pub fn new(
        version_id: impl Into<String>,
        category_id: impl Into<String>,
        reference: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            version_id: version_id.into(),
            category_id: category_id.into(),
            reference: reference.into(),
            title: title.into(),
            text: text.into(),
        }
    }
}

impl Entity for Clause {
    const FAMILY: &'static str = "clauses";
    const NAME: &'static str = "Clause";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Checklist item attached to a clause.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckList {
    pub id: String,
    pub clause_id: String,
    pub text: String,
    pub display_order: u32,
}

impl CheckList {
    pub fn new(clause_id: impl Into<String>, text: impl Into<String>, display_order: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            clause_id: clause_id.into(),
            text: text.into(),
            display_order,
        }
    }
}

impl Entity for CheckList {
    const FAMILY: &'static str = "check_lists";
    const NAME: &'static str = "CheckList";

    fn id(&self) -> &str {
        &self.id
    }
}
