//! Audit Record Entity
//!
//! One durable record per committed mutation, written inside the same
//! transaction as the mutation it describes. An audit record exists iff
//! the mutation committed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::usecase::Entity;

/// Kind of mutation an audit record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub id: String,

    /// User who performed the action; absent for system-initiated work.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_user_id: Option<i64>,

    pub action: AuditAction,

    /// Entity family name, e.g. "Framework".
    pub entity_name: String,

    /// Key of the affected entity.
    pub entity_key: String,

    pub recorded_at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(
        actor_user_id: Option<i64>,
        action: AuditAction,
        entity_name: impl Into<String>,
        entity_key: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            actor_user_id,
            action,
            entity_name: entity_name.into(),
            entity_key: entity_key.into(),
            recorded_at: Utc::now(),
        }
    }
}

impl Entity for AuditRecord {
    const FAMILY: &'static str = "audit_records";
    const NAME: &'static str = "AuditRecord";

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_camel_case_fields() {
        let record = AuditRecord::new(Some(7), AuditAction::Create, "Framework", "fw-1");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["actorUserId"], 7);
        assert_eq!(json["action"], "CREATE");
        assert_eq!(json["entityName"], "Framework");
        assert_eq!(json["entityKey"], "fw-1");
    }
}
