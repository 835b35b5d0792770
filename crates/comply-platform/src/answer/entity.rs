//! Assessment Answer Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::usecase::Entity;

/// Compliance status an organization reports for one clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnswerStatus {
    Compliant,
    PartiallyCompliant,
    NonCompliant,
    NotApplicable,
}

impl AnswerStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "COMPLIANT" => Some(Self::Compliant),
            "PARTIALLY_COMPLIANT" => Some(Self::PartiallyCompliant),
            "NON_COMPLIANT" => Some(Self::NonCompliant),
            "NOT_APPLICABLE" => Some(Self::NotApplicable),
            _ => None,
        }
    }
}

/// One organization's answer to one clause of a framework version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: String,
    pub organization_id: String,
    pub clause_id: String,
    pub status: AnswerStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl Answer {
    pub fn new(
        organization_id: impl Into<String>,
        clause_id: impl Into<String>,
        status: AnswerStatus,
        note: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            organization_id: organization_id.into(),
            clause_id: clause_id.into(),
            status,
            note,
            submitted_at: Utc::now(),
        }
    }
}

impl Entity for Answer {
    const FAMILY: &'static str = "answers";
    const NAME: &'static str = "Answer";

    fn id(&self) -> &str {
        &self.id
    }
}
