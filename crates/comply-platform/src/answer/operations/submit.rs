//! Submit Answer Use Case
//!
//! Upserts an organization's answer for a clause: the first submission
//! creates the answer, later submissions replace status and note.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::answer::entity::{Answer, AnswerStatus};
use crate::identity::entity::permissions;
use crate::shared::authorization::require_permission;
use crate::shared::error::Result;
use crate::shared::principal::Principal;
use crate::store::Store;
use crate::usecase::UnitOfWork;
use crate::validation::{ValidationFailure, ValidationPipeline, Validator};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerCommand {
    pub organization_id: String,
    pub clause_id: String,
    /// One of COMPLIANT, PARTIALLY_COMPLIANT, NON_COMPLIANT, NOT_APPLICABLE.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

struct SubmitAnswerRules;

#[async_trait]
impl Validator<SubmitAnswerCommand> for SubmitAnswerRules {
    async fn check(&self, command: &SubmitAnswerCommand) -> Result<Vec<ValidationFailure>> {
        let mut failures = Vec::new();
        if command.organization_id.trim().is_empty() {
            failures.push(ValidationFailure::new(
                "organizationId",
                "Organization id is required",
            ));
        }
        if command.clause_id.trim().is_empty() {
            failures.push(ValidationFailure::new("clauseId", "Clause id is required"));
        }
        if AnswerStatus::parse(&command.status).is_none() {
            failures.push(ValidationFailure::new(
                "status",
                "Status must be one of COMPLIANT, PARTIALLY_COMPLIANT, NON_COMPLIANT, NOT_APPLICABLE",
            ));
        }
        Ok(failures)
    }
}

pub struct SubmitAnswer {
    store: Arc<dyn Store>,
    pipeline: ValidationPipeline<SubmitAnswerCommand>,
}

impl SubmitAnswer {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            pipeline: ValidationPipeline::new().with(SubmitAnswerRules),
        }
    }

    pub async fn execute(
        &self,
        principal: &Principal,
        command: SubmitAnswerCommand,
    ) -> Result<Answer> {
        require_permission(principal, permissions::answers::SUBMIT)?;
        let command = self.pipeline.run(command).await?;

        let mut uow = UnitOfWork::new(self.store.clone(), principal.clone());
        uow.begin_transaction().await?;
        match self.apply(&mut uow, &command).await {
            Ok(answer) => {
                uow.complete().await?;
                uow.commit_transaction().await?;
                Ok(answer)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback_transaction().await {
                    error!(error = %rollback_err, "Rollback failed after submit-answer error");
                }
                Err(err)
            }
        }
    }

    async fn apply(&self, uow: &mut UnitOfWork, command: &SubmitAnswerCommand) -> Result<Answer> {
        let organization = uow.organizations().require(&command.organization_id).await?;
        let clause = uow.clauses().require(&command.clause_id).await?;

        // Validated by the pipeline above.
        let status = match AnswerStatus::parse(&command.status) {
            Some(status) => status,
            None => {
                return Err(crate::shared::error::PlatformError::bad_request(
                    "Unknown answer status",
                ))
            }
        };

        let existing = uow
            .answers()
            .find(|a| a.organization_id == organization.id && a.clause_id == clause.id)
            .await?;

        let answer = match existing {
            Some(mut answer) => {
                answer.status = status;
                answer.note = command.note.clone();
                answer.submitted_at = Utc::now();
                uow.answers().update(&answer).await?;
                answer
            }
            None => {
                let answer = Answer::new(
                    organization.id.clone(),
                    clause.id.clone(),
                    status,
                    command.note.clone(),
                );
                uow.answers().create(&answer).await?;
                answer
            }
        };

        Ok(answer)
    }
}
