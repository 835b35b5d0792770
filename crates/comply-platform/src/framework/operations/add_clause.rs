//! Add Clause Use Case
//!
//! Creates a clause and its checklist items as one atomic unit: either
//! the clause and every item become durable, or none do.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::framework::entity::{CheckList, Clause};
use crate::identity::entity::permissions;
use crate::shared::authorization::require_permission;
use crate::shared::error::{PlatformError, Result};
use crate::shared::principal::Principal;
use crate::store::Store;
use crate::usecase::UnitOfWork;
use crate::validation::{ValidationFailure, ValidationPipeline, Validator};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddClauseCommand {
    pub version_id: String,
    pub category_id: String,
    /// Citation reference, unique within the version (e.g. "A.5.1").
    pub reference: String,
    pub title: String,
    pub text: String,
    /// Checklist item texts, in display order.
    #[serde(default)]
    pub checklist: Vec<String>,
}

struct AddClauseRules;

#[async_trait]
impl Validator<AddClauseCommand> for AddClauseRules {
    async fn check(&self, command: &AddClauseCommand) -> Result<Vec<ValidationFailure>> {
        let mut failures = Vec::new();
        if command.reference.trim().is_empty() {
            failures.push(ValidationFailure::new("reference", "Reference is required"));
        }
        if command.title.trim().len() < 3 {
            failures.push(ValidationFailure::new(
                "title",
                "Title must be at least 3 characters",
            ));
        }
        for (index, item) in command.checklist.iter().enumerate() {
            if item.trim().is_empty() {
                failures.push(ValidationFailure::new(
                    format!("checklist[{}]", index),
                    "Checklist item must not be blank",
                ));
            }
        }
        Ok(failures)
    }
}

pub struct AddClause {
    store: Arc<dyn Store>,
    pipeline: ValidationPipeline<AddClauseCommand>,
}

impl AddClause {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            pipeline: ValidationPipeline::new().with(AddClauseRules),
        }
    }

    pub async fn execute(&self, principal: &Principal, command: AddClauseCommand) -> Result<Clause> {
        require_permission(principal, permissions::frameworks::ADD_CLAUSE)?;
        let command = self.pipeline.run(command).await?;

        let mut uow = UnitOfWork::new(self.store.clone(), principal.clone());
        uow.begin_transaction().await?;
        match self.apply(&mut uow, &command).await {
            Ok(clause) => {
                uow.complete().await?;
                uow.commit_transaction().await?;
                Ok(clause)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback_transaction().await {
                    error!(error = %rollback_err, "Rollback failed after add-clause error");
                }
                Err(err)
            }
        }
    }

    async fn apply(&self, uow: &mut UnitOfWork, command: &AddClauseCommand) -> Result<Clause> {
        let version = uow.framework_versions().require(&command.version_id).await?;
        let category = uow.categories().require(&command.category_id).await?;
        if category.version_id != version.id {
            return Err(PlatformError::bad_request(
                "Category does not belong to the given framework version",
            ));
        }

        let duplicate = uow
            .clauses()
            .find(|c| c.version_id == version.id && c.reference == command.reference)
            .await?
            .is_some();
        if duplicate {
            return Err(PlatformError::already_exists(
                "Clause",
                "reference",
                &command.reference,
            ));
        }

        let clause = Clause::new(
            version.id.clone(),
            category.id.clone(),
            command.reference.trim(),
            command.title.trim(),
            command.text.clone(),
        );
        uow.clauses().create(&clause).await?;

        for (index, text) in command.checklist.iter().enumerate() {
            let item = CheckList::new(clause.id.clone(), text.trim(), index as u32);
            uow.check_lists().create(&item).await?;
        }

        Ok(clause)
    }
}
