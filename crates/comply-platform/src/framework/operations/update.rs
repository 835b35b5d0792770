//! Update Framework Use Case

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::framework::entity::Framework;
use crate::identity::entity::permissions;
use crate::shared::authorization::require_permission;
use crate::shared::error::Result;
use crate::shared::principal::Principal;
use crate::store::Store;
use crate::usecase::UnitOfWork;
use crate::validation::{ValidationFailure, ValidationPipeline, Validator};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFrameworkCommand {
    pub framework_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

struct UpdateFrameworkRules;

#[async_trait]
impl Validator<UpdateFrameworkCommand> for UpdateFrameworkRules {
    async fn check(&self, command: &UpdateFrameworkCommand) -> Result<Vec<ValidationFailure>> {
        let mut failures = Vec::new();
        if command.framework_id.trim().is_empty() {
            failures.push(ValidationFailure::new("frameworkId", "Framework id is required"));
        }
        if command.name.trim().len() < 3 {
            failures.push(ValidationFailure::new(
                "name",
                "Name must be at least 3 characters",
            ));
        }
        Ok(failures)
    }
}

pub struct UpdateFramework {
    store: Arc<dyn Store>,
    pipeline: ValidationPipeline<UpdateFrameworkCommand>,
}

impl UpdateFramework {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            pipeline: ValidationPipeline::new().with(UpdateFrameworkRules),
        }
    }

    pub async fn execute(
        &self,
        principal: &Principal,
        command: UpdateFrameworkCommand,
    ) -> Result<Framework> {
        require_permission(principal, permissions::frameworks::UPDATE)?;
        let command = self.pipeline.run(command).await?;

        let mut uow = UnitOfWork::new(self.store.clone(), principal.clone());
        uow.begin_transaction().await?;
        match self.apply(&mut uow, &command).await {
            Ok(framework) => {
                uow.complete().await?;
                uow.commit_transaction().await?;
                Ok(framework)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback_transaction().await {
                    error!(error = %rollback_err, "Rollback failed after update error");
                }
                Err(err)
            }
        }
    }

    async fn apply(
        &self,
        uow: &mut UnitOfWork,
        command: &UpdateFrameworkCommand,
    ) -> Result<Framework> {
        let mut framework = uow.frameworks().require(&command.framework_id).await?;
        framework.name = command.name.trim().to_string();
        framework.description = command.description.clone();
        uow.frameworks().update(&framework).await?;
        Ok(framework)
    }
}
