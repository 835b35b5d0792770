//! Create Framework Use Case

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::framework::entity::Framework;
use crate::identity::entity::permissions;
use crate::shared::authorization::require_permission;
use crate::shared::error::{PlatformError, Result};
use crate::shared::principal::Principal;
use crate::store::Store;
use crate::usecase::UnitOfWork;
use crate::validation::{ValidationFailure, ValidationPipeline, Validator};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFrameworkCommand {
    /// Stable short code, e.g. "iso-27001".
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

struct CreateFrameworkRules;

#[async_trait]
impl Validator<CreateFrameworkCommand> for CreateFrameworkRules {
    async fn check(&self, command: &CreateFrameworkCommand) -> Result<Vec<ValidationFailure>> {
        let mut failures = Vec::new();
        if command.code.trim().is_empty() {
            failures.push(ValidationFailure::new("code", "Code is required"));
        }
        if command.name.trim().len() < 3 {
            failures.push(ValidationFailure::new(
                "name",
                "Name must be at least 3 characters",
            ));
        }
        if command.name.len() > 120 {
            failures.push(ValidationFailure::new(
                "name",
                "Name must be at most 120 characters",
            ));
        }
        Ok(failures)
    }
}

pub struct CreateFramework {
    store: Arc<dyn Store>,
    pipeline: ValidationPipeline<CreateFrameworkCommand>,
}

impl CreateFramework {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            pipeline: ValidationPipeline::new().with(CreateFrameworkRules),
        }
    }

    /// Authorize, validate, then create the framework in one transaction.
    /// No store mutation happens unless both gates pass and the commit
    /// succeeds.
    pub async fn execute(
        &self,
        principal: &Principal,
        command: CreateFrameworkCommand,
    ) -> Result<Framework> {
        require_permission(principal, permissions::frameworks::CREATE)?;
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
                    error!(error = %rollback_err, "Rollback failed after create error");
                }
                Err(err)
            }
        }
    }

    async fn apply(
        &self,
        uow: &mut UnitOfWork,
        command: &CreateFrameworkCommand,
    ) -> Result<Framework> {
        if uow
            .frameworks()
            .find(|f| f.code == command.code)
            .await?
            .is_some()
        {
            return Err(PlatformError::already_exists(
                "Framework",
                "code",
                &command.code,
            ));
        }

        let framework = Framework::new(
            command.code.clone(),
            command.name.trim(),
            command.description.clone(),
        );
        uow.frameworks().create(&framework).await?;
        Ok(framework)
    }
}
