//! Create Organization Use Case

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::identity::entity::permissions;
use crate::organization::entity::Organization;
use crate::shared::authorization::require_permission;
use crate::shared::error::{PlatformError, Result};
use crate::shared::principal::Principal;
use crate::store::Store;
use crate::usecase::UnitOfWork;
use crate::validation::{ValidationFailure, ValidationPipeline, Validator};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationCommand {
    pub registration_code: String,
    pub name: String,
}

struct CreateOrganizationRules;

#[async_trait]
impl Validator<CreateOrganizationCommand> for CreateOrganizationRules {
    async fn check(&self, command: &CreateOrganizationCommand) -> Result<Vec<ValidationFailure>> {
        let mut failures = Vec::new();
        if command.registration_code.trim().is_empty() {
            failures.push(ValidationFailure::new(
                "registrationCode",
                "Registration code is required",
            ));
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

pub struct CreateOrganization {
    store: Arc<dyn Store>,
    pipeline: ValidationPipeline<CreateOrganizationCommand>,
}

impl CreateOrganization {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            pipeline: ValidationPipeline::new().with(CreateOrganizationRules),
        }
    }

    pub async fn execute(
        &self,
        principal: &Principal,
        command: CreateOrganizationCommand,
    ) -> Result<Organization> {
        require_permission(principal, permissions::organizations::CREATE)?;
        let command = self.pipeline.run(command).await?;

        let mut uow = UnitOfWork::new(self.store.clone(), principal.clone());
        uow.begin_transaction().await?;
        match self.apply(&mut uow, &command).await {
            Ok(organization) => {
                uow.complete().await?;
                uow.commit_transaction().await?;
                Ok(organization)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback_transaction().await {
                    error!(error = %rollback_err, "Rollback failed after create-organization error");
                }
                Err(err)
            }
        }
    }

    async fn apply(
        &self,
        uow: &mut UnitOfWork,
        command: &CreateOrganizationCommand,
    ) -> Result<Organization> {
        let code = command.registration_code.trim();
        let duplicate = uow
            .organizations()
            .find(|o| o.registration_code == code)
            .await?
            .is_some();
        if duplicate {
            return Err(PlatformError::already_exists(
                "Organization",
                "registrationCode",
                code,
            ));
        }

        let organization = Organization::new(code, command.name.trim());
        uow.organizations().create(&organization).await?;
        Ok(organization)
    }
}
