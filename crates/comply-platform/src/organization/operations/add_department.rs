//! Add Department Use Case

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::identity::entity::permissions;
use crate::organization::entity::Department;
use crate::shared::authorization::require_permission;
use crate::shared::error::{PlatformError, Result};
use crate::shared::principal::Principal;
use crate::store::Store;
use crate::usecase::UnitOfWork;
use crate::validation::{ValidationFailure, ValidationPipeline, Validator};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDepartmentCommand {
    pub organization_id: String,
    pub name: String,
}

struct AddDepartmentRules;

#[async_trait]
impl Validator<AddDepartmentCommand> for AddDepartmentRules {
    async fn check(&self, command: &AddDepartmentCommand) -> Result<Vec<ValidationFailure>> {
        let mut failures = Vec::new();
        if command.organization_id.trim().is_empty() {
            failures.push(ValidationFailure::new(
                "organizationId",
                "Organization id is required",
            ));
        }
        if command.name.trim().is_empty() {
            failures.push(ValidationFailure::new("name", "Department name is required"));
        }
        Ok(failures)
    }
}

pub struct AddDepartment {
    store: Arc<dyn Store>,
    pipeline: ValidationPipeline<AddDepartmentCommand>,
}

impl AddDepartment {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            pipeline: ValidationPipeline::new().with(AddDepartmentRules),
        }
    }

    pub async fn execute(
        &self,
        principal: &Principal,
        command: AddDepartmentCommand,
    ) -> Result<Department> {
        require_permission(principal, permissions::organizations::ADD_DEPARTMENT)?;
        let command = self.pipeline.run(command).await?;

        let mut uow = UnitOfWork::new(self.store.clone(), principal.clone());
        uow.begin_transaction().await?;
        match self.apply(&mut uow, &command).await {
            Ok(department) => {
                uow.complete().await?;
                uow.commit_transaction().await?;
                Ok(department)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback_transaction().await {
                    error!(error = %rollback_err, "Rollback failed after add-department error");
                }
                Err(err)
            }
        }
    }

    async fn apply(
        &self,
        uow: &mut UnitOfWork,
        command: &AddDepartmentCommand,
    ) -> Result<Department> {
        let organization = uow.organizations().require(&command.organization_id).await?;

        let name = command.name.trim();
        let duplicate = uow
            .departments()
            .find(|d| d.organization_id == organization.id && d.name == name)
            .await?
            .is_some();
        if duplicate {
            return Err(PlatformError::already_exists("Department", "name", name));
        }

        let department = Department::new(organization.id.clone(), name);
        uow.departments().create(&department).await?;
        Ok(department)
    }
}
