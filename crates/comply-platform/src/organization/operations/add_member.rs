//! Add Organization Member Use Case

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::identity::entity::permissions;
use crate::organization::entity::Membership;
use crate::shared::authorization::require_permission;
use crate::shared::error::{PlatformError, Result};
use crate::shared::principal::Principal;
use crate::store::Store;
use crate::usecase::UnitOfWork;
use crate::validation::{ValidationFailure, ValidationPipeline, Validator};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberCommand {
    pub organization_id: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
}

struct AddMemberRules;

#[async_trait]
impl Validator<AddMemberCommand> for AddMemberRules {
    async fn check(&self, command: &AddMemberCommand) -> Result<Vec<ValidationFailure>> {
        let mut failures = Vec::new();
        if command.organization_id.trim().is_empty() {
            failures.push(ValidationFailure::new(
                "organizationId",
                "Organization id is required",
            ));
        }
        if command.user_id.trim().is_empty() {
            failures.push(ValidationFailure::new("userId", "User id is required"));
        }
        Ok(failures)
    }
}

pub struct AddMember {
    store: Arc<dyn Store>,
    pipeline: ValidationPipeline<AddMemberCommand>,
}

impl AddMember {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            pipeline: ValidationPipeline::new().with(AddMemberRules),
        }
    }

    pub async fn execute(
        &self,
        principal: &Principal,
        command: AddMemberCommand,
    ) -> Result<Membership> {
        require_permission(principal, permissions::organizations::ADD_MEMBER)?;
        let command = self.pipeline.run(command).await?;

        let mut uow = UnitOfWork::new(self.store.clone(), principal.clone());
        uow.begin_transaction().await?;
        match self.apply(&mut uow, &command).await {
            Ok(membership) => {
                uow.complete().await?;
                uow.commit_transaction().await?;
                Ok(membership)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback_transaction().await {
                    error!(error = %rollback_err, "Rollback failed after add-member error");
                }
                Err(err)
            }
        }
    }

    async fn apply(&self, uow: &mut UnitOfWork, command: &AddMemberCommand) -> Result<Membership> {
        let organization = uow.organizations().require(&command.organization_id).await?;
        let user = uow.users().require(&command.user_id).await?;

        if let Some(department_id) = &command.department_id {
            let department = uow.departments().require(department_id).await?;
            if department.organization_id != organization.id {
                return Err(PlatformError::bad_request(
                    "Department does not belong to the given organization",
                ));
            }
        }

        let duplicate = uow
            .memberships()
            .find(|m| m.organization_id == organization.id && m.user_id == user.id)
            .await?
            .is_some();
        if duplicate {
            return Err(PlatformError::already_exists("Membership", "userId", &user.id));
        }

        let membership = Membership::new(
            organization.id.clone(),
            user.id.clone(),
            command.department_id.clone(),
        );
        uow.memberships().create(&membership).await?;
        Ok(membership)
    }
}
