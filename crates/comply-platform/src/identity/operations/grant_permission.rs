//! Grant Role Permission Use Case

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::identity::entity::{permissions, RolePermission};
use crate::shared::authorization::require_permission;
use crate::shared::error::{PlatformError, Result};
use crate::shared::principal::Principal;
use crate::store::Store;
use crate::usecase::UnitOfWork;
use crate::validation::{ValidationFailure, ValidationPipeline, Validator};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantPermissionCommand {
    pub role_id: String,
    pub permission_id: String,
}

struct GrantPermissionRules;

#[async_trait]
impl Validator<GrantPermissionCommand> for GrantPermissionRules {
    async fn check(&self, command: &GrantPermissionCommand) -> Result<Vec<ValidationFailure>> {
        let mut failures = Vec::new();
        if command.role_id.trim().is_empty() {
            failures.push(ValidationFailure::new("roleId", "Role id is required"));
        }
        if command.permission_id.trim().is_empty() {
            failures.push(ValidationFailure::new("permissionId", "Permission id is required"));
        }
        Ok(failures)
    }
}

pub struct GrantPermission {
    store: Arc<dyn Store>,
    pipeline: ValidationPipeline<GrantPermissionCommand>,
}

impl GrantPermission {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            pipeline: ValidationPipeline::new().with(GrantPermissionRules),
        }
    }

    pub async fn execute(
        &self,
        principal: &Principal,
        command: GrantPermissionCommand,
    ) -> Result<RolePermission> {
        require_permission(principal, permissions::identity::PERMISSION_GRANT)?;
        let command = self.pipeline.run(command).await?;

        let mut uow = UnitOfWork::new(self.store.clone(), principal.clone());
        uow.begin_transaction().await?;
        match self.apply(&mut uow, &command).await {
            Ok(grant) => {
                uow.complete().await?;
                uow.commit_transaction().await?;
                Ok(grant)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback_transaction().await {
                    error!(error = %rollback_err, "Rollback failed after grant-permission error");
                }
                Err(err)
            }
        }
    }

    async fn apply(
        &self,
        uow: &mut UnitOfWork,
        command: &GrantPermissionCommand,
    ) -> Result<RolePermission> {
        let role = uow.roles().require(&command.role_id).await?;
        let permission = uow.permissions().require(&command.permission_id).await?;

        let duplicate = uow
            .role_permissions()
            .find(|rp| rp.role_id == role.id && rp.permission_id == permission.id)
            .await?
            .is_some();
        if duplicate {
            return Err(PlatformError::already_exists(
                "RolePermission",
                "permissionId",
                &permission.id,
            ));
        }

        let grant = RolePermission::new(role.id.clone(), permission.id.clone());
        uow.role_permissions().create(&grant).await?;
        Ok(grant)
    }
}
