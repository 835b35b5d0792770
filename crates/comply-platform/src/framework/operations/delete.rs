//! Delete Framework Use Case

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::identity::entity::permissions;
use crate::shared::authorization::require_permission;
use crate::shared::error::{PlatformError, Result};
use crate::shared::principal::Principal;
use crate::store::Store;
use crate::usecase::UnitOfWork;
use crate::validation::ValidationPipeline;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFrameworkCommand {
    pub framework_id: String,
}

pub struct DeleteFramework {
    store: Arc<dyn Store>,
    // No field-level rules; the pipeline passes the command through.
    pipeline: ValidationPipeline<DeleteFrameworkCommand>,
}

impl DeleteFramework {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            pipeline: ValidationPipeline::new(),
        }
    }

    /// Delete a framework that has no published versions.
    pub async fn execute(
        &self,
        principal: &Principal,
        command: DeleteFrameworkCommand,
    ) -> Result<()> {
        require_permission(principal, permissions::frameworks::DELETE)?;
        let command = self.pipeline.run(command).await?;

        let mut uow = UnitOfWork::new(self.store.clone(), principal.clone());
        uow.begin_transaction().await?;
        match self.apply(&mut uow, &command).await {
            Ok(()) => {
                uow.complete().await?;
                uow.commit_transaction().await?;
                Ok(())
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback_transaction().await {
                    error!(error = %rollback_err, "Rollback failed after delete error");
                }
                Err(err)
            }
        }
    }

    async fn apply(&self, uow: &mut UnitOfWork, command: &DeleteFrameworkCommand) -> Result<()> {
        let framework = uow.frameworks().require(&command.framework_id).await?;

        let has_versions = uow
            .framework_versions()
            .find(|v| v.framework_id == framework.id)
            .await?
            .is_some();
        if has_versions {
            return Err(PlatformError::bad_request(
                "Framework has published versions and cannot be deleted",
            ));
        }

        uow.frameworks().delete(&framework.id).await
    }
}
