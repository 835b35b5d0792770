//! Add Framework Version Use Case

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::framework::entity::FrameworkVersion;
use crate::identity::entity::permissions;
use crate::shared::authorization::require_permission;
use crate::shared::error::{PlatformError, Result};
use crate::shared::principal::Principal;
use crate::store::Store;
use crate::usecase::UnitOfWork;
use crate::validation::{ValidationFailure, ValidationPipeline, Validator};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddVersionCommand {
    pub framework_id: String,
    /// Revision label, e.g. "2022".
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_from: Option<DateTime<Utc>>,
}

struct AddVersionRules;

#[async_trait]
impl Validator<AddVersionCommand> for AddVersionRules {
    async fn check(&self, command: &AddVersionCommand) -> Result<Vec<ValidationFailure>> {
        let mut failures = Vec::new();
        if command.framework_id.trim().is_empty() {
            failures.push(ValidationFailure::new("frameworkId", "Framework id is required"));
        }
        if command.label.trim().is_empty() {
            failures.push(ValidationFailure::new("label", "Version label is required"));
        }
        Ok(failures)
    }
}

pub struct AddVersion {
    store: Arc<dyn Store>,
    pipeline: ValidationPipeline<AddVersionCommand>,
}

impl AddVersion {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            pipeline: ValidationPipeline::new().with(AddVersionRules),
        }
    }

    pub async fn execute(
        &self,
        principal: &Principal,
        command: AddVersionCommand,
    ) -> Result<FrameworkVersion> {
        require_permission(principal, permissions::frameworks::ADD_VERSION)?;
        let command = self.pipeline.run(command).await?;

        let mut uow = UnitOfWork::new(self.store.clone(), principal.clone());
        uow.begin_transaction().await?;
        match self.apply(&mut uow, &command).await {
            Ok(version) => {
                uow.complete().await?;
                uow.commit_transaction().await?;
                Ok(version)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback_transaction().await {
                    error!(error = %rollback_err, "Rollback failed after add-version error");
                }
                Err(err)
            }
        }
    }

    async fn apply(
        &self,
        uow: &mut UnitOfWork,
        command: &AddVersionCommand,
    ) -> Result<FrameworkVersion> {
        let framework = uow.frameworks().require(&command.framework_id).await?;

        let duplicate = uow
            .framework_versions()
            .find(|v| v.framework_id == framework.id && v.label == command.label)
            .await?
            .is_some();
        if duplicate {
            return Err(PlatformError::already_exists(
                "FrameworkVersion",
                "label",
                &command.label,
            ));
        }

        let version = FrameworkVersion::new(
            framework.id.clone(),
            command.label.trim(),
            command.effective_from,
        );
        uow.framework_versions().create(&version).await?;
        Ok(version)
    }
}
