//! Create User Use Case

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::identity::entity::{permissions, User};
use crate::shared::authorization::require_permission;
use crate::shared::error::{PlatformError, Result};
use crate::shared::principal::Principal;
use crate::store::Store;
use crate::usecase::UnitOfWork;
use crate::validation::{ValidationFailure, ValidationPipeline, Validator};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserCommand {
    pub email: String,
    pub display_name: String,
}

struct CreateUserRules;

#[async_trait]
impl Validator<CreateUserCommand> for CreateUserRules {
    async fn check(&self, command: &CreateUserCommand) -> Result<Vec<ValidationFailure>> {
        let mut failures = Vec::new();
        let email = command.email.trim();
        if email.is_empty() {
            failures.push(ValidationFailure::new("email", "Email is required"));
        } else if !email.contains('@') {
            failures.push(ValidationFailure::new("email", "Email must be a valid address"));
        }
        if command.display_name.trim().is_empty() {
            failures.push(ValidationFailure::new("displayName", "Display name is required"));
        }
        Ok(failures)
    }
}

pub struct CreateUser {
    store: Arc<dyn Store>,
    pipeline: ValidationPipeline<CreateUserCommand>,
}

impl CreateUser {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            pipeline: ValidationPipeline::new().with(CreateUserRules),
        }
    }

    pub async fn execute(&self, principal: &Principal, command: CreateUserCommand) -> Result<User> {
        require_permission(principal, permissions::identity::USER_CREATE)?;
        let command = self.pipeline.run(command).await?;

        let mut uow = UnitOfWork::new(self.store.clone(), principal.clone());
        uow.begin_transaction().await?;
        match self.apply(&mut uow, &command).await {
            Ok(user) => {
                uow.complete().await?;
                uow.commit_transaction().await?;
                Ok(user)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback_transaction().await {
                    error!(error = %rollback_err, "Rollback failed after create-user error");
                }
                Err(err)
            }
        }
    }

    async fn apply(&self, uow: &mut UnitOfWork, command: &CreateUserCommand) -> Result<User> {
        let email = command.email.trim();
        let duplicate = uow.users().find(|u| u.email == email).await?.is_some();
        if duplicate {
            return Err(PlatformError::already_exists("User", "email", email));
        }

        let user = User::new(email, command.display_name.trim());
        uow.users().create(&user).await?;
        Ok(user)
    }
}
