//! Unit of Work
//!
//! Owns one transactional boundary across the full repository set. All
//! repository writes issued through one instance become durable together
//! or not at all. One instance serves exactly one logical request and one
//! transaction lifecycle; reuse after a terminal state fails fast.
//!
//! Lifecycle: `NotStarted -> Active -> {Committed | RolledBack}`.
//!
//! Two usage shapes, mirroring the store contract:
//!
//! ```ignore
//! // Explicit transaction
//! let mut uow = UnitOfWork::new(store, principal);
//! uow.begin_transaction().await?;
//! uow.frameworks().create(&framework).await?;
//! uow.complete().await?;            // flush count
//! uow.commit_transaction().await?;  // durable
//!
//! // Implicit: first write opens the session, complete() commits it
//! let mut uow = UnitOfWork::new(store, principal);
//! uow.frameworks().create(&framework).await?;
//! let affected = uow.complete().await?;
//! ```
//!
//! Dropping an instance while Active drops the engine session, which rolls
//! the transaction back; a cancelled request can never leave a transaction
//! dangling.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error};

use super::repository::{Entity, Repo};
use crate::answer::entity::Answer;
use crate::audit::entity::AuditRecord;
use crate::framework::entity::{Category, CheckList, Clause, Framework, FrameworkVersion};
use crate::identity::entity::{PermissionDef, Role, RolePermission, User};
use crate::organization::entity::{Department, Membership, Organization};
use crate::shared::error::{PlatformError, Result};
use crate::shared::principal::Principal;
use crate::store::{ChangeOp, Store, StoreSession};

/// Lifecycle state of the transaction scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    NotStarted,
    Active,
    Committed,
    RolledBack,
}

impl fmt::Display for TxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TxState::NotStarted => "NotStarted",
            TxState::Active => "Active",
            TxState::Committed => "Committed",
            TxState::RolledBack => "RolledBack",
        };
        f.write_str(name)
    }
}

pub struct UnitOfWork {
    store: Arc<dyn Store>,
    principal: Principal,
    state: TxState,
    explicit: bool,
    session: Option<Box<dyn StoreSession>>,
    affected: u64,
}

impl UnitOfWork {
    /// A fresh unit of work for one request, acting as the given principal.
    pub fn new(store: Arc<dyn Store>, principal: Principal) -> Self {
        Self {
            store,
            principal,
            state: TxState::NotStarted,
            explicit: false,
            session: None,
            affected: 0,
        }
    }

    pub fn state(&self) -> TxState {
        self.state
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Open an explicit transaction. `NotStarted -> Active`.
    ///
    /// Starting a second transaction while one is Active, or after a
    /// terminal state, is a programming error and fails fast. A store that
    /// cannot open a transaction surfaces as `Infrastructure`.
    pub async fn begin_transaction(&mut self) -> Result<()> {
        if self.state != TxState::NotStarted {
            return Err(PlatformError::transaction_state(
                "begin_transaction",
                self.state.to_string(),
            ));
        }
        self.session = Some(self.store.begin().await?);
        self.state = TxState::Active;
        self.explicit = true;
        debug!("Transaction started");
        Ok(())
    }

    /// Finish the pending unit of change and report the applied-op count.
    ///
    /// Inside an explicit transaction this only reports the count; the
    /// caller must follow with `commit_transaction`. Without one, the
    /// implicitly opened session is committed here (`Active -> Committed`).
    pub async fn complete(&mut self) -> Result<u64> {
        match self.state {
            TxState::NotStarted => Ok(0),
            TxState::Active if self.explicit => Ok(self.affected),
            TxState::Active => {
                let session = self.take_session("complete")?;
                match session.commit().await {
                    Ok(()) => {
                        self.state = TxState::Committed;
                        debug!(affected = self.affected, "Implicit unit of change committed");
                        Ok(self.affected)
                    }
                    Err(err) => {
                        // Session contract: a failed commit is already
                        // rolled back.
                        self.state = TxState::RolledBack;
                        error!(error = %err, "Implicit commit failed, transaction rolled back");
                        Err(err)
                    }
                }
            }
            state => Err(PlatformError::transaction_state("complete", state.to_string())),
        }
    }

    /// Commit the explicit transaction. `Active -> Committed`.
    ///
    /// On store-level failure the session is rolled back before the error
    /// surfaces, so the caller always observes either commit-confirmed or
    /// rollback-confirmed.
    pub async fn commit_transaction(&mut self) -> Result<()> {
        if self.state != TxState::Active || !self.explicit {
            return Err(PlatformError::transaction_state(
                "commit_transaction",
                self.state.to_string(),
            ));
        }
        let session = self.take_session("commit_transaction")?;
        match session.commit().await {
            Ok(()) => {
                self.state = TxState::Committed;
                debug!(affected = self.affected, "Transaction committed");
                Ok(())
            }
            Err(err) => {
                self.state = TxState::RolledBack;
                error!(error = %err, "Commit failed, transaction rolled back");
                Err(err)
            }
        }
    }

    /// Roll back all writes issued since the transaction opened.
    /// `Active -> RolledBack`; idempotent on an already rolled back
    /// instance; a no-op when nothing was started.
    pub async fn rollback_transaction(&mut self) -> Result<()> {
        match self.state {
            TxState::RolledBack | TxState::NotStarted => Ok(()),
            TxState::Active => {
                let session = self.take_session("rollback_transaction")?;
                session.rollback().await?;
                self.state = TxState::RolledBack;
                debug!("Transaction rolled back");
                Ok(())
            }
            TxState::Committed => Err(PlatformError::transaction_state(
                "rollback_transaction",
                self.state.to_string(),
            )),
        }
    }

    fn take_session(&mut self, operation: &str) -> Result<Box<dyn StoreSession>> {
        self.session.take().ok_or_else(|| {
            PlatformError::transaction_state(operation, "Active without session")
        })
    }

    /// Apply a write inside the transaction, opening an implicit session
    /// when no explicit transaction was begun. Writes after a terminal
    /// state fail fast.
    pub(super) async fn apply_write(&mut self, op: ChangeOp) -> Result<()> {
        match self.state {
            TxState::Active => {}
            TxState::NotStarted => {
                self.session = Some(self.store.begin().await?);
                self.state = TxState::Active;
                self.explicit = false;
            }
            state => {
                return Err(PlatformError::transaction_state("write", state.to_string()));
            }
        }
        let session = self.session.as_mut().ok_or_else(|| {
            PlatformError::transaction_state("write", "Active without session")
        })?;
        session.apply(&op).await?;
        self.affected += 1;
        Ok(())
    }

    /// Read bound to the transaction when Active, ambient otherwise.
    pub(super) async fn read(&mut self, family: &str, id: &str) -> Result<Option<serde_json::Value>> {
        match (&self.state, self.session.as_mut()) {
            (TxState::Active, Some(session)) => session.read(family, id).await,
            _ => self.store.read(family, id).await,
        }
    }

    /// Scan bound to the transaction when Active, ambient otherwise.
    pub(super) async fn scan(&mut self, family: &str) -> Result<Vec<serde_json::Value>> {
        match (&self.state, self.session.as_mut()) {
            (TxState::Active, Some(session)) => session.scan(family).await,
            _ => self.store.scan(family).await,
        }
    }

    /// Generic repository accessor; the named accessors below cover the
    /// full entity set.
    pub fn repo<E: Entity>(&mut self) -> Repo<'_, E> {
        Repo::new(self)
    }

    pub fn users(&mut self) -> Repo<'_, User> {
        self.repo()
    }

    pub fn roles(&mut self) -> Repo<'_, Role> {
        self.repo()
    }

    pub fn permissions(&mut self) -> Repo<'_, PermissionDef> {
        self.repo()
    }

    pub fn role_permissions(&mut self) -> Repo<'_, RolePermission> {
        self.repo()
    }

    pub fn frameworks(&mut self) -> Repo<'_, Framework> {
        self.repo()
    }

    pub fn framework_versions(&mut self) -> Repo<'_, FrameworkVersion> {
        self.repo()
    }

    pub fn categories(&mut self) -> Repo<'_, Category> {
        self.repo()
    }

    pub fn clauses(&mut self) -> Repo<'_, Clause> {
        self.repo()
    }

    pub fn check_lists(&mut self) -> Repo<'_, CheckList> {
        self.repo()
    }

    pub fn organizations(&mut self) -> Repo<'_, Organization> {
        self.repo()
    }

    pub fn departments(&mut self) -> Repo<'_, Department> {
        self.repo()
    }

    pub fn memberships(&mut self) -> Repo<'_, Membership> {
        self.repo()
    }

    pub fn answers(&mut self) -> Repo<'_, Answer> {
        self.repo()
    }

    pub fn audits(&mut self) -> Repo<'_, AuditRecord> {
        self.repo()
    }
}
