//! Repository Handles
//!
//! Per-entity-family data access bound to one unit of work. A handle is a
//! borrowed view into the unit of work's transaction context, so the
//! borrow checker guarantees it never outlives its owner. Every business
//! mutation stages exactly one audit record into the same transaction.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::unit_of_work::UnitOfWork;
use crate::audit::entity::{AuditAction, AuditRecord};
use crate::shared::error::{PlatformError, Result};
use crate::store::ChangeOp;

/// An entity family persisted through the repository set.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    /// Storage family key, e.g. `"frameworks"`.
    const FAMILY: &'static str;

    /// Human-readable name used in errors and audit records.
    const NAME: &'static str;

    fn id(&self) -> &str;
}

/// Borrowed repository handle for one entity family.
pub struct Repo<'u, E: Entity> {
    uow: &'u mut UnitOfWork,
    _entity: PhantomData<E>,
}

impl<'u, E: Entity> Repo<'u, E> {
    pub(super) fn new(uow: &'u mut UnitOfWork) -> Self {
        Self {
            uow,
            _entity: PhantomData,
        }
    }

    /// Fetch by id, or `None` when absent.
    pub async fn get(&mut self, id: &str) -> Result<Option<E>> {
        match self.uow.read(E::FAMILY, id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    /// Fetch by id, failing with `NotFound` when absent.
    pub async fn require(&mut self, id: &str) -> Result<E> {
        self.get(id)
            .await?
            .ok_or_else(|| PlatformError::not_found(E::NAME, id))
    }

    /// All entities of this family.
    pub async fn list(&mut self) -> Result<Vec<E>> {
        let docs = self.uow.scan(E::FAMILY).await?;
        let mut entities = Vec::with_capacity(docs.len());
        for doc in docs {
            entities.push(serde_json::from_value(doc)?);
        }
        Ok(entities)
    }

    /// First entity matching the predicate.
    pub async fn find<F>(&mut self, predicate: F) -> Result<Option<E>>
    where
        F: Fn(&E) -> bool,
    {
        Ok(self.list().await?.into_iter().find(|e| predicate(e)))
    }

    /// Insert a new entity. Fails with `AlreadyExists` when the id is
    /// already taken.
    pub async fn create(&mut self, entity: &E) -> Result<()> {
        if self.get(entity.id()).await?.is_some() {
            return Err(PlatformError::already_exists(E::NAME, "id", entity.id()));
        }
        self.write(entity, AuditAction::Create).await
    }

    /// Replace an existing entity. Fails with `NotFound` when absent.
    pub async fn update(&mut self, entity: &E) -> Result<()> {
        if self.get(entity.id()).await?.is_none() {
            return Err(PlatformError::not_found(E::NAME, entity.id()));
        }
        self.write(entity, AuditAction::Update).await
    }

    /// Remove an entity. Fails with `NotFound` when absent.
    pub async fn delete(&mut self, id: &str) -> Result<()> {
        if self.get(id).await?.is_none() {
            return Err(PlatformError::not_found(E::NAME, id));
        }
        self.uow
            .apply_write(ChangeOp::Delete {
                family: E::FAMILY,
                id: id.to_string(),
            })
            .await?;
        self.stage_audit(AuditAction::Delete, id).await
    }

    async fn write(&mut self, entity: &E, action: AuditAction) -> Result<()> {
        self.uow
            .apply_write(ChangeOp::Upsert {
                family: E::FAMILY,
                id: entity.id().to_string(),
                doc: serde_json::to_value(entity)?,
            })
            .await?;
        self.stage_audit(action, entity.id()).await
    }

    /// One audit record per business mutation, in the same transaction.
    /// The audit family itself is exempt, so audit appends cannot recurse.
    async fn stage_audit(&mut self, action: AuditAction, entity_key: &str) -> Result<()> {
        if E::FAMILY == AuditRecord::FAMILY {
            return Ok(());
        }
        let record = AuditRecord::new(
            self.uow.principal().user_id(),
            action,
            E::NAME,
            entity_key,
        );
        self.uow
            .apply_write(ChangeOp::Upsert {
                family: AuditRecord::FAMILY,
                id: record.id.clone(),
                doc: serde_json::to_value(&record)?,
            })
            .await
    }
}

impl<'u> Repo<'u, AuditRecord> {
    /// Audit records describing one entity, oldest first.
    pub async fn for_entity(&mut self, entity_name: &str, entity_key: &str) -> Result<Vec<AuditRecord>> {
        let mut records: Vec<AuditRecord> = self
            .list()
            .await?
            .into_iter()
            .filter(|r| r.entity_name == entity_name && r.entity_key == entity_key)
            .collect();
        records.sort_by_key(|r| r.recorded_at);
        Ok(records)
    }
}
