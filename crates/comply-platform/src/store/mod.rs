//! Storage Abstraction
//!
//! The unit of work talks to the data store through these traits. A
//! `Store` hands out transactional sessions; a `StoreSession` is one open
//! transaction. Entities travel as serde documents keyed by (family, id),
//! so per-entity query semantics stay with the caller.

pub mod memory;
pub mod postgres;

pub use memory::MemStore;
pub use postgres::SqlStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::shared::error::Result;

/// One write staged against a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOp {
    Upsert {
        family: &'static str,
        id: String,
        doc: Value,
    },
    Delete {
        family: &'static str,
        id: String,
    },
}

impl ChangeOp {
    pub fn family(&self) -> &'static str {
        match self {
            ChangeOp::Upsert { family, .. } => family,
            ChangeOp::Delete { family, .. } => family,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ChangeOp::Upsert { id, .. } => id,
            ChangeOp::Delete { id, .. } => id,
        }
    }
}

/// An ACID-capable store. One `Store` serves many concurrent sessions,
/// each within its own transaction (read-committed or better).
#[async_trait]
pub trait Store: Send + Sync {
    /// Open a new transaction.
    async fn begin(&self) -> Result<Box<dyn StoreSession>>;

    /// Non-transactional point read.
    async fn read(&self, family: &str, id: &str) -> Result<Option<Value>>;

    /// Non-transactional scan of one entity family.
    async fn scan(&self, family: &str) -> Result<Vec<Value>>;
}

/// One open transaction against a store.
///
/// Contract: when `commit` returns `Err`, the transaction has already been
/// rolled back; the caller always observes either commit-confirmed or
/// rollback-confirmed, never an ambiguous state. Dropping an uncommitted
/// session rolls it back.
#[async_trait]
pub trait StoreSession: Send {
    /// Apply a write inside this transaction.
    async fn apply(&mut self, op: &ChangeOp) -> Result<()>;

    /// Point read seeing this transaction's own writes.
    async fn read(&mut self, family: &str, id: &str) -> Result<Option<Value>>;

    /// Scan one family, seeing this transaction's own writes.
    async fn scan(&mut self, family: &str) -> Result<Vec<Value>>;

    /// Make all applied writes durable atomically.
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discard all applied writes.
    async fn rollback(self: Box<Self>) -> Result<()>;
}
