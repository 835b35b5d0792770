//! In-Memory Store
//!
//! Transactional map-of-maps store used by tests and local development.
//! Sessions stage their writes privately and publish them atomically under
//! one lock on commit, so concurrent sessions never observe partial state.
//! Commit failures can be injected to exercise rollback paths.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use super::{ChangeOp, Store, StoreSession};
use crate::shared::error::{PlatformError, Result};

type Families = HashMap<String, BTreeMap<String, Value>>;

/// In-memory store with injectable commit failure.
#[derive(Default)]
pub struct MemStore {
    data: Arc<RwLock<Families>>,
    fail_next_commit: AtomicBool,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next session opened from this store fail at commit,
    /// leaving the base data untouched.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Number of documents currently stored in one family.
    pub fn count(&self, family: &str) -> usize {
        self.data
            .read()
            .expect("store lock poisoned")
            .get(family)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl Store for MemStore {
    async fn begin(&self) -> Result<Box<dyn StoreSession>> {
        let fail_commit = self.fail_next_commit.swap(false, Ordering::SeqCst);
        Ok(Box::new(MemSession {
            data: Arc::clone(&self.data),
            staged: Vec::new(),
            fail_commit,
        }))
    }

    async fn read(&self, family: &str, id: &str) -> Result<Option<Value>> {
        let data = self.data.read().expect("store lock poisoned");
        Ok(data.get(family).and_then(|docs| docs.get(id)).cloned())
    }

    async fn scan(&self, family: &str) -> Result<Vec<Value>> {
        let data = self.data.read().expect("store lock poisoned");
        Ok(data
            .get(family)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }
}

struct MemSession {
    data: Arc<RwLock<Families>>,
    staged: Vec<ChangeOp>,
    fail_commit: bool,
}

impl MemSession {
    /// Latest staged state for (family, id), if any write touched it.
    fn staged_for(&self, family: &str, id: &str) -> Option<Option<Value>> {
        self.staged
            .iter()
            .rev()
            .find(|op| op.family() == family && op.id() == id)
            .map(|op| match op {
                ChangeOp::Upsert { doc, .. } => Some(doc.clone()),
                ChangeOp::Delete { .. } => None,
            })
    }
}

#[async_trait]
impl StoreSession for MemSession {
    async fn apply(&mut self, op: &ChangeOp) -> Result<()> {
        self.staged.push(op.clone());
        Ok(())
    }

    async fn read(&mut self, family: &str, id: &str) -> Result<Option<Value>> {
        if let Some(staged) = self.staged_for(family, id) {
            return Ok(staged);
        }
        let data = self.data.read().expect("store lock poisoned");
        Ok(data.get(family).and_then(|docs| docs.get(id)).cloned())
    }

    async fn scan(&mut self, family: &str) -> Result<Vec<Value>> {
        let mut merged: BTreeMap<String, Value> = {
            let data = self.data.read().expect("store lock poisoned");
            data.get(family).cloned().unwrap_or_default()
        };
        for op in &self.staged {
            if op.family() != family {
                continue;
            }
            match op {
                ChangeOp::Upsert { id, doc, .. } => {
                    merged.insert(id.clone(), doc.clone());
                }
                ChangeOp::Delete { id, .. } => {
                    merged.remove(id);
                }
            }
        }
        Ok(merged.into_values().collect())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        if self.fail_commit {
            // Nothing was published, so the base store is untouched:
            // rollback-confirmed per the session contract.
            return Err(PlatformError::infrastructure(
                "Injected commit failure (transaction rolled back)",
            ));
        }

        let mut data = self.data.write().expect("store lock poisoned");
        for op in self.staged {
            match op {
                ChangeOp::Upsert { family, id, doc } => {
                    data.entry(family.to_string()).or_default().insert(id, doc);
                }
                ChangeOp::Delete { family, id } => {
                    if let Some(docs) = data.get_mut(family) {
                        docs.remove(&id);
                    }
                }
            }
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        // Staged writes are dropped with the session.
        Ok(())
    }
}
