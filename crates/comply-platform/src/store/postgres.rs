//! PostgreSQL Store
//!
//! Production engine over sqlx. Entities live in a single
//! `entities(family, id, doc)` table as JSON text; each `StoreSession`
//! wraps one `sqlx::Transaction`, so commit/rollback semantics come
//! straight from the database.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::info;

use super::{ChangeOp, Store, StoreSession};
use crate::shared::error::Result;

pub struct SqlStore {
    pool: PgPool,
}

impl SqlStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the backing schema if it does not exist.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS entities (
                family TEXT NOT NULL,
                id TEXT NOT NULL,
                doc TEXT NOT NULL,
                PRIMARY KEY (family, id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_entities_family
            ON entities (family)
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Postgres entity schema initialized");
        Ok(())
    }
}

#[async_trait]
impl Store for SqlStore {
    async fn begin(&self) -> Result<Box<dyn StoreSession>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgSession { tx }))
    }

    async fn read(&self, family: &str, id: &str) -> Result<Option<Value>> {
        let row = sqlx::query("SELECT doc FROM entities WHERE family = $1 AND id = $2")
            .bind(family)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let doc: String = row.try_get("doc")?;
                Ok(Some(serde_json::from_str(&doc)?))
            }
            None => Ok(None),
        }
    }

    async fn scan(&self, family: &str) -> Result<Vec<Value>> {
        let rows = sqlx::query("SELECT doc FROM entities WHERE family = $1 ORDER BY id")
            .bind(family)
            .fetch_all(&self.pool)
            .await?;

        let mut docs = Vec::with_capacity(rows.len());
        for row in rows {
            let doc: String = row.try_get("doc")?;
            docs.push(serde_json::from_str(&doc)?);
        }
        Ok(docs)
    }
}

struct PgSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreSession for PgSession {
    async fn apply(&mut self, op: &ChangeOp) -> Result<()> {
        match op {
            ChangeOp::Upsert { family, id, doc } => {
                sqlx::query(
                    r#"
                    INSERT INTO entities (family, id, doc)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (family, id) DO UPDATE SET doc = EXCLUDED.doc
                    "#,
                )
                .bind(family)
                .bind(id)
                .bind(serde_json::to_string(doc)?)
                .execute(&mut *self.tx)
                .await?;
            }
            ChangeOp::Delete { family, id } => {
                sqlx::query("DELETE FROM entities WHERE family = $1 AND id = $2")
                    .bind(family)
                    .bind(id)
                    .execute(&mut *self.tx)
                    .await?;
            }
        }
        Ok(())
    }

    async fn read(&mut self, family: &str, id: &str) -> Result<Option<Value>> {
        let row = sqlx::query("SELECT doc FROM entities WHERE family = $1 AND id = $2")
            .bind(family)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        match row {
            Some(row) => {
                let doc: String = row.try_get("doc")?;
                Ok(Some(serde_json::from_str(&doc)?))
            }
            None => Ok(None),
        }
    }

    async fn scan(&mut self, family: &str) -> Result<Vec<Value>> {
        let rows = sqlx::query("SELECT doc FROM entities WHERE family = $1 ORDER BY id")
            .bind(family)
            .fetch_all(&mut *self.tx)
            .await?;

        let mut docs = Vec::with_capacity(rows.len());
        for row in rows {
            let doc: String = row.try_get("doc")?;
            docs.push(serde_json::from_str(&doc)?);
        }
        Ok(docs)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        // On failure sqlx returns the connection with the transaction
        // rolled back, satisfying the rollback-confirmed contract.
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
