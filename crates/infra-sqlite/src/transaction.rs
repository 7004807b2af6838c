// SQLite Issuance Transaction Implementation

use crate::access_code_repository::insert_code;
use crate::error::map_sqlx_error;
use async_trait::async_trait;
use jumpqueue_core::domain::{AccessCode, CodeNumber, Lane};
use jumpqueue_core::error::{AppError, Result};
use jumpqueue_core::port::{IssuanceTransaction, Transaction};
use sqlx::{Sqlite, Transaction as SqlxTransaction};

pub struct SqliteIssuanceTransaction {
    tx: SqlxTransaction<'static, Sqlite>,
}

impl SqliteIssuanceTransaction {
    pub fn new(tx: SqlxTransaction<'static, Sqlite>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transaction for SqliteIssuanceTransaction {
    async fn commit(mut self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)?;
        Ok(())
    }
}

#[async_trait]
impl IssuanceTransaction for SqliteIssuanceTransaction {
    async fn last_code(&mut self, queue_id: &str, lane: Lane) -> Result<Option<CodeNumber>> {
        // A write as the first statement takes the database write lock now,
        // so a concurrent issuer waits on busy_timeout instead of failing
        // its read-to-write upgrade at commit.
        let last: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE lane_counters SET last_code = last_code
            WHERE queue_id = ? AND priority = ?
            RETURNING last_code
            "#,
        )
        .bind(queue_id)
        .bind(lane.is_priority())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        last.map(CodeNumber::new)
            .transpose()
            .map_err(Into::into)
    }

    async fn insert(&mut self, code: &AccessCode) -> Result<()> {
        insert_code(&mut self.tx, code).await
    }

    async fn mark_validated(&mut self, visitor_id: &str) -> Result<()> {
        let result = sqlx::query("UPDATE visitors SET validated = 1 WHERE id = ?")
            .bind(visitor_id)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Visitor {} not found", visitor_id)));
        }
        Ok(())
    }
}
