// SQLite AccessCodeRepository Implementation

use crate::error::map_sqlx_error;
use crate::SqliteIssuanceTransaction;
use async_trait::async_trait;
use jumpqueue_core::domain::{AccessCode, AccessCodeId, CodeNumber, Lane};
use jumpqueue_core::error::{AppError, Result};
use jumpqueue_core::port::{
    AccessCodeCriteria, AccessCodeRepository, IssuanceTransaction, StatusFilter,
    TransactionalAccessCodeRepository,
};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

pub struct SqliteAccessCodeRepository {
    pool: SqlitePool,
}

impl SqliteAccessCodeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Insert a code row and move its lane counter to the code's number
pub(crate) async fn insert_code(conn: &mut SqliteConnection, code: &AccessCode) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO access_codes (
            id, queue_id, name, email, phone, identificator,
            code, priority, created_at, started_at, finished_at, estimated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&code.id)
    .bind(&code.queue_id)
    .bind(&code.name)
    .bind(&code.email)
    .bind(&code.phone)
    .bind(&code.identificator)
    .bind(i64::from(code.code))
    .bind(code.lane.is_priority())
    .bind(code.created_at)
    .bind(code.started_at)
    .bind(code.finished_at)
    .bind(code.estimated_at)
    .execute(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;

    sqlx::query(
        r#"
        INSERT INTO lane_counters (queue_id, priority, last_code, updated_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(queue_id, priority) DO UPDATE SET
            last_code = excluded.last_code,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&code.queue_id)
    .bind(code.lane.is_priority())
    .bind(i64::from(code.code))
    .bind(code.created_at)
    .execute(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;

    Ok(())
}

#[async_trait]
impl AccessCodeRepository for SqliteAccessCodeRepository {
    async fn insert(&self, code: &AccessCode) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        insert_code(&mut tx, code).await?;
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &AccessCodeId) -> Result<Option<AccessCode>> {
        let row = sqlx::query_as::<_, AccessCodeRow>("SELECT * FROM access_codes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(AccessCodeRow::into_access_code).transpose()
    }

    async fn update(&self, code: &AccessCode) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE access_codes
            SET started_at = ?, finished_at = ?, estimated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(code.started_at)
        .bind(code.finished_at)
        .bind(code.estimated_at)
        .bind(&code.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Access code {} not found",
                code.id
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: &AccessCodeId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM access_codes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn search(&self, criteria: &AccessCodeCriteria) -> Result<Vec<AccessCode>> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM access_codes WHERE 1 = 1");

        if let Some(queue_id) = &criteria.queue_id {
            qb.push(" AND queue_id = ").push_bind(queue_id.clone());
        }
        if let Some(lane) = criteria.lane {
            qb.push(" AND priority = ").push_bind(lane.is_priority());
        }
        if let Some(identificator) = &criteria.identificator {
            qb.push(" AND identificator = ")
                .push_bind(identificator.clone());
        }
        if let Some(email) = &criteria.email {
            qb.push(" AND email = ").push_bind(email.clone());
        }
        if let Some(before) = criteria.created_before {
            qb.push(" AND created_at < ").push_bind(before);
        }
        match criteria.status {
            StatusFilter::Any => {}
            StatusFilter::Unconsumed => {
                qb.push(" AND finished_at IS NULL");
            }
            StatusFilter::InService => {
                qb.push(" AND started_at IS NOT NULL AND finished_at IS NULL");
            }
            StatusFilter::Completed => {
                qb.push(" AND finished_at IS NOT NULL");
            }
        }
        qb.push(" ORDER BY created_at ASC, rowid ASC");

        qb.build_query_as::<AccessCodeRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .into_iter()
            .map(AccessCodeRow::into_access_code)
            .collect()
    }

    async fn find_recent_completed(
        &self,
        queue_id: &str,
        limit: usize,
    ) -> Result<Vec<AccessCode>> {
        let rows = sqlx::query_as::<_, AccessCodeRow>(
            r#"
            SELECT * FROM access_codes
            WHERE queue_id = ? AND started_at IS NOT NULL AND finished_at IS NOT NULL
            ORDER BY finished_at DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(queue_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(AccessCodeRow::into_access_code)
            .collect()
    }

    async fn count_completed(&self, queue_id: &str) -> Result<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM access_codes WHERE queue_id = ? AND finished_at IS NOT NULL",
        )
        .bind(queue_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn count_pending(&self, queue_id: &str, as_of: i64) -> Result<i64> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM access_codes
            WHERE queue_id = ? AND created_at < ? AND finished_at IS NULL
            "#,
        )
        .bind(queue_id)
        .bind(as_of)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl TransactionalAccessCodeRepository for SqliteAccessCodeRepository {
    async fn begin_issuance(&self) -> Result<Box<dyn IssuanceTransaction>> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(SqliteIssuanceTransaction::new(tx)))
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct AccessCodeRow {
    id: String,
    queue_id: String,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    identificator: String,
    code: i64,
    priority: i32, // SQLite boolean as integer
    created_at: i64,
    started_at: Option<i64>,
    finished_at: Option<i64>,
    estimated_at: i64,
}

impl AccessCodeRow {
    fn into_access_code(self) -> Result<AccessCode> {
        Ok(AccessCode {
            id: self.id,
            queue_id: self.queue_id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            identificator: self.identificator,
            code: CodeNumber::new(self.code)?,
            lane: Lane::from_priority(self.priority != 0),
            created_at: self.created_at,
            started_at: self.started_at,
            finished_at: self.finished_at,
            estimated_at: self.estimated_at,
        })
    }
}
