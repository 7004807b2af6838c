// SQLite VisitorInfoSink Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use jumpqueue_core::domain::VisitorInfoRecord;
use jumpqueue_core::error::Result;
use jumpqueue_core::port::VisitorInfoSink;
use sqlx::SqlitePool;

pub struct SqliteVisitorInfoSink {
    pool: SqlitePool,
}

impl SqliteVisitorInfoSink {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisitorInfoSink for SqliteVisitorInfoSink {
    async fn record(&self, info: &VisitorInfoRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO visitor_info (id, queue_id, name, email, phone, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&info.id)
        .bind(&info.queue_id)
        .bind(&info.name)
        .bind(&info.email)
        .bind(&info.phone)
        .bind(info.recorded_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}
