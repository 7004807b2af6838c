//! Shared setup: full stack on a temporary SQLite file

#![allow(dead_code)]

use jumpqueue_core::application::AccessCodeService;
use jumpqueue_core::domain::{AccessCode, CodeNumber, Lane, Queue, Visitor};
use jumpqueue_core::port::id_provider::UuidProvider;
use jumpqueue_core::port::time_provider::ManualTimeProvider;
use jumpqueue_core::port::{AccessCodeRepository, QueueRepository, VisitorRepository};
use jumpqueue_infra_sqlite::{
    create_pool_with, run_migrations, PoolSettings, SqliteAccessCodeRepository,
    SqliteQueueRepository, SqliteVisitorInfoSink, SqliteVisitorRepository,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const NOW: i64 = 1_700_000_000_000;

pub struct Harness {
    _dir: TempDir,
    pub pool: SqlitePool,
    pub queues: Arc<SqliteQueueRepository>,
    pub visitors: Arc<SqliteVisitorRepository>,
    pub codes: Arc<SqliteAccessCodeRepository>,
    pub clock: Arc<ManualTimeProvider>,
    pub service: Arc<AccessCodeService>,
}

impl Harness {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("jumpqueue.db");

        let pool = create_pool_with(
            db_path.to_str().expect("utf-8 path"),
            &PoolSettings {
                max_connections: 8,
                busy_timeout: Duration::from_secs(10),
            },
        )
        .await
        .expect("pool");
        run_migrations(&pool).await.expect("migrations");

        let queues = Arc::new(SqliteQueueRepository::new(pool.clone()));
        let visitors = Arc::new(SqliteVisitorRepository::new(pool.clone()));
        let codes = Arc::new(SqliteAccessCodeRepository::new(pool.clone()));
        let clock = Arc::new(ManualTimeProvider::new(NOW));

        let service = Arc::new(AccessCodeService::new(
            queues.clone(),
            visitors.clone(),
            codes.clone(),
            codes.clone(),
            Arc::new(SqliteVisitorInfoSink::new(pool.clone())),
            Arc::new(UuidProvider),
            clock.clone(),
        ));

        Self {
            _dir: dir,
            pool,
            queues,
            visitors,
            codes,
            clock,
            service,
        }
    }

    pub async fn queue(&self, id: &str, min_wait_minutes: i64) {
        self.queues
            .insert(&Queue::new(id, format!("Queue {}", id), min_wait_minutes, 0))
            .await
            .expect("insert queue");
    }

    /// Visitor of `queue_id` holding token `tok-{id}`, email `{id}@example.com`
    pub async fn visitor(&self, id: &str, queue_id: &str, validated: bool) -> Visitor {
        let mut v = Visitor::new(id, queue_id, format!("Visitor {}", id), format!("ID-{}", id), 0);
        v.token = Some(format!("tok-{}", id));
        v.email = Some(format!("{}@example.com", id));
        v.phone = Some(format!("600 {}", id));
        v.validated = validated;
        self.visitors.save(&v).await.expect("save visitor");
        v
    }

    pub async fn seed(&self, queue_id: &str, code: i64, lane: Lane) {
        let c = AccessCode::new(
            format!("seed-{}-{}-{}", queue_id, lane, code),
            NOW - 3_600_000,
            queue_id,
            CodeNumber::new(code).expect("code in range"),
            lane,
        );
        self.codes.insert(&c).await.expect("seed code");
    }

    pub async fn row_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM access_codes")
            .fetch_one(&self.pool)
            .await
            .expect("count")
    }
}
