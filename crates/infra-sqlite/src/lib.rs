// JumpQueue Infrastructure - SQLite Adapter
// Implements: QueueRepository, VisitorRepository, AccessCodeRepository,
// TransactionalAccessCodeRepository, VisitorInfoSink

mod access_code_repository;
mod connection;
mod error;
mod migration;
mod queue_repository;
mod transaction;
mod visitor_info;
mod visitor_repository;

pub use access_code_repository::SqliteAccessCodeRepository;
pub use connection::{create_pool, create_pool_with, PoolSettings};
pub use migration::run_migrations;
pub use queue_repository::SqliteQueueRepository;
pub use transaction::SqliteIssuanceTransaction;
pub use visitor_info::SqliteVisitorInfoSink;
pub use visitor_repository::SqliteVisitorRepository;

// Note: sqlx::Error conversion is handled by `error::map_sqlx_error`
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
