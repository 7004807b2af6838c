// Port Layer - Interfaces for external dependencies

pub mod access_code_repository;
pub mod id_provider; // For deterministic testing
pub mod queue_repository;
pub mod time_provider;
pub mod transaction;
pub mod visitor_info;
pub mod visitor_repository;

// Re-exports
pub use access_code_repository::{AccessCodeCriteria, AccessCodeRepository, StatusFilter};
pub use id_provider::IdProvider;
pub use queue_repository::QueueRepository;
pub use time_provider::TimeProvider;
pub use transaction::{IssuanceTransaction, Transaction, TransactionalAccessCodeRepository};
pub use visitor_info::VisitorInfoSink;
pub use visitor_repository::{VisitorCriteria, VisitorRepository};
