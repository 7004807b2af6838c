// Transaction port for atomic code allocation

use crate::domain::{AccessCode, CodeNumber, Lane};
use crate::error::Result;
use async_trait::async_trait;

/// Transaction trait for atomic multi-step operations
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Transactional AccessCode operations
#[async_trait]
pub trait TransactionalAccessCodeRepository: Send + Sync {
    /// Begin a new issuance transaction
    async fn begin_issuance(&self) -> Result<Box<dyn IssuanceTransaction>>;
}

/// Lane counter read + code insert within one transaction
#[async_trait]
pub trait IssuanceTransaction: Transaction {
    /// Last code issued on the lane, `None` if the lane never issued one.
    /// Takes the store's write lock for the remainder of the transaction.
    async fn last_code(&mut self, queue_id: &str, lane: Lane) -> Result<Option<CodeNumber>>;

    /// Insert code and advance its lane counter (within transaction)
    async fn insert(&mut self, code: &AccessCode) -> Result<()>;

    /// Set the visitor's validated flag; discarded on rollback
    async fn mark_validated(&mut self, visitor_id: &str) -> Result<()>;
}
