// Queue Repository Port (Interface)

use crate::domain::Queue;
use crate::error::Result;
use async_trait::async_trait;

/// Queue registry: lookup for the issuance flow, insert for provisioning
#[async_trait]
pub trait QueueRepository: Send + Sync {
    /// Find queue by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Queue>>;

    /// Insert a new queue
    async fn insert(&self, queue: &Queue) -> Result<()>;
}
