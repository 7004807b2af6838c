// Access Code Repository Port (Interface)

use crate::domain::{AccessCode, AccessCodeId, Lane};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Service-state filter for code searches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusFilter {
    #[default]
    Any,
    /// Not yet completed (waiting or at the desk)
    Unconsumed,
    InService,
    Completed,
}

/// Access code search criteria. `None` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessCodeCriteria {
    pub queue_id: Option<String>,
    pub lane: Option<Lane>,
    pub identificator: Option<String>,
    pub email: Option<String>,
    /// Only codes created strictly before this epoch ms
    pub created_before: Option<i64>,
    pub status: StatusFilter,
}

impl AccessCodeCriteria {
    pub fn for_queue(queue_id: impl Into<String>) -> Self {
        Self {
            queue_id: Some(queue_id.into()),
            ..Default::default()
        }
    }
}

/// Repository interface for AccessCode persistence
///
/// Lists are ordered by ascending creation time unless stated otherwise.
#[async_trait]
pub trait AccessCodeRepository: Send + Sync {
    /// Insert a code and advance its lane counter
    async fn insert(&self, code: &AccessCode) -> Result<()>;

    /// Find code by ID
    async fn find_by_id(&self, id: &AccessCodeId) -> Result<Option<AccessCode>>;

    /// Update timestamps and estimate of an existing code
    async fn update(&self, code: &AccessCode) -> Result<()>;

    /// Delete code, returns false if it did not exist
    async fn delete(&self, id: &AccessCodeId) -> Result<bool>;

    /// Search codes, oldest first
    async fn search(&self, criteria: &AccessCodeCriteria) -> Result<Vec<AccessCode>>;

    /// Last `limit` completed codes of a queue, most recently finished first
    async fn find_recent_completed(&self, queue_id: &str, limit: usize)
        -> Result<Vec<AccessCode>>;

    /// Count completed codes of a queue
    async fn count_completed(&self, queue_id: &str) -> Result<i64>;

    /// Count codes created before `as_of` that are not completed yet
    async fn count_pending(&self, queue_id: &str, as_of: i64) -> Result<i64>;
}
