// Visitor Repository Port (Interface)

use crate::domain::Visitor;
use crate::error::Result;
use async_trait::async_trait;

/// Visitor search criteria. `None` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitorCriteria {
    pub token: Option<String>,
    pub identificator: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl VisitorCriteria {
    pub fn by_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Default::default()
        }
    }
}

#[async_trait]
pub trait VisitorRepository: Send + Sync {
    /// Find visitors matching all given criteria, oldest first
    async fn find(&self, criteria: &VisitorCriteria) -> Result<Vec<Visitor>>;

    /// Insert or update a visitor
    async fn save(&self, visitor: &Visitor) -> Result<()>;
}
