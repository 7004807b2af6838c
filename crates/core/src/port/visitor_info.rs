// Visitor Info Port (Interface)

use crate::domain::VisitorInfoRecord;
use crate::error::Result;
use async_trait::async_trait;

/// Sink for the visitor-info side record written on consented issuance
#[async_trait]
pub trait VisitorInfoSink: Send + Sync {
    async fn record(&self, info: &VisitorInfoRecord) -> Result<()>;
}
