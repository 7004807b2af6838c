// Lookup-or-Issue Use Case (idempotent)

use super::AccessCodeService;
use crate::application::sequencer::EmptyLane;
use crate::domain::{IssuedCode, Lane};
use crate::error::{AppError, Result};
use crate::port::VisitorCriteria;
use serde::{Deserialize, Serialize};

/// Visitor identifies by identificator plus email or phone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupRequest {
    pub identificator: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    pub queue_id: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl AccessCodeService {
    /// Return the visitor's unconsumed code in the queue, or issue one.
    ///
    /// Safe to retry: the existence check and the allocation run under the
    /// same queue guard. Unlike token issuance, an unseeded normal lane
    /// is NotFound here.
    pub async fn lookup_or_issue(&self, req: LookupRequest) -> Result<IssuedCode> {
        let email = non_blank(req.email);
        let phone = non_blank(req.phone);

        if email.is_none() && phone.is_none() {
            return Err(AppError::InvalidInput(
                "Either email or phone is required".to_string(),
            ));
        }
        if req.identificator.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "identificator must not be empty".to_string(),
            ));
        }

        let mut criteria = VisitorCriteria {
            identificator: Some(req.identificator.clone()),
            ..Default::default()
        };
        match &email {
            Some(email) => criteria.email = Some(email.clone()),
            None => criteria.phone = phone,
        }

        let visitor = self.visitors.find(&criteria).await?.pop().ok_or_else(|| {
            AppError::PreconditionFailed(format!(
                "No registered visitor with identificator {}",
                req.identificator
            ))
        })?;

        if !visitor.validated {
            return Err(AppError::PreconditionFailed(format!(
                "Visitor {} is not validated yet",
                visitor.id
            )));
        }

        let queue = self
            .queues
            .find_by_id(&req.queue_id)
            .await?
            .ok_or_else(|| {
                AppError::PreconditionFailed(format!("Queue {} does not exist", req.queue_id))
            })?;

        let _queue_guard = self.lane_locks.acquire_queue(&queue.id).await;

        let access_code = match self
            .find_outstanding(&queue, &visitor.identificator, email)
            .await?
        {
            Some(code) => self.refresh_estimate(&queue, code).await?,
            None => {
                self.allocate_locked(&queue, &visitor, Lane::Normal, EmptyLane::Reject)
                    .await?
            }
        };

        Ok(IssuedCode { access_code, queue })
    }
}
