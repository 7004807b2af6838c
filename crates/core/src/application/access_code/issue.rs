// Issue Use Case (normal and VIP lanes)

use super::AccessCodeService;
use crate::application::sequencer::{self, EmptyLane};
use crate::domain::{AccessCode, IssuedCode, Lane, Queue, Visitor, VisitorInfoRecord};
use crate::error::{AppError, Result};
use crate::port::{AccessCodeCriteria, StatusFilter, VisitorCriteria};
use tracing::{debug, info, warn};

impl AccessCodeService {
    /// Issue a normal-lane code to the visitor presenting `token`.
    /// A lane that never issued a code starts at 1. A visitor already holding
    /// an unconsumed code in the queue gets that code back.
    pub async fn issue_visitor_code(&self, token: &str) -> Result<IssuedCode> {
        self.issue_by_token(token, Lane::Normal, EmptyLane::StartAtOne)
            .await
    }

    /// Issue a VIP-lane code to the visitor presenting `token`.
    /// The VIP lane must already be seeded, otherwise NotFound.
    pub async fn issue_vip_code(&self, token: &str) -> Result<IssuedCode> {
        self.issue_by_token(token, Lane::Priority, EmptyLane::Reject)
            .await
    }

    async fn issue_by_token(
        &self,
        token: &str,
        lane: Lane,
        empty_lane: EmptyLane,
    ) -> Result<IssuedCode> {
        if token.trim().is_empty() {
            return Err(AppError::InvalidInput("token must not be empty".to_string()));
        }

        let mut matches = self.visitors.find(&VisitorCriteria::by_token(token)).await?;
        if matches.len() != 1 {
            return Err(AppError::NotFound(format!(
                "Expected exactly one visitor for token, found {}",
                matches.len()
            )));
        }
        let mut visitor = matches.remove(0);

        let queue = self
            .queues
            .find_by_id(&visitor.queue_id)
            .await?
            .ok_or_else(|| {
                AppError::PreconditionFailed(format!(
                    "Queue {} of visitor {} does not exist",
                    visitor.queue_id, visitor.id
                ))
            })?;

        let (access_code, fresh) = {
            let _queue_guard = self.lane_locks.acquire_queue(&queue.id).await;

            match self
                .find_outstanding(&queue, &visitor.identificator, visitor.email.clone())
                .await?
            {
                Some(code) => {
                    let code = self.refresh_estimate(&queue, code).await?;
                    if !visitor.validated {
                        visitor.validated = true;
                        self.visitors.save(&visitor).await?;
                    }
                    (code, false)
                }
                None => {
                    let code = self
                        .allocate_locked(&queue, &visitor, lane, empty_lane)
                        .await?;
                    (code, true)
                }
            }
        };

        if fresh && visitor.consent {
            self.record_visitor_info(&visitor).await;
        }

        Ok(IssuedCode { access_code, queue })
    }

    /// Unconsumed code of this identity in the queue, on either lane.
    ///
    /// A blank identificator identifies nobody and never matches.
    /// Caller must hold the queue guard.
    pub(super) async fn find_outstanding(
        &self,
        queue: &Queue,
        identificator: &str,
        email: Option<String>,
    ) -> Result<Option<AccessCode>> {
        if identificator.trim().is_empty() {
            return Ok(None);
        }

        Ok(self
            .codes
            .search(&AccessCodeCriteria {
                queue_id: Some(queue.id.clone()),
                identificator: Some(identificator.to_string()),
                email,
                status: StatusFilter::Unconsumed,
                ..Default::default()
            })
            .await?
            .pop())
    }

    /// Recompute and persist the estimate of a code handed out again
    pub(super) async fn refresh_estimate(
        &self,
        queue: &Queue,
        mut code: AccessCode,
    ) -> Result<AccessCode> {
        code.estimated_at = self
            .estimator
            .estimate(queue, self.time_provider.now_millis())
            .await?;
        self.codes.update(&code).await?;

        debug!(
            access_code_id = %code.id,
            queue_id = %queue.id,
            estimated_at = code.estimated_at,
            "Returning existing access code"
        );
        Ok(code)
    }

    /// Draw the next number of `lane` and persist a code for `visitor`,
    /// validating the visitor in the same transaction.
    ///
    /// Caller must hold the lane lock.
    pub(super) async fn allocate_locked(
        &self,
        queue: &Queue,
        visitor: &Visitor,
        lane: Lane,
        empty_lane: EmptyLane,
    ) -> Result<AccessCode> {
        let now = self.time_provider.now_millis();
        let estimated_at = self.estimator.estimate(queue, now).await?;

        let mut tx = self.tx_codes.begin_issuance().await?;
        let last = tx.last_code(&queue.id, lane).await?;

        let Some(number) = sequencer::allocate(last, empty_lane) else {
            tx.rollback().await?;
            return Err(AppError::NotFound(format!(
                "No {} code issued yet in queue {}",
                lane, queue.id
            )));
        };

        let mut code = AccessCode::new(
            self.id_provider.generate_id(),
            now,
            queue.id.clone(),
            number,
            lane,
        );
        code.assign_to(visitor);
        code.estimated_at = estimated_at;

        tx.insert(&code).await?;
        if !visitor.validated {
            tx.mark_validated(&visitor.id).await?;
        }
        tx.commit().await?;

        info!(
            access_code_id = %code.id,
            queue_id = %queue.id,
            lane = %lane,
            code = %code.code,
            estimated_at = code.estimated_at,
            "Access code issued"
        );

        Ok(code)
    }

    /// Best-effort side record; a failure leaves the issued code in place
    async fn record_visitor_info(&self, visitor: &Visitor) {
        let info = VisitorInfoRecord::from_visitor(
            self.id_provider.generate_id(),
            visitor,
            self.time_provider.now_millis(),
        );

        if let Err(e) = self.visitor_info.record(&info).await {
            warn!(
                visitor_id = %visitor.id,
                queue_id = %visitor.queue_id,
                error = %e,
                "Failed to record visitor info, access code kept"
            );
        }
    }
}
