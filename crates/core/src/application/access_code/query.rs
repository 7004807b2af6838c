// Access code queries and admin operations

use super::AccessCodeService;
use crate::application::constants::MAX_MIN_WAIT_MINUTES;
use crate::domain::{AccessCode, AccessCodeId, IssuedCode, Queue};
use crate::error::{AppError, Result};
use crate::port::{AccessCodeCriteria, StatusFilter};
use tracing::info;

impl AccessCodeService {
    /// Queue by ID
    pub async fn find_queue(&self, queue_id: &str) -> Result<Queue> {
        self.queues
            .find_by_id(queue_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Queue {} not found", queue_id)))
    }

    /// Provision a new queue
    pub async fn create_queue(&self, queue: Queue) -> Result<Queue> {
        if queue.id.trim().is_empty() || queue.name.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "queue id and name must not be empty".to_string(),
            ));
        }
        if !(0..=MAX_MIN_WAIT_MINUTES).contains(&queue.min_wait_minutes) {
            return Err(AppError::InvalidInput(format!(
                "min_wait_minutes must be within 0..={}, got {}",
                MAX_MIN_WAIT_MINUTES, queue.min_wait_minutes
            )));
        }

        self.queues.insert(&queue).await?;
        info!(queue_id = %queue.id, min_wait_minutes = queue.min_wait_minutes, "Queue created");
        Ok(queue)
    }

    /// Load a code, refreshing its stored estimate
    pub async fn find_access_code(&self, id: &AccessCodeId) -> Result<IssuedCode> {
        let mut code = self
            .codes
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Access code {} not found", id)))?;

        let queue = self.queues.find_by_id(&code.queue_id).await?.ok_or_else(|| {
            AppError::PreconditionFailed(format!(
                "Queue {} of access code {} does not exist",
                code.queue_id, code.id
            ))
        })?;

        code.estimated_at = self
            .estimator
            .estimate(&queue, self.time_provider.now_millis())
            .await?;
        self.codes.update(&code).await?;

        Ok(IssuedCode {
            access_code: code,
            queue,
        })
    }

    /// The code currently at the desk: latest IN_SERVICE code of the queue
    pub async fn attending_access_code(&self, queue_id: &str) -> Result<IssuedCode> {
        let queue = self.find_queue(queue_id).await?;

        let access_code = self
            .codes
            .search(&AccessCodeCriteria {
                queue_id: Some(queue.id.clone()),
                status: StatusFilter::InService,
                ..Default::default()
            })
            .await?
            .pop()
            .ok_or_else(|| {
                AppError::NotFound(format!("No access code in service in queue {}", queue.id))
            })?;

        Ok(IssuedCode { access_code, queue })
    }

    pub async fn search_access_codes(
        &self,
        criteria: &AccessCodeCriteria,
    ) -> Result<Vec<AccessCode>> {
        self.codes.search(criteria).await
    }

    /// Store a code as given, e.g. to seed a lane.
    ///
    /// Advances the lane counter, so the next issued code follows this one.
    pub async fn save_access_code(&self, code: AccessCode) -> Result<AccessCode> {
        let queue = self.find_queue(&code.queue_id).await?;

        let _lane_guard = self.lane_locks.acquire(&queue.id, code.lane).await;
        self.codes.insert(&code).await?;

        info!(
            access_code_id = %code.id,
            queue_id = %queue.id,
            lane = %code.lane,
            code = %code.code,
            "Access code saved"
        );

        Ok(code)
    }

    pub async fn delete_access_code(&self, id: &AccessCodeId) -> Result<()> {
        if !self.codes.delete(id).await? {
            return Err(AppError::NotFound(format!("Access code {} not found", id)));
        }

        info!(access_code_id = %id, "Access code deleted");
        Ok(())
    }
}
