// Wait-Time Estimator

use crate::application::constants::{ESTIMATE_SAMPLE_SIZE, MILLIS_PER_SEC, SECS_PER_MINUTE};
use crate::domain::{AccessCode, Queue};
use crate::error::{AppError, Result};
use crate::port::{AccessCodeRepository, QueueRepository, TimeProvider};
use std::sync::Arc;
use tracing::debug;

/// Service history of a queue as seen by the estimator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceHistory {
    /// Sum of whole-second service durations of the sampled completed codes
    pub sampled_secs: i64,
    /// Completed codes in the queue, all time
    pub attended: i64,
    /// Codes created before now that are not completed
    pub pending: i64,
}

impl ServiceHistory {
    pub fn from_samples(samples: &[AccessCode], attended: i64, pending: i64) -> Self {
        let sampled_secs = samples
            .iter()
            .take(ESTIMATE_SAMPLE_SIZE)
            .filter_map(AccessCode::service_secs)
            .sum();
        Self {
            sampled_secs,
            attended,
            pending,
        }
    }
}

/// Predicted ready time in epoch ms, truncated to whole seconds
///
/// The average divides the sampled sum by the all-time attended count, not by
/// the number of samples. With more than ESTIMATE_SAMPLE_SIZE completed codes
/// this shrinks the average; kept as-is until product owners decide otherwise.
pub fn ready_at(now_millis: i64, min_wait_minutes: i64, history: &ServiceHistory) -> i64 {
    let now_secs = now_millis.div_euclid(MILLIS_PER_SEC);

    // Saturating: stored queues and counts are not trusted to be small
    let raw_secs = if history.attended == 0 {
        now_secs
    } else {
        let average = history.sampled_secs / history.attended;
        now_secs.saturating_add(average.saturating_mul(history.pending))
    };

    let floor_secs =
        now_secs.saturating_add(min_wait_minutes.max(0).saturating_mul(SECS_PER_MINUTE));
    raw_secs.max(floor_secs).saturating_mul(MILLIS_PER_SEC)
}

/// Estimates when a newly issued code will be called
pub struct WaitEstimator {
    queues: Arc<dyn QueueRepository>,
    codes: Arc<dyn AccessCodeRepository>,
    time_provider: Arc<dyn TimeProvider>,
}

impl WaitEstimator {
    pub fn new(
        queues: Arc<dyn QueueRepository>,
        codes: Arc<dyn AccessCodeRepository>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            queues,
            codes,
            time_provider,
        }
    }

    /// Estimate for a queue by ID, at the current time
    pub async fn estimate_by_queue_id(&self, queue_id: &str) -> Result<i64> {
        let queue = self
            .queues
            .find_by_id(queue_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Queue {} not found", queue_id)))?;

        self.estimate(&queue, self.time_provider.now_millis()).await
    }

    /// Estimate for an already resolved queue at `now_millis`
    pub async fn estimate(&self, queue: &Queue, now_millis: i64) -> Result<i64> {
        let history = self.history(&queue.id, now_millis).await?;
        let estimated_at = ready_at(now_millis, queue.min_wait_minutes, &history);

        debug!(
            queue_id = %queue.id,
            sampled_secs = history.sampled_secs,
            attended = history.attended,
            pending = history.pending,
            min_wait_minutes = queue.min_wait_minutes,
            estimated_at = estimated_at,
            "Estimated ready time"
        );

        Ok(estimated_at)
    }

    async fn history(&self, queue_id: &str, now_millis: i64) -> Result<ServiceHistory> {
        let samples = self
            .codes
            .find_recent_completed(queue_id, ESTIMATE_SAMPLE_SIZE)
            .await?;
        let attended = self.codes.count_completed(queue_id).await?;
        let pending = self.codes.count_pending(queue_id, now_millis).await?;

        Ok(ServiceHistory::from_samples(&samples, attended, pending))
    }
}
