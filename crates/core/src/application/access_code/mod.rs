// Access Code Service - issuance, lookup and queries

pub mod issue;
pub mod lookup;
pub mod query;


pub use lookup::LookupRequest;

use crate::application::estimator::WaitEstimator;
use crate::application::lane_lock::LaneLocks;
use crate::port::{
    AccessCodeRepository, IdProvider, QueueRepository, TimeProvider,
    TransactionalAccessCodeRepository, VisitorInfoSink, VisitorRepository,
};
use std::sync::Arc;

/// Access Code Service
///
/// Owns the per-lane locks, so one instance must be shared by every caller
/// issuing codes against the same store.
pub struct AccessCodeService {
    queues: Arc<dyn QueueRepository>,
    visitors: Arc<dyn VisitorRepository>,
    codes: Arc<dyn AccessCodeRepository>,
    tx_codes: Arc<dyn TransactionalAccessCodeRepository>,
    visitor_info: Arc<dyn VisitorInfoSink>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    estimator: WaitEstimator,
    lane_locks: LaneLocks,
}

impl AccessCodeService {
    pub fn new(
        queues: Arc<dyn QueueRepository>,
        visitors: Arc<dyn VisitorRepository>,
        codes: Arc<dyn AccessCodeRepository>,
        tx_codes: Arc<dyn TransactionalAccessCodeRepository>,
        visitor_info: Arc<dyn VisitorInfoSink>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        let estimator = WaitEstimator::new(
            Arc::clone(&queues),
            Arc::clone(&codes),
            Arc::clone(&time_provider),
        );

        Self {
            queues,
            visitors,
            codes,
            tx_codes,
            visitor_info,
            id_provider,
            time_provider,
            estimator,
            lane_locks: LaneLocks::new(),
        }
    }

    pub fn estimator(&self) -> &WaitEstimator {
        &self.estimator
    }
}
