// Application Layer - Use Cases and Business Logic

pub mod access_code;
pub mod constants;
pub mod estimator;
pub mod lane_lock;
pub mod sequencer;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports
pub use access_code::{AccessCodeService, LookupRequest};
pub use estimator::WaitEstimator;
pub use lane_lock::LaneLocks;
pub use sequencer::EmptyLane;
