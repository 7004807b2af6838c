// Issuance constants (no magic values)

/// Completed services sampled for the average service time
pub const ESTIMATE_SAMPLE_SIZE: usize = 10;

/// Seconds per minute of queue minimum-wait floor
pub const SECS_PER_MINUTE: i64 = 60;

/// Milliseconds per second (timestamps are epoch ms)
pub const MILLIS_PER_SEC: i64 = 1000;

/// Largest minimum-wait floor a queue may be provisioned with (one week)
pub const MAX_MIN_WAIT_MINUTES: i64 = 7 * 24 * 60;
