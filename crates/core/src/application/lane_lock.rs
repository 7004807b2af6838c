// Per-lane critical sections for code allocation

use crate::domain::{Lane, QueueId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Keyed async mutexes, one per (queue, lane)
///
/// Holding the guard serialises "read lane counter -> compute next -> persist"
/// for that lane inside this process. Other lanes are not blocked.
#[derive(Default)]
pub struct LaneLocks {
    locks: Mutex<HashMap<(QueueId, Lane), Arc<Mutex<()>>>>,
}

impl LaneLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to the lane
    pub async fn acquire(&self, queue_id: &str, lane: Lane) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry((queue_id.to_string(), lane))
                .or_default()
                .clone()
        };
        lock.lock_owned().await
    }

    /// Hold every lane of the queue, NORMAL first then PRIORITY.
    ///
    /// Needed when a decision spans lanes, such as "does this visitor already
    /// hold a code in the queue". Single-lane holders never wait on a second
    /// lock, so the fixed order cannot deadlock.
    pub async fn acquire_queue(&self, queue_id: &str) -> QueueGuard {
        let normal = self.acquire(queue_id, Lane::Normal).await;
        let priority = self.acquire(queue_id, Lane::Priority).await;
        QueueGuard {
            _normal: normal,
            _priority: priority,
        }
    }
}

/// Both lane guards of one queue, released together on drop
pub struct QueueGuard {
    _normal: OwnedMutexGuard<()>,
    _priority: OwnedMutexGuard<()>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_lane_is_exclusive() {
        let locks = Arc::new(LaneLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let inside = inside.clone();
            let max_seen = max_seen.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire("q1", Lane::Normal).await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_lanes_not_blocked() {
        let locks = LaneLocks::new();
        let _normal = locks.acquire("q1", Lane::Normal).await;

        let vip = tokio::time::timeout(
            Duration::from_millis(100),
            locks.acquire("q1", Lane::Priority),
        )
        .await;
        assert!(vip.is_ok(), "priority lane must not wait on normal lane");

        let other_queue =
            tokio::time::timeout(Duration::from_millis(100), locks.acquire("q2", Lane::Normal))
                .await;
        assert!(other_queue.is_ok());
    }

    #[tokio::test]
    async fn test_queue_guard_blocks_both_lanes() {
        let locks = LaneLocks::new();
        let guard = locks.acquire_queue("q1").await;

        for lane in [Lane::Normal, Lane::Priority] {
            let blocked =
                tokio::time::timeout(Duration::from_millis(50), locks.acquire("q1", lane)).await;
            assert!(blocked.is_err(), "{} lane must wait for the queue guard", lane);
        }
        let other_queue =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire_queue("q2")).await;
        assert!(other_queue.is_ok());

        drop(guard);
        let normal =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire("q1", Lane::Normal)).await;
        assert!(normal.is_ok());
    }
}
