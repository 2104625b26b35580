//! Echo session identity and lifetime tracking.
//!
//! # Responsibilities
//! - Generate unique session IDs for tracing
//! - Count live sessions so shutdown can wait for them to drain

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

/// Global atomic counter for session IDs.
/// Relaxed ordering is enough since we only need uniqueness.
static SESSION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for an echo session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    /// Generate a new unique session ID.
    pub fn new() -> Self {
        Self(SESSION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ws-{}", self.0)
    }
}

/// Tracks live echo sessions for graceful shutdown.
#[derive(Debug, Clone, Default)]
pub struct SessionTracker {
    inner: Arc<TrackerInner>,
}

#[derive(Debug, Default)]
struct TrackerInner {
    active: AtomicU64,
    drained: Notify,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new live session. Returns a guard that releases it on drop.
    pub fn track(&self) -> SessionGuard {
        self.inner.active.fetch_add(1, Ordering::SeqCst);
        SessionGuard {
            inner: Arc::clone(&self.inner),
            id: SessionId::new(),
        }
    }

    pub fn active_count(&self) -> u64 {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Wait until no sessions remain or `deadline` elapses.
    ///
    /// Returns `true` if every session closed in time.
    pub async fn wait_for_drain(&self, deadline: Duration) -> bool {
        let drained = async {
            loop {
                let notified = self.inner.drained.notified();
                if self.active_count() == 0 {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(deadline, drained).await.is_ok()
    }
}

/// Guard held for a session's lifetime.
#[derive(Debug)]
pub struct SessionGuard {
    inner: Arc<TrackerInner>,
    id: SessionId,
}

impl SessionGuard {
    pub fn id(&self) -> SessionId {
        self.id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if self.inner.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.drained.notify_waiters();
        }
        tracing::trace!(session_id = %self.id, "Session released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_unique() {
        let id1 = SessionId::new();
        let id2 = SessionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn session_tracker_counts() {
        let tracker = SessionTracker::new();
        assert_eq!(tracker.active_count(), 0);

        let guard1 = tracker.track();
        assert_eq!(tracker.active_count(), 1);

        let guard2 = tracker.track();
        assert_eq!(tracker.active_count(), 2);

        drop(guard1);
        assert_eq!(tracker.active_count(), 1);

        drop(guard2);
        assert_eq!(tracker.active_count(), 0);
    }

    #[tokio::test]
    async fn drain_completes_when_last_guard_drops() {
        let tracker = SessionTracker::new();
        let guard = tracker.track();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            drop(guard);
        });

        assert!(tracker.wait_for_drain(Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn drain_times_out_with_live_session() {
        let tracker = SessionTracker::new();
        let _guard = tracker.track();
        assert!(!tracker.wait_for_drain(Duration::from_millis(30)).await);
    }
}
