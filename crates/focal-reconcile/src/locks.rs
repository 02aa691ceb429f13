//! Keyed per-record locking.
//!
//! Reconciliation passes read-then-write several record fields
//! non-atomically, so concurrent passes against the same record id must
//! be serialized. Passes against different ids stay independent, which a
//! single process-wide mutex would needlessly prevent.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// A set of per-record-id async mutexes.
///
/// Lock entries are created on first use and retained for the lifetime
/// of the set.
#[derive(Default)]
pub struct RecordLocks {
    inner: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl RecordLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for one record id, waiting if another pass holds it.
    pub async fn acquire(&self, id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(map.entry(id).or_default())
        };

        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_same_id_serializes() {
        let locks = Arc::new(RecordLocks::new());
        let id = Uuid::new_v4();

        let guard = locks.acquire(id).await;

        let locks2 = Arc::clone(&locks);
        let pending = tokio::spawn(async move { locks2.acquire(id).await });

        // The second acquire must wait while the first guard is held.
        tokio::task::yield_now().await;
        assert!(!pending.is_finished());

        drop(guard);
        let second = timeout(Duration::from_secs(1), pending).await;
        assert!(second.is_ok(), "lock released to the waiting pass");
    }

    #[tokio::test]
    async fn test_different_ids_are_independent() {
        let locks = RecordLocks::new();

        let _a = locks.acquire(Uuid::new_v4()).await;
        let b = timeout(Duration::from_millis(100), locks.acquire(Uuid::new_v4())).await;

        assert!(b.is_ok(), "unrelated record ids must not contend");
    }

    #[tokio::test]
    async fn test_reacquire_after_release() {
        let locks = RecordLocks::new();
        let id = Uuid::new_v4();

        drop(locks.acquire(id).await);
        let again = timeout(Duration::from_millis(100), locks.acquire(id)).await;
        assert!(again.is_ok());
    }
}
