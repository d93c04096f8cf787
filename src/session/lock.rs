//! Per-session mutual exclusion
//!
//! A fulfillment is a read-modify-write over several store fields. Two
//! overlapping requests for the same session would both read the same
//! `position_history` and one update would be lost, so the dispatcher holds
//! a [`SessionGuard`] for the whole call. Different sessions never contend.
//!
//! Each table entry counts the requests holding or waiting for it. The count
//! is only changed under the table lock and the entry is removed when it
//! drops to zero, whether the last user released the lock or gave up
//! waiting (a cancelled request future).

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

struct Slot {
    lock: Arc<AsyncMutex<()>>,
    users: usize,
}

type LockTable = Mutex<HashMap<String, Slot>>;

/// Table of per-session async locks
#[derive(Default, Clone)]
pub struct SessionLocks {
    table: Arc<LockTable>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `session_id`
    pub async fn acquire(&self, session_id: &str) -> SessionGuard {
        let lock = {
            let mut table = self.table.lock();
            let slot = table.entry(session_id.to_string()).or_insert_with(|| Slot {
                lock: Arc::new(AsyncMutex::new(())),
                users: 0,
            });
            slot.users += 1;
            Arc::clone(&slot.lock)
        };
        // Dropped with the future if the wait is cancelled
        let registration = Registration {
            session_id: session_id.to_string(),
            table: Arc::clone(&self.table),
        };
        let guard = lock.lock_owned().await;
        SessionGuard {
            guard: Some(guard),
            registration,
        }
    }

    /// Sessions with a request in flight or waiting
    pub fn active(&self) -> usize {
        self.table.lock().len()
    }
}

impl std::fmt::Debug for SessionLocks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLocks")
            .field("active", &self.active())
            .finish()
    }
}

/// One request's claim on a table entry
struct Registration {
    session_id: String,
    table: Arc<LockTable>,
}

impl Drop for Registration {
    fn drop(&mut self) {
        let mut table = self.table.lock();
        let Some(slot) = table.get_mut(&self.session_id) else {
            return;
        };
        slot.users = slot.users.saturating_sub(1);
        if slot.users == 0 {
            table.remove(&self.session_id);
        }
    }
}

/// Exclusive access to one session; released on drop
pub struct SessionGuard {
    guard: Option<OwnedMutexGuard<()>>,
    registration: Registration,
}

impl SessionGuard {
    pub fn session_id(&self) -> &str {
        &self.registration.session_id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        // Unlock before the registration gives up the entry
        drop(self.guard.take());
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("session_id", &self.session_id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_session_is_serialized() {
        let locks = SessionLocks::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let inside = Arc::clone(&inside);
            let peak = Arc::clone(&peak);
            tasks.push(tokio::spawn(async move {
                let _guard = locks.acquire("same").await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn test_different_sessions_do_not_block() {
        let locks = SessionLocks::new();
        let _a = locks.acquire("a").await;
        let b = tokio::time::timeout(Duration::from_millis(50), locks.acquire("b")).await;
        assert!(b.is_ok());
        assert_eq!(locks.active(), 2);
    }

    #[tokio::test]
    async fn test_entry_removed_after_release() {
        let locks = SessionLocks::new();
        {
            let guard = locks.acquire("s").await;
            assert_eq!(guard.session_id(), "s");
            assert_eq!(locks.active(), 1);
        }
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_waiter_does_not_leak_entry() {
        let locks = SessionLocks::new();
        let holder = locks.acquire("s").await;

        let mut waiting = Box::pin(locks.acquire("s"));
        let timed_out = tokio::time::timeout(Duration::from_millis(10), waiting.as_mut()).await;
        assert!(timed_out.is_err());

        // Holder leaves while the waiter is still queued, then the waiter is abandoned
        drop(holder);
        drop(waiting);
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn test_waiter_cancelled_before_release() {
        let locks = SessionLocks::new();
        let holder = locks.acquire("s").await;
        let gave_up = tokio::time::timeout(Duration::from_millis(10), locks.acquire("s")).await;
        assert!(gave_up.is_err());
        assert_eq!(locks.active(), 1);

        drop(holder);
        assert_eq!(locks.active(), 0);
        let _again = locks.acquire("s").await;
        assert_eq!(locks.active(), 1);
    }
}
