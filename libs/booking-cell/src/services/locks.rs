// libs/booking-cell/src/services/locks.rs
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::models::SessionKey;

/// Per-session-key mutual exclusion for the read-allocate-write sequence.
/// Bookings against different sessions never contend; two writers on the
/// same (doctor, dispensary, date) are serialized. Held only across store
/// reads and the booking write, never across fee lookups or notification
/// sends.
pub struct SessionLockRegistry {
    locks: Mutex<HashMap<SessionKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl SessionLockRegistry {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Get-or-create the lock for one session key.
    pub fn lock_for(&self, key: &SessionKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().expect("session lock registry poisoned");
        let lock = locks
            .entry(*key)
            .or_insert_with(|| {
                debug!("Creating session lock for {}", key);
                Arc::new(tokio::sync::Mutex::new(()))
            })
            .clone();
        lock
    }

    /// Drop lock entries no longer held by anyone. Sessions are daily, so
    /// the registry would otherwise grow one entry per booked day.
    pub fn prune(&self) {
        let mut locks = self.locks.lock().expect("session lock registry poisoned");
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    pub fn len(&self) -> usize {
        self.locks.lock().expect("session lock registry poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionLockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn key(date_day: u32) -> SessionKey {
        SessionKey {
            doctor_id: Uuid::nil(),
            dispensary_id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2024, 6, date_day).unwrap(),
        }
    }

    #[test]
    fn same_key_yields_same_lock() {
        let registry = SessionLockRegistry::new();
        let a = registry.lock_for(&key(10));
        let b = registry.lock_for(&key(10));
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn different_keys_yield_independent_locks() {
        let registry = SessionLockRegistry::new();
        let a = registry.lock_for(&key(10));
        let b = registry.lock_for(&key(11));
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn serializes_writers_on_one_session() {
        let registry = Arc::new(SessionLockRegistry::new());
        // A plain (non-atomic within the critical section) counter; only
        // mutual exclusion keeps the read-modify-write sequence correct.
        let counter = Arc::new(std::sync::Mutex::new(0u32));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = Arc::clone(&registry);
            let counter = Arc::clone(&counter);
            handles.push(tokio::spawn(async move {
                let lock = registry.lock_for(&key(10));
                let _guard = lock.lock().await;
                let read = *counter.lock().unwrap();
                tokio::task::yield_now().await;
                *counter.lock().unwrap() = read + 1;
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*counter.lock().unwrap(), 16);
    }

    #[test]
    fn prune_drops_unheld_entries() {
        let registry = SessionLockRegistry::new();
        let held = registry.lock_for(&key(10));
        let _ = registry.lock_for(&key(11));

        registry.prune();

        assert_eq!(registry.len(), 1);
        drop(held);
        registry.prune();
        assert!(registry.is_empty());
    }
}
