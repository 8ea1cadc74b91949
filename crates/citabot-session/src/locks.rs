// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-identity critical sections.
//!
//! Two inbound messages for the same identity (duplicate transport
//! delivery, or two genuinely fast messages) must not interleave their
//! load-merge-save cycles, or slot updates are lost. Different identities
//! never contend.

use std::sync::Arc;
use std::time::{Duration, Instant};

use citabot_core::types::Identity;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

struct LockEntry {
    mutex: Arc<Mutex<()>>,
    last_used: Instant,
}

/// Keyed mutex registry, one lock per identity, created on first use.
pub struct IdentityLocks {
    locks: DashMap<String, LockEntry>,
    idle_ttl: Duration,
}

impl IdentityLocks {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            locks: DashMap::new(),
            idle_ttl,
        }
    }

    /// Acquires the lock for an identity, waiting if another turn for the
    /// same identity is in flight.
    pub async fn acquire(&self, identity: &Identity) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut entry = self
                .locks
                .entry(identity.as_str().to_string())
                .or_insert_with(|| LockEntry {
                    mutex: Arc::new(Mutex::new(())),
                    last_used: Instant::now(),
                });
            entry.last_used = Instant::now();
            Arc::clone(&entry.mutex)
        };
        mutex.lock_owned().await
    }

    /// Drops lock entries idle beyond the TTL and not currently held.
    ///
    /// A held lock keeps an extra Arc reference alive, which is how we
    /// avoid removing a lock out from under its guard.
    pub fn sweep(&self) -> usize {
        let before = self.locks.len();
        self.locks.retain(|_, entry| {
            entry.last_used.elapsed() < self.idle_ttl || Arc::strong_count(&entry.mutex) > 1
        });
        let dropped = before - self.locks.len();
        if dropped > 0 {
            debug!(dropped, "swept idle identity locks");
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn identity() -> Identity {
        Identity::normalize("+34600111222")
    }

    #[tokio::test]
    async fn same_identity_turns_are_serialized() {
        let locks = Arc::new(IdentityLocks::new(Duration::from_secs(300)));
        let in_section = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = Arc::clone(&locks);
            let in_section = Arc::clone(&in_section);
            let max_seen = Arc::clone(&max_seen);
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(&identity()).await;
                let now = in_section.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_section.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_identities_do_not_contend() {
        let locks = IdentityLocks::new(Duration::from_secs(300));
        let _a = locks.acquire(&identity()).await;
        // Would deadlock if identities shared a lock.
        let _b = locks.acquire(&Identity::normalize("+34600999888")).await;
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn sweep_keeps_held_locks() {
        let locks = IdentityLocks::new(Duration::from_millis(0));
        let guard = locks.acquire(&identity()).await;

        // Idle TTL is zero but the lock is held, so it survives.
        assert_eq!(locks.sweep(), 0);
        assert_eq!(locks.len(), 1);

        drop(guard);
        assert_eq!(locks.sweep(), 1);
        assert!(locks.is_empty());
    }
}
