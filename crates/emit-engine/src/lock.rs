//! Per-token asynchronous mutual exclusion (spec §4.5). Lazily created,
//! never destroyed within the process lifetime; FIFO queueing within a
//! token is provided by `tokio::sync::Mutex`'s underlying semaphore.
//! Guaranteed release on every exit path, including an early `?` return or
//! a panic, falls out of `tokio::sync::OwnedMutexGuard`'s `Drop` impl —
//! there is no path through `acquire` that can leak the lock.

use std::sync::Arc;

use dashmap::DashMap;
use emit_core::Address;
use tokio::sync::{Mutex, OwnedMutexGuard};

pub struct ClaimLock {
    per_token: DashMap<Address, Arc<Mutex<()>>>,
}

/// Held for the duration of a Confirm's critical section. Dropping it — by
/// any means, including stack unwind — releases the next queued waiter.
pub type LockGuard = OwnedMutexGuard<()>;

impl ClaimLock {
    pub fn new() -> Self {
        Self {
            per_token: DashMap::new(),
        }
    }

    /// Enqueue behind the current holder (if any) and resolve once this
    /// caller becomes the holder.
    pub async fn acquire(&self, token: Address) -> LockGuard {
        let mutex = self
            .per_token
            .entry(token)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }
}

impl Default for ClaimLock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn addr(b: u8) -> Address {
        Address::from_bytes([b; 32])
    }

    #[tokio::test]
    async fn lock_is_releasable_after_any_outcome() {
        let lock = ClaimLock::new();
        let token = addr(1);

        let guard = lock.acquire(token).await;
        drop(guard);

        // Re-acquiring must not deadlock.
        let _guard2 = tokio::time::timeout(Duration::from_millis(200), lock.acquire(token))
            .await
            .expect("lock must be releasable by a subsequent acquire");
    }

    #[tokio::test]
    async fn distinct_tokens_do_not_block_each_other() {
        let lock = ClaimLock::new();
        let _held_a = lock.acquire(addr(1)).await;

        let acquired_b = tokio::time::timeout(Duration::from_millis(200), lock.acquire(addr(2))).await;
        assert!(acquired_b.is_ok(), "unrelated tokens must not serialize");
    }

    #[tokio::test]
    async fn second_waiter_blocks_until_first_releases() {
        let lock = Arc::new(ClaimLock::new());
        let token = addr(3);
        let guard = lock.acquire(token).await;

        let lock2 = lock.clone();
        let waiter = tokio::spawn(async move {
            let _g = lock2.acquire(token).await;
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished(), "waiter must block while holder lives");

        drop(guard);
        waiter.await.unwrap();
    }
}
