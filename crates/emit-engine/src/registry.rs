//! Process-local, volatile mapping from `TransactionKey` to `PreparedClaim`
//! (spec §4.4). On process restart, in-flight prepared claims are lost and
//! their Confirm calls fail with `UnknownTransactionKey` — the correct
//! behavior, not a bug to work around.

use dashmap::DashMap;
use emit_core::{MonotonicMs, PreparedClaim, TransactionKey};

pub struct PendingClaimRegistry {
    entries: DashMap<TransactionKey, PreparedClaim>,
    ttl_ms: u64,
}

impl PendingClaimRegistry {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl_ms: ttl_secs.saturating_mul(1000),
        }
    }

    /// Removes all entries older than the TTL. Callers MUST invoke this
    /// before `insert` on every Prepare so a new insert is never collapsed
    /// against a just-expired entry — keys cannot collide, but the
    /// "cleanup first" ordering is a construction invariant regardless.
    pub fn sweep(&self, now_ms: MonotonicMs) {
        self.entries
            .retain(|_, claim| now_ms.saturating_sub(claim.prepared_at_ms) <= self.ttl_ms);
    }

    pub fn insert(&self, key: TransactionKey, claim: PreparedClaim) {
        self.entries.insert(key, claim);
    }

    /// Atomic get-and-delete. Returns `None` if absent or if the entry has
    /// aged out past the TTL (a lazily-evaluated expiry check in addition
    /// to the opportunistic sweep, so a Confirm racing a slow sweep still
    /// observes TTL semantics correctly).
    pub fn take(&self, key: &TransactionKey, now_ms: MonotonicMs) -> Option<PreparedClaim> {
        let (_, claim) = self.entries.remove(key)?;
        if now_ms.saturating_sub(claim.prepared_at_ms) > self.ttl_ms {
            None
        } else {
            Some(claim)
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
