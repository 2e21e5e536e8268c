//! De-duplication of Events API deliveries.
//!
//! Slack delivers events at least once and retries when the ack is slow, so
//! the same `event_id` can arrive several times, possibly concurrently. The
//! registry remembers ids for a bounded window and hands out each id exactly
//! once.

use std::time::Duration;

use moka::policy::EvictionPolicy;
use moka::sync::Cache;

/// Clones share the same underlying cache.
#[derive(Clone)]
pub struct ProcessedEventRegistry {
    seen: Cache<String, ()>,
}

impl ProcessedEventRegistry {
    /// At capacity the least recently seen id is evicted; a new id is always kept.
    #[must_use]
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        Self {
            seen: Cache::builder()
                .max_capacity(max_entries)
                .eviction_policy(EvictionPolicy::lru())
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Record `event_id` and report whether this call was the first to see it.
    ///
    /// Check and insert happen as one atomic operation: of any number of
    /// concurrent callers with the same id, exactly one gets `true`.
    pub fn check_and_insert(&self, event_id: &str) -> bool {
        self.seen.entry(event_id.to_string()).or_insert(()).is_fresh()
    }

    #[must_use]
    pub fn contains(&self, event_id: &str) -> bool {
        self.seen.contains_key(event_id)
    }

    /// Number of remembered ids after pending evictions are applied.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.seen.run_pending_tasks();
        self.seen.entry_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
