//! Cache Entry Module
//!
//! Defines a single cached mapping together with the timer that expires it.

use std::time::Instant;

use crate::cache::TimerId;

// == Cache Entry ==
/// Represents one live key/value pair and its armed expiration timer.
#[derive(Debug, Clone)]
pub struct CacheEntry<K, V> {
    /// The key, kept so eviction can clear the lookup index
    pub key: K,
    /// The stored value
    pub value: V,
    /// Timer currently armed for this entry
    pub timer: TimerId,
    /// Deadline of the armed timer
    pub expires_at: Instant,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructor ==
    /// Creates a new entry whose timer `timer` fires at `expires_at`.
    pub fn new(key: K, value: V, timer: TimerId, expires_at: Instant) -> Self {
        Self {
            key,
            value,
            timer,
            expires_at,
        }
    }

    // == Refresh ==
    /// Replaces the value and swaps in a freshly armed timer.
    ///
    /// The previous timer is retired: its queue record no longer matches
    /// `self.timer` and is ignored when it comes due.
    pub fn refresh(&mut self, value: V, timer: TimerId, expires_at: Instant) {
        self.value = value;
        self.timer = timer;
        self.expires_at = expires_at;
    }

    // == Is Expired ==
    /// Checks if the entry's deadline has been reached at `now`.
    ///
    /// Boundary condition: an entry is expired once `now >= expires_at`.
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn entry_expiring_in(ttl: Duration) -> (CacheEntry<i64, String>, Instant) {
        let now = Instant::now();
        let entry = CacheEntry::new(1, "one".to_string(), TimerId::new(7), now + ttl);
        (entry, now)
    }

    #[test]
    fn test_entry_creation() {
        let (entry, now) = entry_expiring_in(Duration::from_secs(5));

        assert_eq!(entry.key, 1);
        assert_eq!(entry.value, "one");
        assert_eq!(entry.timer, TimerId::new(7));
        assert!(!entry.is_expired(now));
    }

    #[test]
    fn test_entry_expiration_boundary() {
        let (entry, now) = entry_expiring_in(Duration::from_secs(1));

        assert!(!entry.is_expired(now + Duration::from_millis(999)));
        assert!(
            entry.is_expired(now + Duration::from_secs(1)),
            "Entry should be expired at boundary"
        );
        assert!(entry.is_expired(now + Duration::from_secs(2)));
    }

    #[test]
    fn test_refresh_replaces_value_and_timer() {
        let (mut entry, now) = entry_expiring_in(Duration::from_secs(1));
        let later = now + Duration::from_secs(3);

        entry.refresh("newOne".to_string(), TimerId::new(8), later);

        assert_eq!(entry.value, "newOne");
        assert_eq!(entry.timer, TimerId::new(8));
        assert_eq!(entry.expires_at, later);
        assert!(!entry.is_expired(now + Duration::from_secs(2)));
    }
}
