//! TTL Expiry Worker
//!
//! Background thread that fires cache entry timers as their deadlines pass.

use std::hash::Hash;
use std::sync::{Arc, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{debug, error, trace};

use crate::cache::Shared;

/// Spawns the thread that removes expired entries from `shared`.
///
/// The worker sleeps on the cache's condition variable until the earliest
/// queued deadline, or until `put` arms an earlier one. It holds the cache
/// lock only while firing timers and exits once `shutdown` is set.
///
/// Returns None if the OS refuses a new thread; lookups and writes still
/// fire due timers themselves, so expiry then happens on next access.
pub(crate) fn spawn_expiry_worker<K, V>(shared: Arc<Shared<K, V>>) -> Option<JoinHandle<()>>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    let spawned = thread::Builder::new()
        .name("lru-expiry".to_string())
        .spawn(move || run(&shared));

    match spawned {
        Ok(handle) => Some(handle),
        Err(err) => {
            error!(%err, "failed to spawn expiry worker, entries will expire on access");
            None
        }
    }
}

fn run<K, V>(shared: &Shared<K, V>)
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    debug!("expiry worker started");
    let mut state = shared.lock();

    while !state.shutdown {
        let expired = state.expire_due(Instant::now());
        if expired > 0 {
            debug!(expired, remaining = state.len(), "TTL expiry removed entries");
        }

        state = match state.next_deadline() {
            Some(deadline) => {
                let timeout = deadline.saturating_duration_since(Instant::now());
                trace!(?timeout, "expiry worker sleeping until next deadline");
                shared
                    .wakeup
                    .wait_timeout(state, timeout)
                    .map(|(guard, _)| guard)
                    .unwrap_or_else(|poisoned| poisoned.into_inner().0)
            }
            None => shared
                .wakeup
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner),
        };
    }

    debug!("expiry worker stopped");
}
