//! One-shot expiration scheduling for Vapormail.
//!
//! Converts a wall-clock deadline into a single lifecycle callback. Each
//! pending entry fires exactly once or not at all: the timer task and
//! `cancel` race for an atomic claim flag, so a firing that has already
//! begun completes and a successful cancel permanently prevents the
//! callback from running.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::debug;

/// A deadline registered under a key.
struct Pending {
    seq: u64,
    claimed: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

struct SchedulerInner {
    pending: Mutex<HashMap<String, Pending>>,
    next_seq: AtomicU64,
}

impl SchedulerInner {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Pending>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Scheduler for one-shot expiration deadlines, keyed by address.
///
/// Firing is driven by the tokio timer wheel, not by coarse polling, so
/// the callback runs no earlier than the deadline and within timer
/// resolution after it.
#[derive(Clone)]
pub struct ExpirationScheduler {
    inner: Arc<SchedulerInner>,
}

impl Default for ExpirationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpirationScheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                pending: Mutex::new(HashMap::new()),
                next_seq: AtomicU64::new(1),
            }),
        }
    }

    /// Register `on_expire` to run once the deadline has passed.
    ///
    /// Re-scheduling a key implicitly cancels any prior pending deadline
    /// for that key. A deadline already in the past fires immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, key: &str, deadline: DateTime<Utc>, on_expire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let delay = (deadline - Utc::now())
            .to_std()
            .unwrap_or(std::time::Duration::ZERO);
        let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed);
        let claimed = Arc::new(AtomicBool::new(false));

        // Hold the map lock across the spawn so the task cannot observe the
        // map before its own entry is inserted.
        let mut pending = self.inner.lock();
        if let Some(previous) = pending.remove(key) {
            Self::revoke(&previous);
            debug!(key = %key, "Replaced pending deadline");
        }

        let task = {
            let claimed = Arc::clone(&claimed);
            let inner = Arc::clone(&self.inner);
            let key = key.to_string();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if claimed
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_err()
                {
                    return;
                }
                // Drop our own entry before running the callback so the
                // callback may re-schedule the same key.
                {
                    let mut pending = inner.lock();
                    if pending.get(&key).is_some_and(|p| p.seq == seq) {
                        pending.remove(&key);
                    }
                }
                debug!(key = %key, "Expiration deadline fired");
                on_expire();
            })
        };

        pending.insert(key.to_string(), Pending { seq, claimed, task });
    }

    /// Cancel the pending deadline for a key.
    ///
    /// Returns `true` if cancellation won: the callback has not started and
    /// will never run. Returns `false` if there was no pending entry or the
    /// firing already claimed it; in the latter case the callback completes
    /// (or has completed) and the caller resolves the race.
    pub fn cancel(&self, key: &str) -> bool {
        let entry = self.inner.lock().remove(key);
        match entry {
            Some(pending) => {
                let won = Self::revoke(&pending);
                debug!(key = %key, cancelled = won, "Cancel requested");
                won
            }
            None => false,
        }
    }

    /// Number of pending deadlines.
    pub fn pending_count(&self) -> usize {
        self.inner.lock().len()
    }

    /// Claim an entry away from its timer task and stop the task.
    fn revoke(pending: &Pending) -> bool {
        let won = pending
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        pending.task.abort();
        won
    }
}
