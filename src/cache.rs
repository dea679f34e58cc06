//! Identity-keyed memoization of boolean verdicts. Entries follow the
//! lifetime of their loading context: the cache holds a `Weak` handle only,
//! so it never keeps a context alive, and dead entries are purged as a side
//! effect of inserts (or explicitly via `purge`).
//!
//! No lock is held while a verdict is computed. Probes run host-runtime
//! code that can trigger further loading and re-enter this cache on the
//! same thread; a computation instead claims a per-key in-flight slot, so
//! concurrent callers for that key wait on the slot while re-entrant calls
//! for other keys proceed.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, PoisonError, RwLock, Weak};
use std::thread::{self, ThreadId};

use crate::context::{context_key, ContextRef, LoadingContext};

struct Entry {
    context: Weak<dyn LoadingContext>,
    verdict: bool,
}

impl Entry {
    /// A published verdict counts only while its context is the same live
    /// instance. An address reused by a newer context upgrades to a
    /// different instance (or not at all) and reads as a miss.
    fn verdict_for(&self, ctx: &ContextRef) -> Option<bool> {
        let live = self.context.upgrade()?;
        if context_key(&live) == context_key(ctx) {
            Some(self.verdict)
        } else {
            None
        }
    }

    fn is_live(&self) -> bool {
        self.context.strong_count() > 0
    }
}

/// A computation in progress for one key. Other threads block on `ready`;
/// the owning thread is recorded so its own nested queries for this key are
/// recognized instead of deadlocking.
struct InFlight {
    owner: ThreadId,
    result: Mutex<Option<bool>>,
    ready: Condvar,
}

enum Slot {
    InFlight(Arc<InFlight>),
    Done(Entry),
}

/// What a lookup found for a key, resolved under the entries lock.
enum Claim {
    Published(bool),
    Wait(Arc<InFlight>),
    Reentrant,
    Compute(Arc<InFlight>),
}

/// Concurrent map from context identity to a memoized boolean.
///
/// Hits take one read lock. On a miss the caller claims the key and runs
/// `compute` with no lock held; racing callers for the same key wait for
/// that one computation, callers for other keys are untouched.
#[derive(Default)]
pub struct VerdictCache {
    entries: RwLock<HashMap<usize, Slot>>,
}

impl VerdictCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the published verdict for `ctx`, computing and publishing it
    /// on first query. `compute` must fold its own failures into `false`;
    /// the cache publishes whatever it returns.
    ///
    /// At most one computation runs per key at a time. A query made from
    /// inside a computation on the same thread for the same key (a probe
    /// triggering a load that asks about its own context) recomputes
    /// instead of blocking; the outer call publishes.
    pub fn get_or_compute<F: FnOnce() -> bool>(&self, ctx: &ContextRef, compute: F) -> bool {
        let key = context_key(ctx);
        let claim = {
            let mut entries = write(&self.entries);
            let found = match entries.get(&key) {
                Some(Slot::Done(entry)) => entry.verdict_for(ctx).map(Claim::Published),
                Some(Slot::InFlight(flight)) => {
                    Some(if flight.owner == thread::current().id() {
                        Claim::Reentrant
                    } else {
                        Claim::Wait(flight.clone())
                    })
                }
                None => None,
            };
            match found {
                Some(claim) => claim,
                // Vacant, or a dead entry left by a reclaimed context.
                None => {
                    let flight = Arc::new(InFlight {
                        owner: thread::current().id(),
                        result: Mutex::new(None),
                        ready: Condvar::new(),
                    });
                    entries.insert(key, Slot::InFlight(flight.clone()));
                    Claim::Compute(flight)
                }
            }
        };

        match claim {
            Claim::Published(verdict) => verdict,
            Claim::Reentrant => compute(),
            Claim::Wait(flight) => {
                let mut result = lock(&flight.result);
                loop {
                    if let Some(verdict) = *result {
                        return verdict;
                    }
                    result = flight
                        .ready
                        .wait(result)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
            Claim::Compute(flight) => {
                let verdict = compute();
                {
                    let mut entries = write(&self.entries);
                    entries.retain(|_, slot| match slot {
                        Slot::Done(entry) => entry.is_live(),
                        Slot::InFlight(_) => true,
                    });
                    entries.insert(
                        key,
                        Slot::Done(Entry {
                            context: Arc::downgrade(ctx),
                            verdict,
                        }),
                    );
                }
                *lock(&flight.result) = Some(verdict);
                flight.ready.notify_all();
                verdict
            }
        }
    }

    /// The published verdict for `ctx`, if any. An in-flight computation
    /// is not yet a verdict.
    pub fn get(&self, ctx: &ContextRef) -> Option<bool> {
        match read(&self.entries).get(&context_key(ctx)) {
            Some(Slot::Done(entry)) => entry.verdict_for(ctx),
            _ => None,
        }
    }

    /// Number of published entries whose context is still alive.
    pub fn len(&self) -> usize {
        read(&self.entries)
            .values()
            .filter(|slot| matches!(slot, Slot::Done(entry) if entry.is_live()))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop entries whose context has been reclaimed.
    pub fn purge(&self) {
        write(&self.entries).retain(|_, slot| match slot {
            Slot::Done(entry) => entry.is_live(),
            Slot::InFlight(_) => true,
        });
    }
}

// Verdicts are plain bools; a map abandoned mid-write by a panicking thread
// is still coherent, so poisoned guards are recovered rather than propagated.
fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(l: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    l.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(l: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    l.write().unwrap_or_else(PoisonError::into_inner)
}
