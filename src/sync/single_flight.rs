//! Duplicate-call suppression ("single flight").
//!
//! When several threads call [`SingleFlight::run`] with the same key while a
//! call for that key is already executing, only the first (the leader) runs
//! its closure. The others block until the leader finishes and receive a clone
//! of the leader's `Result`, error included.
//!
//! ```text
//!   thread A ── run("k", f) ──► register ──► f() ─────────► store ─► notify ─► unregister
//!   thread B ── run("k", g) ──────► join ──► wait ...........................► clone result
//!   thread C ── run("k", h) ────────► join ──► wait .........................► clone result
//! ```
//!
//! The registration stays in the map until the result has been stored, so a
//! caller arriving mid-publication still joins the finished call instead of
//! starting a new one. A call arriving after unregistration starts afresh.
//!
//! There is no timeout or cancellation: joiners block until the leader's
//! closure returns. If the closure panics, the registration is removed, every
//! joiner panics with a message naming the leader's panic, and the leader's
//! panic resumes on the leader thread.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::thread;
//!
//! use evictkit::sync::SingleFlight;
//!
//! let flight: Arc<SingleFlight<&str, u64, String>> = Arc::new(SingleFlight::new());
//! let loads = Arc::new(AtomicUsize::new(0));
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|_| {
//!         let flight = Arc::clone(&flight);
//!         let loads = Arc::clone(&loads);
//!         thread::spawn(move || {
//!             flight.run("config", || {
//!                 loads.fetch_add(1, Ordering::SeqCst);
//!                 Ok(7)
//!             })
//!         })
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     assert_eq!(handle.join().unwrap(), Ok(7));
//! }
//! assert!(loads.load(Ordering::SeqCst) >= 1);
//! assert_eq!(flight.in_flight(), 0);
//! ```

use std::any::Any;
use std::fmt;
use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap;

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        return format!("single-flight leader panicked: {msg}");
    }
    if let Some(msg) = payload.downcast_ref::<String>() {
        return format!("single-flight leader panicked: {msg}");
    }
    "single-flight leader panicked".to_string()
}

enum CallState<V, E> {
    Pending,
    Done(Result<V, E>),
    Panicked(String),
}

struct Call<V, E> {
    state: Mutex<CallState<V, E>>,
    done: Condvar,
    waiters: Mutex<usize>,
}

impl<V: Clone, E: Clone> Call<V, E> {
    fn new() -> Self {
        Self {
            state: Mutex::new(CallState::Pending),
            done: Condvar::new(),
            waiters: Mutex::new(0),
        }
    }

    fn publish(&self, outcome: CallState<V, E>) {
        *self.state.lock() = outcome;
        self.done.notify_all();
    }

    fn wait(&self) -> Result<V, E> {
        let mut state = self.state.lock();
        while matches!(*state, CallState::Pending) {
            self.done.wait(&mut state);
        }
        let outcome = match &*state {
            CallState::Done(result) => Ok(result.clone()),
            CallState::Panicked(msg) => Err(msg.clone()),
            CallState::Pending => Err("single-flight call released without a result".to_string()),
        };
        drop(state);
        *self.waiters.lock() -= 1;

        match outcome {
            Ok(result) => result,
            Err(msg) => panic!("{msg}"),
        }
    }
}

/// Coalesces concurrent calls that share a key.
///
/// `V` and `E` are cloned once per joining caller.
pub struct SingleFlight<K, V, E> {
    calls: Mutex<FxHashMap<K, Arc<Call<V, E>>>>,
}

impl<K, V, E> SingleFlight<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone,
    E: Clone,
{
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(FxHashMap::default()),
        }
    }

    /// Runs `f` for `key` unless a call for `key` is already executing, in
    /// which case this blocks and returns that call's result.
    ///
    /// # Panics
    ///
    /// Resumes the panic of `f` on the leader. Joiners of a call whose
    /// closure panicked panic as well.
    pub fn run<F>(&self, key: K, f: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let call = {
            let mut calls = self.calls.lock();
            if let Some(existing) = calls.get(&key) {
                let existing = Arc::clone(existing);
                *existing.waiters.lock() += 1;
                drop(calls);
                return existing.wait();
            }
            let call = Arc::new(Call::new());
            calls.insert(key.clone(), Arc::clone(&call));
            call
        };

        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(result) => {
                call.publish(CallState::Done(result.clone()));
                self.calls.lock().remove(&key);
                result
            },
            Err(payload) => {
                call.publish(CallState::Panicked(panic_message(payload.as_ref())));
                self.calls.lock().remove(&key);
                panic::resume_unwind(payload)
            },
        }
    }

    /// Number of keys with a call currently executing.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }

    /// Number of callers blocked on the in-flight call for `key`.
    pub fn waiters(&self, key: &K) -> usize {
        self.calls
            .lock()
            .get(key)
            .map_or(0, |call| *call.waiters.lock())
    }
}

impl<K, V, E> Default for SingleFlight<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone,
    E: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, E> fmt::Debug for SingleFlight<K, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleFlight")
            .field("in_flight", &self.calls.lock().len())
            .finish()
    }
}
