//! # Action Correlator
//!
//! Pairs a fired action with the event that reports its completion.
//!
//! The foreground arms a [`Handle`] (or fires an action, which arms one and
//! publishes), then awaits it. The dispatch loop calls [`Correlator::signal`]
//! when a matching event is decoded. Each handle keeps a pending-signal count,
//! so a completion that lands before `wait` is reached is not lost, and a
//! `tokio::sync::Notify` to wake the waiter.
//!
//! Handles are single-use: `wait` consumes the handle and dropping it disarms
//! it, so a late completion for an abandoned action finds nothing to satisfy.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::domain::action::Action;
use crate::domain::error::{ActionError, BusError};
use crate::domain::traits::Bus;
use crate::domain::types::Outcome;

/// What a handle waits for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Cue {
    /// A robot event with this name (`TextDone`, `GestureDone`, ...).
    Robot(String),
    /// Any recognized intent.
    Intent,
}

impl Cue {
    pub fn robot(name: impl Into<String>) -> Self {
        Cue::Robot(name.into())
    }
}

struct Slot {
    id: u64,
    cue: Cue,
    pending: AtomicUsize,
    notify: Notify,
}

impl Slot {
    /// Consumes one pending signal, if there is one.
    fn take(&self) -> bool {
        self.pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }

    fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire) > 0
    }
}

#[derive(Default)]
struct Registry {
    armed: Mutex<Vec<Arc<Slot>>>,
    next_id: AtomicU64,
}

impl Registry {
    fn lock(&self) -> MutexGuard<'_, Vec<Arc<Slot>>> {
        self.armed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn disarm(&self, id: u64) {
        self.lock().retain(|slot| slot.id != id);
    }
}

/// Shared between the foreground (arming, firing) and the dispatch loop (signalling).
#[derive(Clone)]
pub struct Correlator {
    bus: Arc<dyn Bus>,
    registry: Arc<Registry>,
    cancel: CancellationToken,
    fault: Arc<OnceLock<BusError>>,
}

impl Correlator {
    pub fn new(bus: Arc<dyn Bus>, cancel: CancellationToken) -> Self {
        Self {
            bus,
            registry: Arc::new(Registry::default()),
            cancel,
            fault: Arc::new(OnceLock::new()),
        }
    }

    /// Registers a fresh handle for `cue` with no pending signals.
    pub fn arm(&self, cue: Cue) -> Handle {
        let slot = Arc::new(Slot {
            id: self.registry.next_id.fetch_add(1, Ordering::Relaxed),
            cue,
            pending: AtomicUsize::new(0),
            notify: Notify::new(),
        });
        self.registry.lock().push(slot.clone());
        Handle {
            slot,
            registry: self.registry.clone(),
            cancel: self.cancel.clone(),
        }
    }

    /// Arms a handle for the action's completion event, then publishes the action.
    ///
    /// Arming first means the completion cannot slip past, however fast the
    /// backend answers.
    pub async fn fire(&self, action: &Action) -> Result<Handle, ActionError> {
        let done = action
            .completion()
            .ok_or_else(|| ActionError::NoCompletion(action.topic.clone()))?;
        let handle = self.arm(Cue::robot(done));
        self.bus.publish(&action.topic, &action.payload).await?;
        Ok(handle)
    }

    /// Delivers a signal to the oldest armed handle waiting on `cue`.
    ///
    /// Handles that already hold a signal are skipped while a fresh one exists;
    /// otherwise the oldest coalesces it. Returns `false` when nothing is armed
    /// for `cue` and the signal is dropped.
    pub fn signal(&self, cue: &Cue) -> bool {
        let target = {
            let armed = self.registry.lock();
            let mut matching = armed.iter().filter(|slot| &slot.cue == cue);
            let first = matching.next().cloned();
            let fresh = first
                .as_ref()
                .filter(|slot| !slot.is_pending())
                .cloned()
                .or_else(|| matching.find(|slot| !slot.is_pending()).cloned());
            fresh.or(first)
        };

        match target {
            Some(slot) => {
                slot.pending.fetch_add(1, Ordering::AcqRel);
                slot.notify.notify_one();
                true
            }
            None => false,
        }
    }

    /// Number of handles currently armed.
    pub fn armed(&self) -> usize {
        self.registry.lock().len()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Records the bus failure that ended the session, then cancels.
    ///
    /// Only the first failure is kept. Waiters woken by the cancellation can
    /// tell it apart from a requested shutdown through [`Correlator::fault`].
    pub fn fail(&self, err: BusError) {
        let _ = self.fault.set(err);
        self.cancel.cancel();
    }

    /// The bus failure behind a cancellation, if there was one.
    pub fn fault(&self) -> Option<BusError> {
        self.fault.get().cloned()
    }
}

/// A single-use rendezvous with one completion.
pub struct Handle {
    slot: Arc<Slot>,
    registry: Arc<Registry>,
    cancel: CancellationToken,
}

impl Handle {
    pub fn cue(&self) -> &Cue {
        &self.slot.cue
    }

    /// Signals received and not yet consumed.
    pub fn pending(&self) -> usize {
        self.slot.pending.load(Ordering::Acquire)
    }

    pub fn is_signaled(&self) -> bool {
        self.slot.is_pending()
    }

    /// Suspends the caller until signaled, timed out, or cancelled.
    ///
    /// A signal that is already pending wins over both an elapsed deadline and
    /// cancellation. `None` waits without a deadline; shutdown still ends it.
    pub async fn wait(self, timeout: Option<Duration>) -> Outcome {
        // A deadline past the end of the clock is no deadline.
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        let expiry = async move {
            match deadline {
                Some(at) => sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(expiry);

        loop {
            if self.slot.take() {
                return Outcome::Signaled;
            }
            if self.cancel.is_cancelled() {
                return Outcome::Cancelled;
            }
            tokio::select! {
                _ = self.slot.notify.notified() => {}
                _ = self.cancel.cancelled() => {}
                _ = &mut expiry => {
                    return if self.slot.take() {
                        Outcome::Signaled
                    } else {
                        Outcome::TimedOut
                    };
                }
            }
        }
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        self.registry.disarm(self.slot.id);
    }
}
