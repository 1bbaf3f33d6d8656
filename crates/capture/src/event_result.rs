//! Single-slot rendezvous between an outbound event and the host's answer.
//!
//! [`EventWithResult::emit`] publishes the event and blocks the calling
//! (native pipeline) thread until the host answers through
//! [`EventWithResult::unlock`], the timeout expires, or the slot is
//! [`reset`](EventWithResult::reset). Each emission resolves exactly once.
//! Once [`close`](EventWithResult::close)d, emissions resolve to the default
//! without reaching the host.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, Sender};
use idbridge_events::Emitter;

struct Slot<T> {
    /// Sender of the emission currently waiting, if any.
    waiting: Option<Sender<T>>,
    closed: bool,
}

pub struct EventWithResult<T> {
    name: &'static str,
    default: T,
    slot: Mutex<Slot<T>>,
    /// Held for the whole emission; emissions of one event are sequential.
    emission: Mutex<()>,
}

impl<T: Clone + Send> EventWithResult<T> {
    /// `default` is what an emission resolves to on timeout or reset.
    pub fn new(name: &'static str, default: T) -> Self {
        Self {
            name,
            default,
            slot: Mutex::new(Slot {
                waiting: None,
                closed: false,
            }),
            emission: Mutex::new(()),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Emit `payload` and wait for the host's answer.
    pub fn emit(&self, emitter: &Emitter, payload: serde_json::Value, timeout: Duration) -> T {
        let _turn = self
            .emission
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let (tx, rx) = crossbeam_channel::bounded(1);
        {
            let mut slot = self.slot();
            if slot.closed {
                tracing::debug!(event = self.name, "Emission after close, using default");
                return self.default.clone();
            }
            slot.waiting = Some(tx);
        }

        emitter.emit(self.name, payload);

        match rx.recv_timeout(timeout) {
            Ok(value) => {
                tracing::debug!(event = self.name, "Emission resolved by host");
                value
            }
            Err(RecvTimeoutError::Timeout) => {
                self.slot().waiting.take();
                // An unlock may have won the race against the timeout.
                match rx.try_recv() {
                    Ok(value) => value,
                    Err(_) => {
                        tracing::warn!(
                            event = self.name,
                            ?timeout,
                            "Host did not answer in time, using default"
                        );
                        self.default.clone()
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => self.default.clone(),
        }
    }

    /// Resolve the waiting emission with `value`.
    ///
    /// Returns false when nothing was waiting; the value is then dropped.
    pub fn unlock(&self, value: T) -> bool {
        match self.slot().waiting.take() {
            Some(tx) => tx.send(value).is_ok(),
            None => false,
        }
    }

    /// Resolve the waiting emission, if any, with the default.
    pub fn reset(&self) -> bool {
        self.unlock(self.default.clone())
    }

    /// Resolve the waiting emission with the default and refuse later ones.
    ///
    /// A callback that checked its gates before the close but arms the slot
    /// after it still resolves immediately.
    pub fn close(&self) {
        let waiting = {
            let mut slot = self.slot();
            slot.closed = true;
            slot.waiting.take()
        };
        if let Some(tx) = waiting {
            let _ = tx.send(self.default.clone());
        }
    }

    pub fn is_pending(&self) -> bool {
        self.slot().waiting.is_some()
    }
}
