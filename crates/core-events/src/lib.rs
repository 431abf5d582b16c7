//! Ordered-subscriber notification channels with asynchronous dispatch.
//!
//! `fire` never runs subscriber code on the calling thread: the dispatch is
//! queued onto a single shared worker. Callers that need to observe a
//! notification must wait for it (see [`wait_for_dispatch`]).

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{trace, warn};

// -------------------------------------------------------------------------------------------------
// Telemetry
// -------------------------------------------------------------------------------------------------
// Relaxed atomic counters, inspected by tests or logged by the embedding application.
// -------------------------------------------------------------------------------------------------
pub static DISPATCHES_TOTAL: AtomicU64 = AtomicU64::new(0); // dispatches started
pub static DISPATCH_ABORTS: AtomicU64 = AtomicU64::new(0); // dispatches cut short by a failing subscriber
pub static SUBSCRIBER_PANICS: AtomicU64 = AtomicU64::new(0);

/// Result type returned by subscribers.
pub type EventResult<T> = anyhow::Result<T>;

type Handler<T> = Arc<dyn Fn(&T) -> EventResult<()> + Send + Sync>;
type Subscribers<T> = Arc<Vec<(SubscriptionId, Handler<T>)>>;
type Job = Box<dyn FnOnce() + Send>;

/// Handle returned by [`EventChannel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// How a single dispatch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Every subscriber ran and returned `Ok`.
    Completed,
    /// The given subscriber failed; later subscribers were skipped.
    Aborted(SubscriptionId),
}

enum Message {
    Run(Job),
    Barrier(Sender<()>),
}

struct Dispatcher {
    // `None` when the worker thread could not be started; jobs then run inline.
    tx: Option<Sender<Message>>,
}

static DISPATCHER: Lazy<Dispatcher> = Lazy::new(Dispatcher::start);

impl Dispatcher {
    fn start() -> Self {
        let (tx, rx) = unbounded();
        match thread::Builder::new()
            .name("event-dispatch".into())
            .spawn(move || worker(rx))
        {
            Ok(_) => Self { tx: Some(tx) },
            Err(e) => {
                warn!(target: "events.dispatch", error = %e, "dispatch_thread_spawn_failed");
                Self { tx: None }
            }
        }
    }

    fn submit(&self, job: Job) {
        match &self.tx {
            Some(tx) => {
                if let Err(e) = tx.send(Message::Run(job)) {
                    if let Message::Run(job) = e.into_inner() {
                        job();
                    }
                }
            }
            None => job(),
        }
    }
}

fn worker(rx: Receiver<Message>) {
    for msg in rx {
        match msg {
            Message::Run(job) => job(),
            Message::Barrier(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

/// Block until every dispatch queued before this call has finished, or
/// `timeout` elapses. Returns false on timeout.
pub fn wait_for_dispatch(timeout: Duration) -> bool {
    let Some(tx) = &DISPATCHER.tx else {
        return true;
    };
    let (ack_tx, ack_rx) = bounded(1);
    if tx.send(Message::Barrier(ack_tx)).is_err() {
        return false;
    }
    ack_rx.recv_timeout(timeout).is_ok()
}

fn dispatch<T>(channel: &'static str, subscribers: &[(SubscriptionId, Handler<T>)], payload: &T) -> DispatchOutcome {
    DISPATCHES_TOTAL.fetch_add(1, Ordering::Relaxed);
    for (id, handler) in subscribers {
        let failed = match catch_unwind(AssertUnwindSafe(|| handler(payload))) {
            Ok(Ok(())) => false,
            Ok(Err(e)) => {
                warn!(target: "events.dispatch", channel, subscriber = id.0, error = %e, "subscriber_failed");
                true
            }
            Err(_) => {
                SUBSCRIBER_PANICS.fetch_add(1, Ordering::Relaxed);
                warn!(target: "events.dispatch", channel, subscriber = id.0, "subscriber_panicked");
                true
            }
        };
        if failed {
            DISPATCH_ABORTS.fetch_add(1, Ordering::Relaxed);
            return DispatchOutcome::Aborted(*id);
        }
    }
    DispatchOutcome::Completed
}

/// A named event with an ordered list of subscribers.
pub struct EventChannel<T> {
    name: &'static str,
    subscribers: RwLock<Subscribers<T>>,
    next_id: AtomicU64,
}

impl<T: Send + 'static> EventChannel<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            subscribers: RwLock::new(Arc::new(Vec::new())),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Append `handler`; it runs after every earlier subscriber.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&T) -> EventResult<()> + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut guard = self.subscribers.write();
        let mut next = Vec::clone(&guard);
        next.push((id, Arc::new(handler)));
        *guard = Arc::new(next);
        id
    }

    /// Remove a subscriber. Returns false when it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut guard = self.subscribers.write();
        if !guard.iter().any(|(sid, _)| *sid == id) {
            return false;
        }
        let next: Vec<_> = guard.iter().filter(|(sid, _)| *sid != id).cloned().collect();
        *guard = Arc::new(next);
        true
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Queue a dispatch of `payload` to the subscribers registered right now.
    /// Does nothing when there are none.
    pub fn fire(&self, payload: T) {
        let subscribers = self.subscribers.read().clone();
        if subscribers.is_empty() {
            return;
        }
        let channel = self.name;
        trace!(target: "events.dispatch", channel, subscribers = subscribers.len(), "fire");
        DISPATCHER.submit(Box::new(move || {
            dispatch(channel, &subscribers, &payload);
        }));
    }

    /// Run a dispatch on the calling thread.
    pub fn fire_now(&self, payload: &T) -> DispatchOutcome {
        let subscribers = self.subscribers.read().clone();
        dispatch(self.name, &subscribers, payload)
    }
}

impl<T> fmt::Debug for EventChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("name", &self.name)
            .field("subscribers", &self.subscribers.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    #[test]
    fn fire_now_runs_in_registration_order() {
        let ch = EventChannel::<u32>::new("test");
        let seen = Arc::new(Mutex::new(Vec::new()));
        for tag in ["a", "b", "c"] {
            let seen = seen.clone();
            ch.subscribe(move |v| {
                seen.lock().push(format!("{tag}{v}"));
                Ok(())
            });
        }
        assert_eq!(ch.fire_now(&1), DispatchOutcome::Completed);
        assert_eq!(*seen.lock(), vec!["a1", "b1", "c1"]);
    }

    #[test]
    fn failing_subscriber_aborts_rest() {
        let ch = EventChannel::<()>::new("test");
        let ran = Arc::new(Mutex::new(0));
        let failing = ch.subscribe(|_| Err(anyhow::anyhow!("nope")));
        let r = ran.clone();
        ch.subscribe(move |_| {
            *r.lock() += 1;
            Ok(())
        });
        assert_eq!(ch.fire_now(&()), DispatchOutcome::Aborted(failing));
        assert_eq!(*ran.lock(), 0);
        assert!(ch.unsubscribe(failing));
        assert_eq!(ch.fire_now(&()), DispatchOutcome::Completed);
        assert_eq!(*ran.lock(), 1);
    }

    #[test]
    fn unsubscribe_unknown_is_false() {
        let ch = EventChannel::<()>::new("test");
        let id = ch.subscribe(|_| Ok(()));
        assert!(ch.unsubscribe(id));
        assert!(!ch.unsubscribe(id));
        assert_eq!(ch.subscriber_count(), 0);
    }
}
