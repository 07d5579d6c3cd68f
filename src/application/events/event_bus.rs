//! In-process notification bus for rate changes
//!
//! Listeners are registered per event kind and invoked synchronously, in
//! registration order, by `publish`. Each dispatch runs against a snapshot
//! of the listener list taken under the lock; the lock is released before any
//! listener runs, so a listener may subscribe or unsubscribe from inside its
//! callback.
//!
//! Streaming clients use `subscribe_channel`, which forwards every kind into a
//! bounded queue. A full queue drops the event for that subscriber only.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, info, warn};

use crate::domain::events::{EventKind, RateEvent};

/// Default per-subscriber queue length
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 64;

pub type ListenerId = u64;

type Listener = Arc<dyn Fn(&RateEvent) + Send + Sync>;

pub struct EventBus {
    listeners: RwLock<HashMap<EventKind, Vec<(ListenerId, Listener)>>>,
    next_id: AtomicU64,
    subscriber_count: Arc<AtomicUsize>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            subscriber_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Invoke every listener registered for the event's kind at the moment of
    /// the call. A panicking listener is logged and skipped.
    pub fn publish(&self, event: RateEvent) {
        let kind = event.kind();
        let snapshot: Vec<(ListenerId, Listener)> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .cloned()
            .unwrap_or_default();

        metrics::counter!("rate_events_published_total", "kind" => kind.as_str()).increment(1);
        debug!(
            kind = kind.as_str(),
            rate_id = event.rate_id(),
            listeners = snapshot.len(),
            "Event published"
        );

        for (id, listener) in snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener(&event))).is_err() {
                error!(
                    listener = id,
                    kind = kind.as_str(),
                    rate_id = event.rate_id(),
                    "Event listener panicked"
                );
            }
        }
    }

    pub fn subscribe<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&RateEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.register(kind, id, Arc::new(listener));
        id
    }

    /// Returns `false` if no such listener was registered.
    pub fn unsubscribe(&self, kind: EventKind, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let Some(list) = listeners.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(lid, _)| *lid != id);
        before != list.len()
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Register one listener for every event kind that forwards into a
    /// bounded queue of `capacity` events. Dropping the returned handle
    /// unsubscribes it.
    pub fn subscribe_channel(self: &Arc<Self>, capacity: usize) -> EventSubscriber {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let listener: Listener = Arc::new(move |event: &RateEvent| match sender.try_send(*event) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                warn!(
                    subscriber = id,
                    kind = dropped.kind().as_str(),
                    rate_id = dropped.rate_id(),
                    "Subscriber queue full, dropping event"
                );
                metrics::counter!("rate_events_dropped_total").increment(1);
            }
            Err(TrySendError::Closed(_)) => {
                debug!(subscriber = id, "Subscriber already closed");
            }
        });

        for kind in EventKind::ALL {
            self.register(kind, id, listener.clone());
        }

        let total = self.subscriber_count.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::gauge!("event_stream_subscribers").set(total as f64);
        info!(subscriber = id, total, "Event subscriber connected");

        EventSubscriber {
            id,
            receiver,
            bus: Arc::downgrade(self),
            subscriber_count: self.subscriber_count.clone(),
        }
    }

    /// Number of live `EventSubscriber` handles
    pub fn subscriber_count(&self) -> usize {
        self.subscriber_count.load(Ordering::SeqCst)
    }

    fn register(&self, kind: EventKind, id: ListenerId, listener: Listener) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(kind)
            .or_default()
            .push((id, listener));
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end of a channel subscription
pub struct EventSubscriber {
    id: ListenerId,
    receiver: mpsc::Receiver<RateEvent>,
    bus: Weak<EventBus>,
    subscriber_count: Arc<AtomicUsize>,
}

impl EventSubscriber {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Next queued event; `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<RateEvent> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<RateEvent> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for EventSubscriber {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            for kind in EventKind::ALL {
                bus.unsubscribe(kind, self.id);
            }
        }
        self.receiver.close();
        let remaining = self.subscriber_count.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        metrics::gauge!("event_stream_subscribers").set(remaining as f64);
        info!(subscriber = self.id, remaining, "Event subscriber disconnected");
    }
}

pub type SharedEventBus = Arc<EventBus>;

pub fn create_event_bus() -> SharedEventBus {
    Arc::new(EventBus::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&RateEvent) + Send + Sync>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let make = move |name: &str| {
            let sink = sink.clone();
            let name = name.to_string();
            Box::new(move |e: &RateEvent| {
                sink.lock().unwrap().push(format!("{name}:{}", e.rate_id()));
            }) as Box<dyn Fn(&RateEvent) + Send + Sync>
        };
        (log, make)
    }

    #[test]
    fn listeners_run_once_in_registration_order() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        bus.subscribe(EventKind::Created, make("a"));
        bus.subscribe(EventKind::Created, make("b"));

        bus.publish(RateEvent::created(1));
        bus.publish(RateEvent::created(2));

        assert_eq!(*log.lock().unwrap(), vec!["a:1", "b:1", "a:2", "b:2"]);
    }

    #[test]
    fn only_matching_kind_is_dispatched() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        bus.subscribe(EventKind::Deleted, make("d"));

        bus.publish(RateEvent::created(1));
        bus.publish(RateEvent::updated(2));
        bus.publish(RateEvent::deleted(3));

        assert_eq!(*log.lock().unwrap(), vec!["d:3"]);
    }

    #[test]
    fn unsubscribed_listener_receives_nothing() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        let id = bus.subscribe(EventKind::Updated, make("u"));

        bus.publish(RateEvent::updated(1));
        assert!(bus.unsubscribe(EventKind::Updated, id));
        bus.publish(RateEvent::updated(2));

        assert_eq!(*log.lock().unwrap(), vec!["u:1"]);
        assert!(!bus.unsubscribe(EventKind::Updated, id));
        assert!(!bus.unsubscribe(EventKind::Created, 999));
    }

    #[test]
    fn panicking_listener_does_not_block_others() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        bus.subscribe(EventKind::Created, |_| panic!("listener bug"));
        bus.subscribe(EventKind::Created, make("ok"));

        bus.publish(RateEvent::created(7));

        assert_eq!(*log.lock().unwrap(), vec!["ok:7"]);
    }

    #[test]
    fn listener_may_subscribe_during_dispatch() {
        let bus = Arc::new(EventBus::new());
        let (log, make) = recorder();
        let late = Arc::new(Mutex::new(Some(make("late"))));

        let weak = Arc::downgrade(&bus);
        bus.subscribe(EventKind::Created, move |_| {
            if let (Some(bus), Some(listener)) = (weak.upgrade(), late.lock().unwrap().take()) {
                bus.subscribe(EventKind::Created, listener);
            }
        });

        bus.publish(RateEvent::created(1));
        assert!(log.lock().unwrap().is_empty(), "snapshot excludes listeners added mid-dispatch");

        bus.publish(RateEvent::created(2));
        assert_eq!(*log.lock().unwrap(), vec!["late:2"]);
    }

    #[tokio::test]
    async fn channel_subscriber_receives_every_kind_in_order() {
        let bus = create_event_bus();
        let mut subscriber = bus.subscribe_channel(8);

        bus.publish(RateEvent::created(42));
        bus.publish(RateEvent::updated(42));
        bus.publish(RateEvent::deleted(42));

        let mut received = Vec::new();
        for _ in 0..3 {
            let event = tokio::time::timeout(std::time::Duration::from_millis(100), subscriber.recv())
                .await
                .expect("Timeout")
                .expect("No event");
            received.push(event);
        }
        assert_eq!(
            received,
            vec![RateEvent::created(42), RateEvent::updated(42), RateEvent::deleted(42)]
        );
    }

    #[test]
    fn dropping_subscriber_unsubscribes_all_kinds() {
        let bus = create_event_bus();
        assert_eq!(bus.subscriber_count(), 0);

        let first = bus.subscribe_channel(4);
        let _second = bus.subscribe_channel(4);
        assert_eq!(bus.subscriber_count(), 2);
        for kind in EventKind::ALL {
            assert_eq!(bus.listener_count(kind), 2);
        }

        drop(first);
        assert_eq!(bus.subscriber_count(), 1);
        for kind in EventKind::ALL {
            assert_eq!(bus.listener_count(kind), 1);
        }
    }

    #[test]
    fn full_queue_drops_newest_events_for_that_subscriber_only() {
        let bus = create_event_bus();
        let mut slow = bus.subscribe_channel(2);
        let mut fast = bus.subscribe_channel(8);

        for id in 1..=4 {
            bus.publish(RateEvent::updated(id));
        }

        assert_eq!(slow.try_recv(), Some(RateEvent::updated(1)));
        assert_eq!(slow.try_recv(), Some(RateEvent::updated(2)));
        assert_eq!(slow.try_recv(), None);

        let fast_ids: Vec<_> = std::iter::from_fn(|| fast.try_recv()).map(|e| e.rate_id()).collect();
        assert_eq!(fast_ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn subscriber_outliving_bus_drops_cleanly() {
        let bus = create_event_bus();
        let subscriber = bus.subscribe_channel(1);
        drop(bus);
        drop(subscriber);
    }
}
