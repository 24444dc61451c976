//! # Event Bus
//!
//! Fan-out of domain events to every registered subscriber.
//!
//! One subscriber per live connection. Each subscriber owns a bounded
//! queue; `publish` snapshots the subscriber set, then enqueues without
//! waiting. A full queue drops the event for that subscriber only, and a
//! closed queue gets its subscriber pruned.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::event::Event;
use crate::observability::{log_event_with_fields, LogEvent};

/// Receiving half handed to a connection
pub type EventReceiver = mpsc::Receiver<Arc<Event>>;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

#[derive(Debug)]
struct Subscriber {
    connection: String,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Outcome of one publish
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishReport {
    /// Subscribers the event was enqueued for
    pub delivered: usize,
    /// Subscribers whose queue was full
    pub dropped: usize,
    /// Subscribers that had already gone away
    pub closed: usize,
}

/// Process-wide publish/subscribe broadcaster
#[derive(Debug)]
pub struct EventBus {
    subscribers: RwLock<HashMap<SubscriberId, Subscriber>>,
    next_id: AtomicU64,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventBus {
    /// Create a bus whose subscriber queues hold `capacity` events
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            capacity: capacity.max(1),
        }
    }

    /// Register a connection
    pub fn subscribe(&self, connection: impl Into<String>) -> (SubscriberId, EventReceiver) {
        let (tx, rx) = mpsc::channel(self.capacity);
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let subscriber = Subscriber {
            connection: connection.into(),
            sender: tx,
        };
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, subscriber);

        (id, rx)
    }

    /// Deregister a connection. Unknown or stale ids are ignored.
    ///
    /// Returns whether a subscriber was removed.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    /// Fire-and-forget delivery to every current subscriber.
    pub fn publish(&self, event: Event) -> PublishReport {
        let event = Arc::new(event);

        let snapshot: Vec<(SubscriberId, String, mpsc::Sender<Arc<Event>>)> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, sub)| (*id, sub.connection.clone(), sub.sender.clone()))
            .collect();

        let mut report = PublishReport::default();
        let mut gone = Vec::new();

        for (id, connection, sender) in snapshot {
            match sender.try_send(Arc::clone(&event)) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    report.dropped += 1;
                    log_event_with_fields(
                        LogEvent::EventDropped,
                        &[
                            ("connection", &connection),
                            ("module", event.module()),
                            ("action", event.action()),
                        ],
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    report.closed += 1;
                    gone.push(id);
                }
            }
        }

        if !gone.is_empty() {
            let mut subscribers = self
                .subscribers
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            for id in gone {
                subscribers.remove(&id);
            }
        }

        log_event_with_fields(
            LogEvent::EventPublished,
            &[
                ("module", event.module()),
                ("action", event.action()),
                ("delivered", &report.delivered.to_string()),
                ("dropped", &report.dropped.to_string()),
            ],
        );

        report
    }

    /// Publish several events in order
    pub fn publish_all<'a>(&self, events: impl IntoIterator<Item = &'a Event>) -> PublishReport {
        events
            .into_iter()
            .fold(PublishReport::default(), |mut total, event| {
                let report = self.publish(event.clone());
                total.delivered += report.delivered;
                total.dropped += report.dropped;
                total.closed += report.closed;
                total
            })
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus = EventBus::default();
        let report = bus.publish(Event::new("node", "list"));
        assert_eq!(report, PublishReport::default());
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_every_subscriber_receives_event() {
        let bus = EventBus::default();
        let (_a, mut rx_a) = bus.subscribe("conn-a");
        let (_b, mut rx_b) = bus.subscribe("conn-b");

        let report = bus.publish(Event::new("replay", "list"));
        assert_eq!(report.delivered, 2);

        assert_eq!(rx_a.recv().await.unwrap().module(), "replay");
        assert_eq!(rx_b.recv().await.unwrap().action(), "list");
    }

    #[tokio::test]
    async fn test_unsubscribed_connection_stops_receiving() {
        let bus = EventBus::default();
        let (a, mut rx_a) = bus.subscribe("conn-a");
        let (_b, _rx_b) = bus.subscribe("conn-b");

        assert!(bus.unsubscribe(a));
        let report = bus.publish(Event::new("node", "list"));
        assert_eq!(report.delivered, 1);

        // Sender side was dropped with the subscriber
        assert!(rx_a.recv().await.is_none());
    }

    #[test]
    fn test_stale_unsubscribe_is_noop() {
        let bus = EventBus::default();
        let (id, _rx) = bus.subscribe("conn");
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert!(!bus.unsubscribe(SubscriberId(9999)));
    }

    #[test]
    fn test_full_queue_drops_for_that_subscriber_only() {
        let bus = EventBus::new(1);
        let (_slow, _rx_slow) = bus.subscribe("slow");
        let (_fast, mut rx_fast) = bus.subscribe("fast");

        bus.publish(Event::new("node", "list"));
        assert!(rx_fast.try_recv().is_ok());

        let report = bus.publish(Event::new("node", "list"));
        assert_eq!(report.delivered, 1);
        assert_eq!(report.dropped, 1);
    }

    #[test]
    fn test_closed_receiver_is_pruned() {
        let bus = EventBus::default();
        let (_id, rx) = bus.subscribe("conn");
        drop(rx);

        let report = bus.publish(Event::new("node", "list"));
        assert_eq!(report.closed, 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_publish_all_sums_reports() {
        let bus = EventBus::default();
        let (_id, _rx) = bus.subscribe("conn");
        let events = [Event::new("replay", "list"), Event::new("notice", "list")];
        let report = bus.publish_all(events.iter());
        assert_eq!(report.delivered, 2);
    }
}
