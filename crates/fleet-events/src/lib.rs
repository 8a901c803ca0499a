//! Ordered, replayable publish/subscribe event bus with monotonic cursor
//! IDs. A single lock spans both `publish` and `subscribe` so that a
//! subscriber's history replay is atomic with concurrent publishes: no
//! gaps, no duplicates.

use chrono::{DateTime, Utc};
use fleet_step::Step;
use fleet_types::{Status, StepId};
use parking_lot::Mutex;

/// A queue entry as reported in a `QueueStatus` event: the step together
/// with the IDs of any dependency currently keeping it out of the
/// ready-queue.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub step: Step,
    pub blocked_by: Vec<StepId>,
}

#[derive(Debug, Clone)]
pub enum Event {
    /// Free-form diagnostic text, not tied to a particular step.
    Log { data: String },
    RegisterStep { step: Step },
    RegisterPlan { step: Step },
    StepUpdate { step_id: StepId, status: Status },
    StepLog { step_id: StepId, data: String },
    QueueStatus { entries: Vec<QueueEntry> },
    Pause,
    Unpause,
    StatePaused,
    StateUnpaused,
}

impl Event {
    /// Stable name, handy for log correlation and for any future wire
    /// encoding that wants a discriminant string.
    pub fn name(&self) -> &'static str {
        match self {
            Event::Log { .. } => "log",
            Event::RegisterStep { .. } => "register_step",
            Event::RegisterPlan { .. } => "register_plan",
            Event::StepUpdate { .. } => "step_update",
            Event::StepLog { .. } => "step_log",
            Event::QueueStatus { .. } => "queue_status",
            Event::Pause => "pause",
            Event::Unpause => "unpause",
            Event::StatePaused => "state_paused",
            Event::StateUnpaused => "state_unpaused",
        }
    }
}

/// An event plus the monotonic cursor ID and wall-clock time assigned to
/// it at publish time. The timestamp is purely observational (ordering and
/// replay are governed by `id`, never by clock comparisons) — it exists for
/// UIs that want a "when did this happen" display.
#[derive(Debug, Clone)]
pub struct EventRecord {
    pub id: u64,
    pub event: Event,
    pub at: DateTime<Utc>,
}

struct Inner {
    next_id: u64,
    events: Vec<EventRecord>,
    subscribers: Vec<crossbeam_channel::Sender<EventRecord>>,
}

/// Process-global ordered pub/sub with cursor-based replay. Subscriber
/// queues are unbounded (`crossbeam_channel::unbounded`): a slow
/// subscriber can fall behind without blocking `publish`, at the cost of
/// unbounded memory if it never drains.
pub struct EventBus {
    inner: Mutex<Inner>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner { next_id: 0, events: Vec::new(), subscribers: Vec::new() }),
        }
    }

    /// Append `event` to the history and fan it out to every live
    /// subscriber, assigning it the next monotonic cursor ID.
    pub fn publish(&self, event: Event) -> u64 {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        tracing::debug!(event = event.name(), id, "publishing event");
        let record = EventRecord { id, event, at: Utc::now() };
        inner.events.push(record.clone());
        inner.subscribers.retain(|tx| tx.send(record.clone()).is_ok());
        id
    }

    /// Register a new subscriber, pre-seeded with every event published so
    /// far, then receiving all subsequent ones. Atomic with respect to
    /// concurrent `publish` calls: this acquires the same lock.
    pub fn subscribe(&self) -> crossbeam_channel::Receiver<EventRecord> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut inner = self.inner.lock();
        for record in &inner.events {
            // The channel was just created with no other senders/receivers
            // racing it; a send failure here would mean the receiver we
            // just made was already dropped, which cannot happen.
            let _ = tx.send(record.clone());
        }
        inner.subscribers.push(tx);
        rx
    }

    /// Pull up to `batch_size` events strictly after `cursor` (or from the
    /// beginning, if `cursor` is `None`). Returns the batch and the cursor
    /// to resume from on the next call; the returned cursor is `None` when
    /// the batch is empty.
    pub fn get_events(&self, cursor: Option<u64>, batch_size: usize) -> (Vec<Event>, Option<u64>) {
        let inner = self.inner.lock();
        let mut batch = Vec::new();
        let mut next_cursor = None;
        for record in &inner.events {
            if let Some(after) = cursor {
                if record.id <= after {
                    continue;
                }
            }
            batch.push(record.event.clone());
            next_cursor = Some(record.id);
            if batch.len() == batch_size {
                break;
            }
        }
        (batch, next_cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_assigns_monotonically_increasing_ids() {
        let bus = EventBus::new();
        let a = bus.publish(Event::Pause);
        let b = bus.publish(Event::Unpause);
        assert!(b > a);
    }

    #[test]
    fn subscriber_receives_prior_history_then_new_events() {
        let bus = EventBus::new();
        bus.publish(Event::Log { data: "first".into() });
        let rx = bus.subscribe();
        bus.publish(Event::Log { data: "second".into() });

        let first = rx.recv().unwrap();
        let second = rx.recv().unwrap();
        assert!(matches!(first.event, Event::Log { ref data } if data == "first"));
        assert!(matches!(second.event, Event::Log { ref data } if data == "second"));
        assert!(second.id > first.id);
    }

    #[test]
    fn subscribe_and_publish_never_interleave_a_gap() {
        // A subscriber created after k publishes, then observing m more,
        // must see exactly k+m events with no gap or duplicate.
        let bus = EventBus::new();
        for i in 0..5 {
            bus.publish(Event::Log { data: i.to_string() });
        }
        let rx = bus.subscribe();
        for i in 5..8 {
            bus.publish(Event::Log { data: i.to_string() });
        }
        let received: Vec<_> = (0..8).map(|_| rx.try_recv().unwrap()).collect();
        assert!(rx.try_recv().is_err());
        for (i, record) in received.iter().enumerate() {
            assert!(matches!(&record.event, Event::Log { data } if data == &i.to_string()));
        }
    }

    #[test]
    fn get_events_paginates_from_a_cursor() {
        let bus = EventBus::new();
        let ids: Vec<u64> = (0..5).map(|i| bus.publish(Event::Log { data: i.to_string() })).collect();

        let (first_batch, cursor) = bus.get_events(None, 2);
        assert_eq!(first_batch.len(), 2);
        assert_eq!(cursor, Some(ids[1]));

        let (second_batch, cursor) = bus.get_events(cursor, 2);
        assert_eq!(second_batch.len(), 2);
        assert_eq!(cursor, Some(ids[3]));

        let (third_batch, cursor) = bus.get_events(cursor, 2);
        assert_eq!(third_batch.len(), 1);
        assert_eq!(cursor, Some(ids[4]));
    }

    #[test]
    fn get_events_returns_no_cursor_when_the_batch_is_empty() {
        let bus = EventBus::new();
        let last = bus.publish(Event::Pause);
        let (batch, cursor) = bus.get_events(Some(last), 10);
        assert!(batch.is_empty());
        assert_eq!(cursor, None);
    }

    #[test]
    fn get_events_from_beginning_when_cursor_is_none() {
        let bus = EventBus::new();
        bus.publish(Event::Pause);
        bus.publish(Event::Unpause);
        let (batch, _) = bus.get_events(None, 100);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn dead_subscribers_are_pruned_on_publish() {
        let bus = EventBus::new();
        {
            let _rx = bus.subscribe();
        }
        bus.publish(Event::Pause);
        assert_eq!(bus.inner.lock().subscribers.len(), 0);
    }
}
