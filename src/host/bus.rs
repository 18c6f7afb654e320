// Event bus adapter - topic-based publish/subscribe with the host environment
// Fan-out is one bounded SPSC ring per subscription; a full ring drops the event

use ringbuf::{HeapRb, traits::Split};
use std::sync::{Arc, Mutex};

/// Ring capacity per subscription.
/// The metronome ticks a few times per second; 256 events of headroom covers
/// a UI that stalls for well over a minute before anything is dropped.
pub const BUS_RING_CAPACITY: usize = 256;

/// Topics the host environment publishes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// The user cleared the running code; all derived state should reset.
    Clear,
    /// One beat of the host metronome has elapsed.
    MetronomeTick,
}

/// An event delivered over the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    Clear,
    /// Beat index, already taken modulo beats-per-measure upstream.
    MetronomeTick(u32),
}

impl BusEvent {
    pub fn topic(&self) -> Topic {
        match self {
            BusEvent::Clear => Topic::Clear,
            BusEvent::MetronomeTick(_) => Topic::MetronomeTick,
        }
    }
}

/// Handle identifying one subscription, needed to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("no subscription {id:?} on topic {topic:?}")]
    UnknownSubscription { topic: Topic, id: SubscriptionId },

    #[error("event bus state poisoned")]
    Poisoned,
}

pub type BusEventProducer = ringbuf::HeapProd<BusEvent>;
pub type BusEventConsumer = ringbuf::HeapCons<BusEvent>;

struct Subscription {
    id: SubscriptionId,
    topic: Topic,
    tx: BusEventProducer,
}

#[derive(Default)]
struct BusState {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

/// Cheaply cloneable bus handle. The host publishes, widgets subscribe.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Mutex<BusState>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(BusState::default())),
        }
    }

    /// Subscribe to a topic. Events arrive on the returned consumer.
    pub fn subscribe(&self, topic: Topic) -> (SubscriptionId, BusEventConsumer) {
        let (tx, rx) = HeapRb::<BusEvent>::new(BUS_RING_CAPACITY).split();
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let id = SubscriptionId(state.next_id);
        state.next_id += 1;
        state.subscriptions.push(Subscription { id, topic, tx });
        (id, rx)
    }

    /// Drop a subscription. Unknown ids are an error so that callers notice
    /// double-unsubscribes.
    pub fn unsubscribe(&self, topic: Topic, id: SubscriptionId) -> Result<(), BusError> {
        let mut state = self.inner.lock().map_err(|_| BusError::Poisoned)?;
        let before = state.subscriptions.len();
        state
            .subscriptions
            .retain(|sub| !(sub.topic == topic && sub.id == id));
        if state.subscriptions.len() == before {
            return Err(BusError::UnknownSubscription { topic, id });
        }
        Ok(())
    }

    /// Deliver an event to every subscription on its topic.
    pub fn publish(&self, event: BusEvent) {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let topic = event.topic();
        for sub in state.subscriptions.iter_mut() {
            if sub.topic == topic {
                // A full ring means the subscriber stopped draining; drop the
                // event rather than block the publisher.
                let _ = ringbuf::traits::Producer::try_push(&mut sub.tx, event);
            }
        }
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        let state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state
            .subscriptions
            .iter()
            .filter(|sub| sub.topic == topic)
            .count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
