//! The broker: one registry mapping `(channel, topic)` to typed slots.
//!
//! Slot creation is mutually exclusive under a single registry lock; after
//! the (cheap) bind phase every publish and read synchronizes only on the
//! slot itself. Type erasure stops at this boundary: the registry stores
//! `Arc<dyn Any>`, endpoints get back fully typed cells.

use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::{BrokerError, BrokerResult};
use crate::slot::{LatestCell, QueueCell};

/// Delivery shape of a slot, fixed at first registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotMode {
    /// Single overwritten payload with a registered default.
    Latest,
    /// Bounded FIFO with drop-oldest overflow.
    Queued,
}

struct SlotEntry {
    payload_type: TypeId,
    payload_name: &'static str,
    mode: SlotMode,
    cell: Arc<dyn Any + Send + Sync>,
}

impl SlotEntry {
    fn describe(&self) -> String {
        format!("{:?}<{}>", self.mode, self.payload_name)
    }
}

/// Process-wide topic registry.
///
/// Constructed once in `main` and handed to every module at startup; the
/// broker is an explicit service, not an ambient singleton.
pub struct Broker {
    slots: Mutex<HashMap<(String, String), SlotEntry>>,
}

impl Broker {
    /// Create an empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            slots: Mutex::new(HashMap::new()),
        })
    }

    /// Number of registered slots (monitoring only).
    pub fn slot_count(&self) -> usize {
        self.slots.lock().len()
    }

    fn mismatch<T: 'static>(
        channel: &str,
        topic: &str,
        requested: SlotMode,
        entry: &SlotEntry,
    ) -> BrokerError {
        BrokerError::TypeMismatch {
            channel: channel.to_string(),
            topic: topic.to_string(),
            bound: entry.describe(),
            requested: format!("{:?}<{}>", requested, std::any::type_name::<T>()),
        }
    }

    /// Create or attach the latest-value slot at `(channel, topic)`.
    ///
    /// The first registration stores `default`; later registrations keep the
    /// existing cell (and its default) after the type check.
    pub(crate) fn register_latest<T: Clone + Send + Sync + 'static>(
        &self,
        channel: &str,
        topic: &str,
        default: T,
    ) -> BrokerResult<Arc<LatestCell<T>>> {
        let mut slots = self.slots.lock();
        if let Some(entry) = slots.get(&(channel.to_string(), topic.to_string())) {
            return Self::downcast_latest::<T>(channel, topic, entry);
        }
        let cell = Arc::new(LatestCell::new(default));
        slots.insert(
            (channel.to_string(), topic.to_string()),
            SlotEntry {
                payload_type: TypeId::of::<T>(),
                payload_name: std::any::type_name::<T>(),
                mode: SlotMode::Latest,
                cell: Arc::clone(&cell) as Arc<dyn Any + Send + Sync>,
            },
        );
        debug!(channel, topic, "registered latest-value slot");
        Ok(cell)
    }

    /// Create or attach the queued slot at `(channel, topic)`.
    ///
    /// Capacity is fixed by the first registration.
    pub(crate) fn register_queued<T: Send + Sync + 'static>(
        &self,
        channel: &str,
        topic: &str,
        capacity: usize,
    ) -> BrokerResult<Arc<QueueCell<T>>> {
        let mut slots = self.slots.lock();
        if let Some(entry) = slots.get(&(channel.to_string(), topic.to_string())) {
            return Self::downcast_queued::<T>(channel, topic, entry);
        }
        let cell = Arc::new(QueueCell::new(capacity));
        slots.insert(
            (channel.to_string(), topic.to_string()),
            SlotEntry {
                payload_type: TypeId::of::<T>(),
                payload_name: std::any::type_name::<T>(),
                mode: SlotMode::Queued,
                cell: Arc::clone(&cell) as Arc<dyn Any + Send + Sync>,
            },
        );
        debug!(channel, topic, capacity, "registered queued slot");
        Ok(cell)
    }

    /// Attach to an existing latest-value slot. Fails with `NotBound` until
    /// the publisher has registered it.
    pub(crate) fn attach_latest<T: Clone + Send + Sync + 'static>(
        &self,
        channel: &str,
        topic: &str,
    ) -> BrokerResult<Arc<LatestCell<T>>> {
        let slots = self.slots.lock();
        match slots.get(&(channel.to_string(), topic.to_string())) {
            Some(entry) => Self::downcast_latest::<T>(channel, topic, entry),
            None => Err(BrokerError::NotBound {
                channel: channel.to_string(),
                topic: topic.to_string(),
            }),
        }
    }

    /// Attach to an existing queued slot.
    pub(crate) fn attach_queued<T: Send + Sync + 'static>(
        &self,
        channel: &str,
        topic: &str,
    ) -> BrokerResult<Arc<QueueCell<T>>> {
        let slots = self.slots.lock();
        match slots.get(&(channel.to_string(), topic.to_string())) {
            Some(entry) => Self::downcast_queued::<T>(channel, topic, entry),
            None => Err(BrokerError::NotBound {
                channel: channel.to_string(),
                topic: topic.to_string(),
            }),
        }
    }

    fn downcast_latest<T: Clone + Send + Sync + 'static>(
        channel: &str,
        topic: &str,
        entry: &SlotEntry,
    ) -> BrokerResult<Arc<LatestCell<T>>> {
        if entry.mode != SlotMode::Latest || entry.payload_type != TypeId::of::<T>() {
            return Err(Self::mismatch::<T>(channel, topic, SlotMode::Latest, entry));
        }
        Arc::clone(&entry.cell)
            .downcast::<LatestCell<T>>()
            .map_err(|_| Self::mismatch::<T>(channel, topic, SlotMode::Latest, entry))
    }

    fn downcast_queued<T: Send + Sync + 'static>(
        channel: &str,
        topic: &str,
        entry: &SlotEntry,
    ) -> BrokerResult<Arc<QueueCell<T>>> {
        if entry.mode != SlotMode::Queued || entry.payload_type != TypeId::of::<T>() {
            return Err(Self::mismatch::<T>(channel, topic, SlotMode::Queued, entry));
        }
        Arc::clone(&entry.cell)
            .downcast::<QueueCell<T>>()
            .map_err(|_| Self::mismatch::<T>(channel, topic, SlotMode::Queued, entry))
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_before_register_is_not_bound() {
        let broker = Broker::new();
        let err = broker.attach_latest::<i32>("ch", "tp").unwrap_err();
        assert!(matches!(err, BrokerError::NotBound { .. }));
    }

    #[test]
    fn register_then_attach_shares_cell() {
        let broker = Broker::new();
        let publisher_cell = broker.register_latest("ch", "tp", 5_i32).unwrap();
        let subscriber_cell = broker.attach_latest::<i32>("ch", "tp").unwrap();
        publisher_cell.publish(9);
        assert_eq!(subscriber_cell.read(), (1, 9));
    }

    #[test]
    fn payload_type_is_fixed_at_first_binding() {
        let broker = Broker::new();
        broker.register_latest("ch", "tp", 5_i32).unwrap();
        let err = broker.attach_latest::<f64>("ch", "tp").unwrap_err();
        assert!(matches!(err, BrokerError::TypeMismatch { .. }));
        let err = broker.register_latest("ch", "tp", 1.0_f64).unwrap_err();
        assert!(matches!(err, BrokerError::TypeMismatch { .. }));
    }

    #[test]
    fn mode_is_fixed_at_first_binding() {
        let broker = Broker::new();
        broker.register_latest("ch", "tp", 5_i32).unwrap();
        let err = broker.attach_queued::<i32>("ch", "tp").unwrap_err();
        assert!(matches!(err, BrokerError::TypeMismatch { .. }));
    }

    #[test]
    fn second_latest_registration_keeps_first_default() {
        let broker = Broker::new();
        broker.register_latest("ch", "tp", 1_i32).unwrap();
        let second = broker.register_latest("ch", "tp", 2_i32).unwrap();
        assert_eq!(second.read(), (0, 1));
    }

    #[test]
    fn queued_capacity_fixed_by_first_registration() {
        let broker = Broker::new();
        let first = broker.register_queued::<i32>("ch", "q", 2).unwrap();
        let second = broker.register_queued::<i32>("ch", "q", 100).unwrap();
        assert_eq!(first.capacity(), 2);
        assert_eq!(second.capacity(), 2);
    }

    #[test]
    fn addresses_are_independent() {
        let broker = Broker::new();
        broker.register_latest("a", "x", 1_i32).unwrap();
        broker.register_latest("b", "x", 2.0_f64).unwrap();
        assert_eq!(broker.slot_count(), 2);
        assert_eq!(broker.attach_latest::<i32>("a", "x").unwrap().read().1, 1);
    }
}
