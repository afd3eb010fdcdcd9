//! Typed publisher and subscriber handles.
//!
//! Endpoints are cheap handles over the shared slot cell; a module keeps
//! them for its whole task lifetime. Publishers create slots, subscribers
//! attach, and `subscribe` failures are retried by the module startup
//! barrier until the publisher side exists.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::{BrokerError, BrokerResult};
use crate::registry::Broker;
use crate::slot::{LatestCell, QueueCell};

#[derive(Debug)]
enum PublishCell<T> {
    Latest(Arc<LatestCell<T>>),
    Queued(Arc<QueueCell<T>>),
}

/// Writing end of a slot.
#[derive(Debug)]
pub struct Publisher<T> {
    cell: PublishCell<T>,
}

impl<T: Clone + Send + Sync + 'static> Publisher<T> {
    /// Register (or attach to) the latest-value slot at `(channel, topic)`.
    ///
    /// `default` is what subscribers read before the first publish; if the
    /// slot already exists its original default is kept.
    pub fn latest(broker: &Broker, channel: &str, topic: &str, default: T) -> BrokerResult<Self> {
        Ok(Self {
            cell: PublishCell::Latest(broker.register_latest(channel, topic, default)?),
        })
    }

    /// Register (or attach to) the queued slot at `(channel, topic)` with the
    /// given FIFO capacity (fixed by the first registration).
    pub fn queued(
        broker: &Broker,
        channel: &str,
        topic: &str,
        capacity: usize,
    ) -> BrokerResult<Self> {
        Ok(Self {
            cell: PublishCell::Queued(broker.register_queued(channel, topic, capacity)?),
        })
    }

    /// Publish one payload. Never blocks and never fails: latest-value slots
    /// overwrite, queued slots drop their oldest element on overflow.
    pub fn publish(&self, msg: T) {
        match &self.cell {
            PublishCell::Latest(cell) => cell.publish(msg),
            PublishCell::Queued(cell) => cell.push(msg),
        }
    }

    /// Messages discarded by queue overflow (always 0 for latest-value).
    pub fn dropped(&self) -> u64 {
        match &self.cell {
            PublishCell::Latest(_) => 0,
            PublishCell::Queued(cell) => cell.dropped(),
        }
    }
}

/// Reading end of a latest-value slot.
///
/// `latest` never fails once bound; `wait_latest` bounds the wait for the
/// first real publish.
pub struct LatestSubscriber<T> {
    cell: Arc<LatestCell<T>>,
    /// Highest publish sequence this subscriber has returned.
    seen: AtomicU64,
    channel: String,
    topic: String,
}

impl<T> std::fmt::Debug for LatestSubscriber<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LatestSubscriber")
            .field("channel", &self.channel)
            .field("topic", &self.topic)
            .finish()
    }
}

impl<T: Clone + Send + Sync + 'static> LatestSubscriber<T> {
    /// Attach to the latest-value slot at `(channel, topic)`.
    pub fn subscribe(broker: &Broker, channel: &str, topic: &str) -> BrokerResult<Self> {
        Ok(Self {
            cell: broker.attach_latest(channel, topic)?,
            seen: AtomicU64::new(0),
            channel: channel.to_string(),
            topic: topic.to_string(),
        })
    }

    /// Current payload: the registered default until the first publish,
    /// afterwards the most recently published value.
    pub fn latest(&self) -> T {
        self.latest_with_seq().1
    }

    /// Current `(publish index, payload)`; index 0 is the default.
    ///
    /// Successive calls observe non-decreasing indices.
    pub fn latest_with_seq(&self) -> (u64, T) {
        let (seq, value) = self.cell.read();
        self.seen.fetch_max(seq, Ordering::Relaxed);
        (seq, value)
    }

    /// Block until the slot has been published at least once.
    pub fn wait_latest(&self, timeout: Duration) -> BrokerResult<T> {
        match self.cell.wait_first(Some(timeout)) {
            Some((seq, value)) => {
                self.seen.fetch_max(seq, Ordering::Relaxed);
                Ok(value)
            }
            None => Err(BrokerError::Timeout {
                channel: self.channel.clone(),
                topic: self.topic.clone(),
            }),
        }
    }

    /// True if a publish happened since the last read through this handle.
    pub fn has_changed(&self) -> bool {
        self.cell.seq() > self.seen.load(Ordering::Relaxed)
    }
}

/// Reading end of a queued slot.
pub struct QueueSubscriber<T> {
    cell: Arc<QueueCell<T>>,
    channel: String,
    topic: String,
}

impl<T: Send + Sync + 'static> QueueSubscriber<T> {
    /// Attach to the queued slot at `(channel, topic)`.
    pub fn subscribe(broker: &Broker, channel: &str, topic: &str) -> BrokerResult<Self> {
        Ok(Self {
            cell: broker.attach_queued(channel, topic)?,
            channel: channel.to_string(),
            topic: topic.to_string(),
        })
    }

    /// Block until an element is available and remove it. Elements arrive
    /// in publish order; overflow discards from the oldest end only.
    pub fn pop(&self) -> T {
        self.cell.pop()
    }

    /// As [`Self::pop`] with a deadline.
    pub fn pop_timeout(&self, timeout: Duration) -> BrokerResult<T> {
        self.cell
            .pop_timeout(timeout)
            .ok_or_else(|| BrokerError::Timeout {
                channel: self.channel.clone(),
                topic: self.topic.clone(),
            })
    }

    /// Elements currently buffered.
    pub fn len(&self) -> usize {
        self.cell.len()
    }

    /// True when no element is buffered.
    pub fn is_empty(&self) -> bool {
        self.cell.len() == 0
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
