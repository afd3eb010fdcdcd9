//! Typed intra-process publish/subscribe.
//!
//! A process-wide [`Broker`] maps `(channel, topic)` string pairs to typed
//! slots. Modules hold no references to each other; they exchange messages
//! only through [`Publisher`] and subscriber handles bound to these slots.
//!
//! Two slot shapes exist:
//!
//! - **latest-value**: one payload, overwritten on publish, never empty once
//!   the publisher has bound (it registers a default). Read non-blocking via
//!   [`LatestSubscriber::latest`] or blocking via
//!   [`LatestSubscriber::wait_latest`].
//! - **queued**: bounded FIFO; overflow drops the oldest element and bumps a
//!   counter, the publisher never fails. Read via [`QueueSubscriber::pop`].
//!
//! Publishers create slots; subscribers attach to existing slots and retry
//! until the publisher side has come up, which makes module startup order
//! irrelevant.

pub mod endpoint;
pub mod error;
pub mod pool;
pub mod registry;
mod slot;

pub use endpoint::{LatestSubscriber, Publisher, QueueSubscriber};
pub use error::{BrokerError, BrokerResult};
pub use pool::{PoolHandle, ThreadPool};
pub use registry::Broker;
