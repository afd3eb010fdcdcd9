//! Slot internals: the synchronized storage behind each topic address.
//!
//! A latest-value cell is a single overwritten payload guarded by a mutex,
//! with a publish sequence number (0 = never published) and a condvar for
//! blocking first-publish waits. A queue cell is a bounded FIFO with
//! drop-oldest overflow and a monotonic dropped counter.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

// ─── Latest-value cell ──────────────────────────────────────────────

struct LatestState<T> {
    /// Current payload; starts as the registered default.
    value: T,
    /// Publish count. 0 means the slot still holds the default.
    seq: u64,
}

/// Latest-value storage: one payload, overwritten on publish.
///
/// The cell is never empty — it is constructed with the publisher's default
/// and `seq` distinguishes "still default" from "published at least once".
pub(crate) struct LatestCell<T> {
    state: Mutex<LatestState<T>>,
    published: Condvar,
}

impl<T> std::fmt::Debug for LatestCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LatestCell").finish()
    }
}

impl<T: Clone> LatestCell<T> {
    pub(crate) fn new(default: T) -> Self {
        Self {
            state: Mutex::new(LatestState {
                value: default,
                seq: 0,
            }),
            published: Condvar::new(),
        }
    }

    /// Overwrite the payload and wake blocked readers.
    pub(crate) fn publish(&self, value: T) {
        let mut state = self.state.lock();
        state.value = value;
        state.seq += 1;
        drop(state);
        self.published.notify_all();
    }

    /// Current `(seq, payload)` without waiting.
    pub(crate) fn read(&self) -> (u64, T) {
        let state = self.state.lock();
        (state.seq, state.value.clone())
    }

    /// Current publish sequence number.
    pub(crate) fn seq(&self) -> u64 {
        self.state.lock().seq
    }

    /// Block until the first publish, or until `timeout` expires.
    ///
    /// Returns `None` on expiry. `timeout = None` waits indefinitely.
    pub(crate) fn wait_first(&self, timeout: Option<Duration>) -> Option<(u64, T)> {
        let mut state = self.state.lock();
        while state.seq == 0 {
            match timeout {
                Some(limit) => {
                    if self.published.wait_for(&mut state, limit).timed_out() && state.seq == 0 {
                        return None;
                    }
                }
                None => self.published.wait(&mut state),
            }
        }
        Some((state.seq, state.value.clone()))
    }
}

// ─── Queue cell ─────────────────────────────────────────────────────

/// Bounded FIFO storage with drop-oldest overflow.
pub(crate) struct QueueCell<T> {
    queue: Mutex<VecDeque<T>>,
    available: Condvar,
    capacity: usize,
    /// Elements discarded by overflow since slot creation.
    dropped: AtomicU64,
}

impl<T> std::fmt::Debug for QueueCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueCell")
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<T> QueueCell<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            available: Condvar::new(),
            capacity: capacity.max(1),
            dropped: AtomicU64::new(0),
        }
    }

    /// Append an element; on overflow the oldest element is discarded and
    /// the dropped counter incremented. Never fails.
    pub(crate) fn push(&self, value: T) {
        let mut queue = self.queue.lock();
        if queue.len() == self.capacity {
            queue.pop_front();
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        queue.push_back(value);
        drop(queue);
        self.available.notify_one();
    }

    /// Block until an element is available and remove it.
    pub(crate) fn pop(&self) -> T {
        let mut queue = self.queue.lock();
        loop {
            if let Some(value) = queue.pop_front() {
                return value;
            }
            self.available.wait(&mut queue);
        }
    }

    /// As [`Self::pop`] but give up after `timeout`.
    pub(crate) fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        let mut queue = self.queue.lock();
        loop {
            if let Some(value) = queue.pop_front() {
                return Some(value);
            }
            if self.available.wait_for(&mut queue, timeout).timed_out() {
                return queue.pop_front();
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn latest_starts_at_default() {
        let cell = LatestCell::new(7_i32);
        assert_eq!(cell.read(), (0, 7));
    }

    #[test]
    fn latest_overwrites_and_counts() {
        let cell = LatestCell::new(0_i32);
        cell.publish(1);
        cell.publish(2);
        assert_eq!(cell.read(), (2, 2));
    }

    #[test]
    fn wait_first_times_out_without_publish() {
        let cell = LatestCell::new(0_i32);
        assert!(cell.wait_first(Some(Duration::from_millis(20))).is_none());
    }

    #[test]
    fn wait_first_wakes_on_publish() {
        let cell = Arc::new(LatestCell::new(0_i32));
        let waiter = {
            let cell = Arc::clone(&cell);
            thread::spawn(move || cell.wait_first(Some(Duration::from_secs(5))))
        };
        thread::sleep(Duration::from_millis(20));
        cell.publish(42);
        assert_eq!(waiter.join().unwrap(), Some((1, 42)));
    }

    #[test]
    fn queue_drops_oldest_on_overflow() {
        let cell = QueueCell::new(3);
        for i in 0..5 {
            cell.push(i);
        }
        assert_eq!(cell.len(), 3);
        assert_eq!(cell.dropped(), 2);
        assert_eq!(cell.pop(), 2);
        assert_eq!(cell.pop(), 3);
        assert_eq!(cell.pop(), 4);
    }

    #[test]
    fn queue_pop_blocks_until_push() {
        let cell = Arc::new(QueueCell::new(4));
        let popper = {
            let cell = Arc::clone(&cell);
            thread::spawn(move || cell.pop())
        };
        thread::sleep(Duration::from_millis(20));
        cell.push(9_i32);
        assert_eq!(popper.join().unwrap(), 9);
    }

    #[test]
    fn queue_pop_timeout_expires_empty() {
        let cell: QueueCell<i32> = QueueCell::new(4);
        assert!(cell.pop_timeout(Duration::from_millis(20)).is_none());
    }
}
