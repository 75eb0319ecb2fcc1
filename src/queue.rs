//! Bounded entry queue between producers and the consumer task.
//!
//! # Architecture
//!
//! ```text
//! Task ──send()─────────┐
//!                       ├──▶ [E0][E1]..[EN-1] ──receive()──▶ consumer task
//! ISR  ──send_from_isr()┘     fixed capacity     (blocks)
//! ```
//!
//! # Rules
//!
//! - Producers never wait: a full queue drops the new entry
//! - Capacity is fixed at compile time, storage is never grown
//! - FIFO: entries come out in the order the queue accepted them
//!
//! [`EntryQueue`] is the capability the engine needs from the platform.
//! [`RingQueue`] implements it with std primitives for hosts; the FreeRTOS
//! implementation lives in [`crate::platform`].

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::entry::Entry;

/// Why an entry was not queued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendError {
    /// Queue at capacity.
    Full,
    /// Queue not opened yet, or closed.
    Closed,
}

impl core::fmt::Display for SendError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SendError::Full => f.write_str("queue full"),
            SendError::Closed => f.write_str("queue closed"),
        }
    }
}

/// Bounded channel of entries with distinct task and interrupt send paths.
///
/// A queue accepts task-context sends from construction on, before any
/// consumer exists; entries wait for the consumer or for a manual drain.
pub trait EntryQueue: Send + Sync {
    /// Make sure any lazily created backing exists. Returns `false` if the
    /// queue cannot be used.
    fn open(&self) -> bool {
        true
    }

    /// Enqueue from task context without waiting.
    fn send(&self, entry: &Entry) -> Result<(), SendError>;

    /// Enqueue from interrupt context without waiting or yielding.
    ///
    /// Returns `Ok(true)` when a higher-priority task (the consumer) became
    /// ready and the caller should yield on interrupt exit.
    fn send_from_isr(&self, entry: &Entry) -> Result<bool, SendError>;

    /// Block until an entry is available. `None` once the queue is closed.
    fn receive(&self) -> Option<Entry>;

    /// Dequeue without waiting. Still works after `close`.
    fn try_receive(&self) -> Option<Entry>;

    /// Reject further sends and wake the consumer.
    fn close(&self);

    /// Entries waiting.
    fn len(&self) -> usize;

    /// Maximum entries held.
    fn capacity(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fixed-capacity FIFO ring of entries.
struct Ring<const N: usize> {
    slots: [Entry; N],
    head: usize,
    len: usize,
    closed: bool,
    /// Consumer is parked in `receive`.
    waiting: bool,
}

impl<const N: usize> Ring<N> {
    const fn new() -> Self {
        assert!(N > 0, "Queue capacity must be at least 1");

        Self {
            slots: [Entry::EMPTY; N],
            head: 0,
            len: 0,
            closed: false,
            waiting: false,
        }
    }

    fn push(&mut self, entry: &Entry) -> Result<(), SendError> {
        if self.closed {
            return Err(SendError::Closed);
        }
        if self.len == N {
            return Err(SendError::Full);
        }
        let tail = (self.head + self.len) % N;
        self.slots[tail] = *entry;
        self.len += 1;
        Ok(())
    }

    fn pop(&mut self) -> Option<Entry> {
        if self.len == 0 {
            return None;
        }
        let entry = self.slots[self.head];
        self.head = (self.head + 1) % N;
        self.len -= 1;
        Some(entry)
    }
}

/// Host queue: a fixed ring behind a mutex, with a condvar for the consumer.
///
/// There are no interrupts on a host, so `send_from_isr` behaves like `send`
/// and reports a wake-up whenever the consumer was parked.
pub struct RingQueue<const N: usize> {
    ring: Mutex<Ring<N>>,
    ready: Condvar,
}

impl<const N: usize> RingQueue<N> {
    /// Create a new empty queue.
    pub const fn new() -> Self {
        Self {
            ring: Mutex::new(Ring::new()),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Ring<N>> {
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Push and report whether the consumer was parked.
    fn push(&self, entry: &Entry) -> Result<bool, SendError> {
        let mut ring = self.lock();
        ring.push(entry)?;
        let woken = ring.waiting;
        drop(ring);
        self.ready.notify_one();
        Ok(woken)
    }
}

impl<const N: usize> Default for RingQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> EntryQueue for RingQueue<N> {
    fn send(&self, entry: &Entry) -> Result<(), SendError> {
        self.push(entry).map(|_| ())
    }

    fn send_from_isr(&self, entry: &Entry) -> Result<bool, SendError> {
        self.push(entry)
    }

    fn receive(&self) -> Option<Entry> {
        let mut ring = self.lock();
        loop {
            if ring.closed {
                return None;
            }
            if let Some(entry) = ring.pop() {
                return Some(entry);
            }
            ring.waiting = true;
            ring = self.ready.wait(ring).unwrap_or_else(PoisonError::into_inner);
            ring.waiting = false;
        }
    }

    fn try_receive(&self) -> Option<Entry> {
        self.lock().pop()
    }

    fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }

    fn len(&self) -> usize {
        self.lock().len
    }

    fn capacity(&self) -> usize {
        N
    }
}
