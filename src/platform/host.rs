//! Host platform: std threads stand in for FreeRTOS tasks.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{SystemTime, UNIX_EPOCH};

use super::Consume;
use crate::config::{QUEUE_LENGTH, TASK_NAME};
use crate::entry::{TaskId, Timestamp};
use crate::error::LoggerError;
use crate::queue::RingQueue;

/// Queue used by `Logger::new()`.
pub type DefaultQueue = RingQueue<QUEUE_LENGTH>;

/// Next per-thread id (0 is reserved for "no task").
static NEXT_TASK: AtomicUsize = AtomicUsize::new(1);

/// Thread names by task id, recorded when a thread first logs and removed
/// when it exits.
static TASK_NAMES: Mutex<BTreeMap<usize, String>> = Mutex::new(BTreeMap::new());

fn task_names() -> MutexGuard<'static, BTreeMap<usize, String>> {
    TASK_NAMES.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Per-thread task id; forgets the thread name on thread exit.
struct TaskSlot(Cell<Option<TaskId>>);

impl Drop for TaskSlot {
    fn drop(&mut self) {
        if let Some(task) = self.0.get() {
            task_names().remove(&task.raw());
        }
    }
}

thread_local! {
    static CURRENT_TASK: TaskSlot = const { TaskSlot(Cell::new(None)) };
}

/// Current wall-clock time.
pub fn now() -> Timestamp {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => Timestamp::new(elapsed.as_secs() as i64, elapsed.subsec_micros()),
        Err(_) => Timestamp::default(),
    }
}

/// Id of the calling thread, assigned on first use.
pub fn current_task() -> Option<TaskId> {
    CURRENT_TASK
        .try_with(|slot| {
            if let Some(task) = slot.0.get() {
                return Some(task);
            }
            let raw = NonZeroUsize::new(NEXT_TASK.fetch_add(1, Ordering::Relaxed))?;
            if let Some(name) = thread::current().name() {
                task_names().insert(raw.get(), name.to_owned());
            }
            let task = TaskId::new(raw);
            slot.0.set(Some(task));
            Some(task)
        })
        .ok()
        .flatten()
}

/// Look up the thread name recorded for `task`.
///
/// `None` once the thread has exited, like a deleted FreeRTOS task.
pub fn with_task_name<R>(task: TaskId, f: impl FnOnce(Option<&str>) -> R) -> R {
    let names = task_names();
    f(names.get(&task.raw()).map(String::as_str))
}

/// There are no interrupts on a host.
#[inline]
pub fn in_isr() -> bool {
    false
}

/// Nothing to do: the consumer thread is woken by the condvar.
#[inline]
pub fn yield_from_isr() {}

/// Storage for the single consumer thread.
pub struct ConsumerSlot {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ConsumerSlot {
    pub const fn new() -> Self {
        Self {
            handle: Mutex::new(None),
        }
    }

    /// Spawn the consumer thread running `ctx.consume()`.
    pub fn spawn<T: Consume>(&'static self, ctx: &'static T) -> Result<(), LoggerError> {
        let handle = thread::Builder::new()
            .name(TASK_NAME.to_owned())
            .spawn(move || ctx.consume())
            .map_err(|_| LoggerError::TaskSpawnFailed)?;
        *self.handle.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        Ok(())
    }

    /// Wait for the consumer to return (after the queue was closed).
    pub fn join(&self) {
        let handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = handle {
            // Never join from the consumer itself.
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

impl Default for ConsumerSlot {
    fn default() -> Self {
        Self::new()
    }
}
